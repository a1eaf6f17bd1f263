// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod content;
pub mod location;
pub mod ping;
pub mod trip_photo;

pub use content::*;
pub use location::*;
pub use ping::*;
pub use trip_photo::*;
