// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export the store trait and its backends

pub mod content_repository;
pub mod location_repository;
pub mod memory_store;
pub mod pg_store;
pub mod photo_repository;
pub mod ping_repository;
pub mod store;

pub use content_repository::*;
pub use location_repository::*;
pub use memory_store::*;
pub use pg_store::*;
pub use photo_repository::*;
pub use ping_repository::*;
pub use store::*;
