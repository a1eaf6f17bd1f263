// src/services/media_storage.rs
// DOCUMENTATION: Local media directory for uploaded trip photos
// PURPOSE: Stream uploads to disk with a size limit, resolve and remove files

use crate::errors::TravelError;
use actix_web::web::Bytes;
use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

pub struct MediaStorage {
    root: PathBuf,
    public_url: String,
    max_bytes: usize,
}

impl MediaStorage {
    pub fn new(root: PathBuf, public_url: String, max_bytes: usize) -> Self {
        Self {
            root,
            public_url: public_url.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Create the media directory if missing
    pub async fn ensure_root(&self) -> Result<(), TravelError> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            log::error!("Cannot create media dir {}: {}", self.root.display(), e);
            TravelError::StorageError(e.to_string())
        })
    }

    /// Storage key for a new upload: "<uuid>.<ext>"
    /// DOCUMENTATION: Extension comes from the client file name when it is a
    /// plain alphanumeric suffix, otherwise from the MIME type
    pub fn key_for(id: Uuid, original_name: Option<&str>, mime: &str) -> String {
        let from_name = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric()));

        let ext = from_name.or_else(|| {
            mime_guess::get_mime_extensions_str(mime)
                .and_then(|exts| exts.first())
                .map(|ext| ext.to_string())
        });

        match ext {
            Some(ext) => format!("{}.{}", id, ext),
            None => id.to_string(),
        }
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.public_url, key)
    }

    /// Path of a stored file; rejects keys that could leave the media dir
    pub fn resolve(&self, key: &str) -> Result<PathBuf, TravelError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_');

        if !valid {
            log::warn!("Rejected media key: {}", key);
            return Err(TravelError::NotFound(key.to_string()));
        }

        Ok(self.root.join(key))
    }

    /// Write a byte stream to `key`, returning the number of bytes written
    /// DOCUMENTATION: The partial file is removed when the stream fails or
    /// exceeds the size limit
    pub async fn write_stream<S, E>(&self, key: &str, mut stream: S) -> Result<u64, TravelError>
    where
        S: Stream<Item = Result<Bytes, E>> + Unpin,
        E: Display,
    {
        let path = self.resolve(key)?;
        let mut file = fs::File::create(&path).await.map_err(|e| {
            log::error!("Cannot create {}: {}", path.display(), e);
            TravelError::StorageError(e.to_string())
        })?;

        let mut written: u64 = 0;
        let result: Result<(), TravelError> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| TravelError::InvalidInput(e.to_string()))?;
                written += chunk.len() as u64;
                if written > self.max_bytes as u64 {
                    return Err(TravelError::PayloadTooLarge(self.max_bytes));
                }
                file.write_all(&chunk)
                    .await
                    .map_err(|e| TravelError::StorageError(e.to_string()))?;
            }
            file.flush()
                .await
                .map_err(|e| TravelError::StorageError(e.to_string()))
        }
        .await;

        if let Err(e) = result {
            drop(file);
            self.remove(key).await;
            return Err(e);
        }

        log::info!("Stored media file {} ({} bytes)", key, written);
        Ok(written)
    }

    /// Best-effort removal; a missing file is not an error
    pub async fn remove(&self, key: &str) {
        let Ok(path) = self.resolve(key) else {
            return;
        };

        match fs::remove_file(&path).await {
            Ok(()) => log::info!("Removed media file {}", key),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove media file {}: {}", path.display(), e),
        }
    }
}
