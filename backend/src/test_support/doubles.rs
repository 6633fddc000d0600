//! Cheap credential and media doubles.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::ports::{
    CredentialError, MediaStorage, MediaStorageError, PasswordHasher, StoredMedia,
};
use crate::domain::{ImageUpload, MediaReference, PasswordHash, PlainPassword};

const PLAIN_PREFIX: &str = "plain:";

/// Stores passwords with a marker prefix instead of hashing them.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, password: &PlainPassword) -> Result<PasswordHash, CredentialError> {
        Ok(PasswordHash::new(format!("{PLAIN_PREFIX}{}", password.expose())))
    }

    async fn verify(&self, candidate: &str, hash: &PasswordHash) -> Result<bool, CredentialError> {
        hash.as_str()
            .strip_prefix(PLAIN_PREFIX)
            .map(|stored| stored == candidate)
            .ok_or_else(|| CredentialError::hashing("not a plain test hash"))
    }
}

/// Keeps uploads in memory, keyed by their path below the upload root.
#[derive(Debug, Default)]
pub struct MemoryMediaStorage {
    files: Mutex<HashMap<String, StoredMedia>>,
}

impl MemoryMediaStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub fn len(&self) -> usize {
        self.files.lock().map_or(0, |files| files.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MediaStorage for MemoryMediaStorage {
    async fn store(&self, upload: &ImageUpload) -> Result<MediaReference, MediaStorageError> {
        let path = format!(
            "{}/{}.{}",
            upload.kind().folder(),
            Uuid::new_v4().simple(),
            upload.format().extension()
        );
        let mut files = self
            .files
            .lock()
            .map_err(|_| MediaStorageError::io("media lock poisoned"))?;
        files.insert(
            path.clone(),
            StoredMedia {
                bytes: upload.bytes().to_vec(),
                content_type: upload.format().content_type(),
            },
        );
        Ok(MediaReference::new(format!("uploads/{path}")))
    }

    async fn load(&self, path: &str) -> Result<Option<StoredMedia>, MediaStorageError> {
        let files = self
            .files
            .lock()
            .map_err(|_| MediaStorageError::io("media lock poisoned"))?;
        Ok(files.get(path).cloned())
    }
}
