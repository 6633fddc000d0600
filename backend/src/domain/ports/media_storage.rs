//! Port for persisting uploaded images.
use async_trait::async_trait;

use crate::domain::{ImageUpload, MediaReference};

use super::define_port_error;

define_port_error! {
    /// Storage failures raised by media adapters.
    pub enum MediaStorageError {
        /// Writing or reading the backing store failed.
        Io { message: String } => "media storage failed: {message}",
        /// The requested path escapes the storage root or is malformed.
        InvalidPath { path: String } => "invalid media path: {path}",
    }
}

/// Stored bytes plus the MIME type to serve them with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMedia {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Persist `upload` and return the reference clients should use.
    async fn store(&self, upload: &ImageUpload) -> Result<MediaReference, MediaStorageError>;

    /// Read back a previously stored file by its path below the upload root.
    async fn load(&self, path: &str) -> Result<Option<StoredMedia>, MediaStorageError>;
}
