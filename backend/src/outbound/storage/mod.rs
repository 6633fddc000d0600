//! Filesystem media storage rooted at the configured upload directory.
//!
//! All access goes through a `cap_std` directory handle, so stored and served
//! paths can never resolve outside the upload root.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tokio::task;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{MediaStorage, MediaStorageError, StoredMedia};
use crate::domain::{ImageFormat, ImageUpload, MediaKind, MediaReference};

/// URL prefix under which stored files are served.
pub const PUBLIC_PREFIX: &str = "uploads";

/// Media adapter writing uploads below a local directory.
#[derive(Debug, Clone)]
pub struct LocalMediaStorage {
    root: Arc<Dir>,
    root_path: PathBuf,
}

impl LocalMediaStorage {
    /// Open (creating when missing) the upload root.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, MediaStorageError> {
        let root_path = root.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())
            .map_err(|error| io_error(&root_path, &error))?;
        let dir = Dir::open_ambient_dir(&root_path, ambient_authority())
            .map_err(|error| io_error(&root_path, &error))?;
        Ok(Self {
            root: Arc::new(dir),
            root_path,
        })
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }
}

fn io_error(path: &Path, error: &io::Error) -> MediaStorageError {
    MediaStorageError::io(format!("{}: {error}", path.display()))
}

fn file_prefix(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Avatar => "user",
        MediaKind::CourseThumbnail => "course",
    }
}

fn format_for_extension(path: &Path) -> Option<ImageFormat> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "png" => Some(ImageFormat::Png),
        "webp" => Some(ImageFormat::Webp),
        "gif" => Some(ImageFormat::Gif),
        _ => None,
    }
}

/// Accept only plain relative paths made of normal components.
fn sanitise(raw: &str) -> Result<PathBuf, MediaStorageError> {
    let candidate = Path::new(raw);
    let is_plain = !raw.is_empty()
        && candidate
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if is_plain {
        Ok(candidate.to_path_buf())
    } else {
        Err(MediaStorageError::invalid_path(raw))
    }
}

#[async_trait]
impl MediaStorage for LocalMediaStorage {
    async fn store(&self, upload: &ImageUpload) -> Result<MediaReference, MediaStorageError> {
        let folder = upload.kind().folder();
        let name = format!(
            "{}-{}.{}",
            file_prefix(upload.kind()),
            Uuid::new_v4().simple(),
            upload.format().extension()
        );
        let relative = PathBuf::from(folder).join(&name);
        let bytes = upload.bytes().to_vec();
        let root = Arc::clone(&self.root);
        let target = relative.clone();
        task::spawn_blocking(move || -> io::Result<()> {
            root.create_dir_all(folder)?;
            root.write(&target, bytes)
        })
        .await
        .map_err(|error| MediaStorageError::io(error.to_string()))?
        .map_err(|error| io_error(&self.root_path.join(&relative), &error))?;

        debug!(path = %relative.display(), "stored upload");
        Ok(MediaReference::new(format!("{PUBLIC_PREFIX}/{folder}/{name}")))
    }

    async fn load(&self, path: &str) -> Result<Option<StoredMedia>, MediaStorageError> {
        let relative = sanitise(path)?;
        let Some(format) = format_for_extension(&relative) else {
            return Ok(None);
        };
        let root = Arc::clone(&self.root);
        let target = relative.clone();
        let read = task::spawn_blocking(move || root.read(&target))
            .await
            .map_err(|error| MediaStorageError::io(error.to_string()))?;
        match read {
            Ok(bytes) => Ok(Some(StoredMedia {
                bytes,
                content_type: format.content_type(),
            })),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(io_error(&self.root_path.join(&relative), &error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G'];

    #[rstest]
    #[tokio::test]
    async fn stored_uploads_can_be_loaded_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = LocalMediaStorage::open(dir.path()).expect("storage opens");
        let upload = ImageUpload::new(MediaKind::Avatar, "image/png", PNG_BYTES.to_vec())
            .expect("valid upload");

        let reference = storage.store(&upload).await.expect("stored");
        let relative = reference
            .as_ref()
            .strip_prefix("uploads/")
            .expect("public prefix");
        assert!(relative.starts_with("users/user-"));
        assert!(relative.ends_with(".png"));

        let loaded = storage
            .load(relative)
            .await
            .expect("load succeeds")
            .expect("file present");
        assert_eq!(loaded.bytes, PNG_BYTES);
        assert_eq!(loaded.content_type, "image/png");
    }

    #[rstest]
    #[tokio::test]
    async fn missing_files_load_as_none() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = LocalMediaStorage::open(dir.path()).expect("storage opens");
        let loaded = storage.load("courses/absent.jpg").await.expect("load");
        assert!(loaded.is_none());
    }

    #[rstest]
    #[case("../secrets.png")]
    #[case("/etc/passwd.png")]
    #[case("users/../../x.png")]
    #[case("")]
    #[tokio::test]
    async fn escaping_paths_are_rejected(#[case] path: &str) {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = LocalMediaStorage::open(dir.path()).expect("storage opens");
        let error = storage.load(path).await.expect_err("path rejected");
        assert_eq!(error, MediaStorageError::invalid_path(path));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_extensions_are_not_served() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = LocalMediaStorage::open(dir.path()).expect("storage opens");
        assert!(storage.load("notes.txt").await.expect("load").is_none());
    }
}
