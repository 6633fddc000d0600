//! References to stored images and the uploads that produce them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest accepted upload in bytes.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

const DEFAULT_AVATAR: &str = "uploads/default.png";
const DEFAULT_COURSE_THUMBNAIL: &str = "uploads/courses/default-course.jpg";

/// Durable reference (relative path or URL) to a stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaReference(String);

impl MediaReference {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Placeholder avatar for accounts without an upload.
    pub fn default_avatar() -> Self {
        Self::new(DEFAULT_AVATAR)
    }

    /// Placeholder thumbnail for courses without an upload.
    pub fn default_course_thumbnail() -> Self {
        Self::new(DEFAULT_COURSE_THUMBNAIL)
    }
}

impl AsRef<str> for MediaReference {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an upload will be used for; decides folder and accepted formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Avatar,
    CourseThumbnail,
}

impl MediaKind {
    /// Folder below the upload root.
    pub const fn folder(self) -> &'static str {
        match self {
            Self::Avatar => "users",
            Self::CourseThumbnail => "courses",
        }
    }

    fn accepts(self, format: ImageFormat) -> bool {
        match self {
            Self::Avatar => true,
            Self::CourseThumbnail => !matches!(format, ImageFormat::Gif),
        }
    }
}

/// Image encodings accepted for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl ImageFormat {
    /// Map a MIME type onto a supported format.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
            Self::Gif => "gif",
        }
    }

    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

/// Rejections raised while validating an upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadValidationError {
    #[error("No file uploaded")]
    Empty,
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("File exceeds the {max} byte limit")]
    TooLarge { max: usize },
}

/// Validated image upload awaiting storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    kind: MediaKind,
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl ImageUpload {
    /// Validate raw bytes and their declared content type for `kind`.
    pub fn new(
        kind: MediaKind,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, UploadValidationError> {
        if bytes.is_empty() {
            return Err(UploadValidationError::Empty);
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(UploadValidationError::TooLarge {
                max: MAX_UPLOAD_BYTES,
            });
        }
        let format = ImageFormat::from_content_type(content_type)
            .filter(|format| kind.accepts(*format))
            .ok_or_else(|| UploadValidationError::UnsupportedType(content_type.to_owned()))?;
        Ok(Self {
            kind,
            format,
            bytes,
        })
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}
