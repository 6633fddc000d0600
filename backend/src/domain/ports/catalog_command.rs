//! Driving port for catalog curation.

use async_trait::async_trait;

use crate::domain::{Course, CourseDraft, CourseId, CoursePatch, Error, ImageUpload, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogCommand: Send + Sync {
    async fn create_course(&self, created_by: &UserId, draft: CourseDraft)
    -> Result<Course, Error>;

    async fn update_course(&self, id: &CourseId, patch: CoursePatch) -> Result<Course, Error>;

    async fn delete_course(&self, id: &CourseId) -> Result<(), Error>;

    /// Store a new thumbnail and point the course at it.
    async fn replace_thumbnail(&self, id: &CourseId, upload: ImageUpload) -> Result<Course, Error>;
}
