//! Port abstraction for catalog persistence.
use async_trait::async_trait;

use crate::domain::{Course, CourseFilter, CourseId, CourseListQuery};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by course repository adapters.
    pub enum CoursePersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "course repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "course repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError>;

    /// Persist editable fields. The enrollment counter is never written here
    /// so concurrent enrollments are not lost. Returns `false` when the
    /// course no longer exists.
    async fn update(&self, course: &Course) -> Result<bool, CoursePersistenceError>;

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CoursePersistenceError>;

    /// Remove a course. Returns `false` when nothing was deleted.
    async fn delete(&self, id: &CourseId) -> Result<bool, CoursePersistenceError>;

    /// One filtered, sorted page of courses.
    async fn list(&self, query: &CourseListQuery) -> Result<Vec<Course>, CoursePersistenceError>;

    /// Number of courses matching `filter` across all pages.
    async fn count(&self, filter: &CourseFilter) -> Result<u64, CoursePersistenceError>;
}
