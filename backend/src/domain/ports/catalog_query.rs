//! Driving port for catalog browsing.

use async_trait::async_trait;
use pagination::Paginated;

use crate::domain::{Course, CourseId, CourseListQuery, Error};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Filtered, sorted page of courses with the total match count.
    async fn list_courses(&self, query: CourseListQuery) -> Result<Paginated<Course>, Error>;

    async fn course(&self, id: &CourseId) -> Result<Course, Error>;
}
