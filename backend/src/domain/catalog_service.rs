//! Catalog service: course listing and curation.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join;
use mockable::Clock;
use pagination::Paginated;
use tracing::info;

use crate::domain::account_service::map_media_error;
use crate::domain::ports::{
    CatalogCommand, CatalogQuery, CoursePersistenceError, CourseRepository, MediaStorage,
};
use crate::domain::{
    Course, CourseDraft, CourseId, CourseListQuery, CoursePatch, Error, ImageUpload, UserId,
};

const COURSE_NOT_FOUND: &str = "Course not found";

/// Catalog service implementing [`CatalogCommand`] and [`CatalogQuery`].
#[derive(Clone)]
pub struct CatalogService<C> {
    courses: Arc<C>,
    media: Arc<dyn MediaStorage>,
    clock: Arc<dyn Clock>,
}

impl<C> CatalogService<C> {
    pub fn new(courses: Arc<C>, media: Arc<dyn MediaStorage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            courses,
            media,
            clock,
        }
    }
}

pub(crate) fn map_course_error(error: CoursePersistenceError) -> Error {
    match error {
        CoursePersistenceError::Connection { message } => {
            Error::service_unavailable(format!("course repository unavailable: {message}"))
        }
        CoursePersistenceError::Query { message } => {
            Error::internal(format!("course repository error: {message}"))
        }
    }
}

impl<C> CatalogService<C>
where
    C: CourseRepository,
{
    async fn load(&self, id: &CourseId) -> Result<Course, Error> {
        self.courses
            .find_by_id(id)
            .await
            .map_err(map_course_error)?
            .ok_or_else(|| Error::not_found(COURSE_NOT_FOUND))
    }

    async fn save(&self, course: &Course) -> Result<(), Error> {
        if self.courses.update(course).await.map_err(map_course_error)? {
            Ok(())
        } else {
            Err(Error::not_found(COURSE_NOT_FOUND))
        }
    }
}

#[async_trait]
impl<C> CatalogQuery for CatalogService<C>
where
    C: CourseRepository,
{
    async fn list_courses(&self, query: CourseListQuery) -> Result<Paginated<Course>, Error> {
        let (courses, total) = try_join(self.courses.list(&query), self.courses.count(&query.filter))
            .await
            .map_err(map_course_error)?;
        Ok(Paginated::new(courses, query.page, total))
    }

    async fn course(&self, id: &CourseId) -> Result<Course, Error> {
        self.load(id).await
    }
}

#[async_trait]
impl<C> CatalogCommand for CatalogService<C>
where
    C: CourseRepository,
{
    async fn create_course(
        &self,
        created_by: &UserId,
        draft: CourseDraft,
    ) -> Result<Course, Error> {
        let draft = draft
            .validate()
            .map_err(|error| Error::invalid_request(error.to_string()))?;
        let course = draft.into_course(*created_by, self.clock.utc());
        self.courses
            .insert(&course)
            .await
            .map_err(map_course_error)?;
        info!(course_id = %course.id, created_by = %created_by, "course created");
        Ok(course)
    }

    async fn update_course(&self, id: &CourseId, patch: CoursePatch) -> Result<Course, Error> {
        let mut course = self.load(id).await?;
        course
            .apply(patch, self.clock.utc())
            .map_err(|error| Error::invalid_request(error.to_string()))?;
        self.save(&course).await?;
        Ok(course)
    }

    async fn delete_course(&self, id: &CourseId) -> Result<(), Error> {
        if !self.courses.delete(id).await.map_err(map_course_error)? {
            return Err(Error::not_found(COURSE_NOT_FOUND));
        }
        info!(course_id = %id, "course deleted");
        Ok(())
    }

    async fn replace_thumbnail(&self, id: &CourseId, upload: ImageUpload) -> Result<Course, Error> {
        let mut course = self.load(id).await?;
        course.thumbnail = self
            .media
            .store(&upload)
            .await
            .map_err(map_media_error)?;
        course.updated_at = self.clock.utc();
        self.save(&course).await?;
        Ok(course)
    }
}
