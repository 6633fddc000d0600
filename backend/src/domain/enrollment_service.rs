//! Enrollment engine.
//!
//! Implements the enrollment driving ports over the enrollment and course
//! repositories. Uniqueness of (user, course) and the student counter bump are
//! delegated to the repository so they hold under concurrent requests.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::catalog_service::map_course_error;
use crate::domain::ports::{
    CourseRepository, EnrollmentCommand, EnrollmentPersistenceError, EnrollmentQuery,
    EnrollmentRepository,
};
use crate::domain::{
    CourseId, DashboardCalendar, DashboardSummary, EnrolledCourse, Enrollment, EnrollmentTarget,
    Error, ProgressUpdate, UserId,
};

const COURSE_NOT_FOUND: &str = "Course not found";
const ALREADY_ENROLLED: &str = "You are already enrolled in this course";

/// Enrollment service implementing [`EnrollmentCommand`] and
/// [`EnrollmentQuery`].
#[derive(Clone)]
pub struct EnrollmentService<E, C> {
    enrollments: Arc<E>,
    courses: Arc<C>,
    clock: Arc<dyn Clock>,
    calendar: DashboardCalendar,
}

impl<E, C> EnrollmentService<E, C> {
    pub fn new(
        enrollments: Arc<E>,
        courses: Arc<C>,
        clock: Arc<dyn Clock>,
        calendar: DashboardCalendar,
    ) -> Self {
        Self {
            enrollments,
            courses,
            clock,
            calendar,
        }
    }
}

fn map_enrollment_error(error: EnrollmentPersistenceError) -> Error {
    match error {
        EnrollmentPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("enrollment repository unavailable: {message}"))
        }
        EnrollmentPersistenceError::Query { message } => {
            Error::internal(format!("enrollment repository error: {message}"))
        }
        EnrollmentPersistenceError::AlreadyEnrolled => Error::conflict(ALREADY_ENROLLED),
        EnrollmentPersistenceError::CourseMissing => Error::not_found(COURSE_NOT_FOUND),
    }
}

#[async_trait]
impl<E, C> EnrollmentCommand for EnrollmentService<E, C>
where
    E: EnrollmentRepository,
    C: CourseRepository,
{
    async fn enroll(&self, user_id: &UserId, course_id: &CourseId) -> Result<Enrollment, Error> {
        let course = self
            .courses
            .find_by_id(course_id)
            .await
            .map_err(map_course_error)?;
        if course.is_none() {
            return Err(Error::not_found(COURSE_NOT_FOUND));
        }

        let enrollment = Enrollment::start(*user_id, *course_id, self.clock.utc());
        self.enrollments
            .enroll(&enrollment)
            .await
            .map_err(map_enrollment_error)?;
        info!(
            user_id = %user_id,
            course_id = %course_id,
            enrollment_id = %enrollment.id,
            "user enrolled in course"
        );
        Ok(enrollment)
    }

    async fn update_progress(
        &self,
        user_id: &UserId,
        target: EnrollmentTarget,
        update: ProgressUpdate,
    ) -> Result<Enrollment, Error> {
        let mut enrollment = self
            .enrollments
            .find_for_user(user_id, target)
            .await
            .map_err(map_enrollment_error)?
            .ok_or_else(|| Error::not_found(target.not_found_message()))?;

        enrollment.record(update, self.clock.utc());
        self.enrollments
            .save_progress(&enrollment)
            .await
            .map_err(map_enrollment_error)?;
        debug!(
            enrollment_id = %enrollment.id,
            progress = enrollment.progress.value(),
            status = ?enrollment.status(),
            "enrollment progress recorded"
        );
        Ok(enrollment)
    }
}

#[async_trait]
impl<E, C> EnrollmentQuery for EnrollmentService<E, C>
where
    E: EnrollmentRepository,
    C: CourseRepository,
{
    async fn my_enrollments(&self, user_id: &UserId) -> Result<Vec<EnrolledCourse>, Error> {
        self.enrollments
            .list_for_user(user_id)
            .await
            .map_err(map_enrollment_error)
    }

    async fn dashboard(&self, user_id: &UserId) -> Result<DashboardSummary, Error> {
        let entries = self.my_enrollments(user_id).await?;
        Ok(DashboardSummary::compute(
            entries,
            self.clock.utc(),
            self.calendar,
        ))
    }
}

#[cfg(test)]
#[path = "enrollment_service_tests.rs"]
mod tests;
