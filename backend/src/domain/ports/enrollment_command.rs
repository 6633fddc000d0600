//! Driving port for enrollment mutations.

use async_trait::async_trait;

use crate::domain::{CourseId, Enrollment, EnrollmentTarget, Error, ProgressUpdate, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentCommand: Send + Sync {
    /// Enroll `user_id` in `course_id`.
    ///
    /// Fails with `NotFound` when the course does not exist and `Conflict`
    /// when the user is already enrolled.
    async fn enroll(&self, user_id: &UserId, course_id: &CourseId) -> Result<Enrollment, Error>;

    /// Record progress against the caller's enrollment.
    async fn update_progress(
        &self,
        user_id: &UserId,
        target: EnrollmentTarget,
        update: ProgressUpdate,
    ) -> Result<Enrollment, Error>;
}
