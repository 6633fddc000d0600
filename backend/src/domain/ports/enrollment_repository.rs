//! Port abstraction for enrollment persistence.
//!
//! Adapters own two invariants the domain relies on: at most one enrollment
//! per (user, course) pair, and enrollment creation bumping the course's
//! student counter in the same unit of work.
use async_trait::async_trait;

use crate::domain::{EnrolledCourse, Enrollment, EnrollmentTarget, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by enrollment repository adapters.
    pub enum EnrollmentPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "enrollment repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "enrollment repository query failed: {message}",
        /// The (user, course) pair is already enrolled.
        AlreadyEnrolled => "user is already enrolled in this course",
        /// The course disappeared before the counter could be bumped.
        CourseMissing => "course no longer exists",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Store a new enrollment and increment the course's student count
    /// atomically.
    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), EnrollmentPersistenceError>;

    /// Find the caller's enrollment by enrollment id or course id.
    async fn find_for_user(
        &self,
        user_id: &UserId,
        target: EnrollmentTarget,
    ) -> Result<Option<Enrollment>, EnrollmentPersistenceError>;

    /// Persist progress, completed lessons and timestamps.
    async fn save_progress(&self, enrollment: &Enrollment)
    -> Result<(), EnrollmentPersistenceError>;

    /// Every enrollment of `user_id` joined with its course, most recently
    /// accessed first.
    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EnrolledCourse>, EnrollmentPersistenceError>;
}
