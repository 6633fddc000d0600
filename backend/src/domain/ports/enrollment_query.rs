//! Driving port for enrollment reads and the learner dashboard.

use async_trait::async_trait;

use crate::domain::{DashboardSummary, EnrolledCourse, Error, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EnrollmentQuery: Send + Sync {
    /// The caller's enrollments, most recently accessed first.
    async fn my_enrollments(&self, user_id: &UserId) -> Result<Vec<EnrolledCourse>, Error>;

    async fn dashboard(&self, user_id: &UserId) -> Result<DashboardSummary, Error>;
}
