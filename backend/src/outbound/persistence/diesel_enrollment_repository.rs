//! PostgreSQL-backed `EnrollmentRepository` implementation using Diesel ORM.
//!
//! `enroll` inserts the enrollment and bumps the course's `students_count` in
//! one transaction. The `(user_id, course_id)` unique constraint turns a
//! concurrent duplicate into [`EnrollmentPersistenceError::AlreadyEnrolled`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{EnrollmentPersistenceError, EnrollmentRepository};
use crate::domain::{
    CourseSummary, EnrolledCourse, Enrollment, EnrollmentTarget, UserId,
};

use super::error_mapping::{DieselFailure, classify};
use super::models::{CourseRow, EnrollmentRow, ProgressChangeset};
use super::pool::{DbPool, PoolError};
use super::schema::{courses, enrollments};

/// Diesel-backed enrollment store.
#[derive(Clone)]
pub struct DieselEnrollmentRepository {
    pool: DbPool,
}

impl DieselEnrollmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside the enroll transaction.
#[derive(Debug)]
enum EnrollTxError {
    Diesel(diesel::result::Error),
    CourseMissing,
}

impl From<diesel::result::Error> for EnrollTxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_pool_error(error: PoolError) -> EnrollmentPersistenceError {
    EnrollmentPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> EnrollmentPersistenceError {
    match classify(error) {
        DieselFailure::Connection(message) => EnrollmentPersistenceError::connection(message),
        DieselFailure::Query(message) => EnrollmentPersistenceError::query(message),
        DieselFailure::UniqueViolation { .. } => EnrollmentPersistenceError::already_enrolled(),
    }
}

fn convert(row: EnrollmentRow) -> Result<Enrollment, EnrollmentPersistenceError> {
    Enrollment::try_from(row).map_err(EnrollmentPersistenceError::query)
}

fn join_row(
    (enrollment, course): (EnrollmentRow, Option<CourseRow>),
) -> Result<EnrolledCourse, EnrollmentPersistenceError> {
    let course = course
        .map(CourseSummary::try_from)
        .transpose()
        .map_err(EnrollmentPersistenceError::query)?;
    Ok(EnrolledCourse {
        enrollment: convert(enrollment)?,
        course,
    })
}

#[async_trait]
impl EnrollmentRepository for DieselEnrollmentRepository {
    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), EnrollmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = EnrollmentRow::from(enrollment);
        conn.transaction::<_, EnrollTxError, _>(|conn| {
            async move {
                diesel::insert_into(enrollments::table)
                    .values(&row)
                    .execute(conn)
                    .await?;
                let bumped = diesel::update(courses::table.filter(courses::id.eq(row.course_id)))
                    .set(courses::students_count.eq(courses::students_count + 1))
                    .execute(conn)
                    .await?;
                if bumped == 0 {
                    return Err(EnrollTxError::CourseMissing);
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|error| match error {
            EnrollTxError::Diesel(error) => map_diesel_error(error),
            EnrollTxError::CourseMissing => EnrollmentPersistenceError::course_missing(),
        })?;
        debug!(enrollment_id = %enrollment.id, "enrollment committed");
        Ok(())
    }

    async fn find_for_user(
        &self,
        user_id: &UserId,
        target: EnrollmentTarget,
    ) -> Result<Option<Enrollment>, EnrollmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let owned = enrollments::table
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .into_boxed();
        let query = match target {
            EnrollmentTarget::Enrollment(id) => {
                owned.filter(enrollments::id.eq(*id.as_uuid()))
            }
            EnrollmentTarget::Course(id) => {
                owned.filter(enrollments::course_id.eq(*id.as_uuid()))
            }
        };
        let row: Option<EnrollmentRow> = query
            .select(EnrollmentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(convert).transpose()
    }

    async fn save_progress(
        &self,
        enrollment: &Enrollment,
    ) -> Result<(), EnrollmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            enrollments::table.filter(enrollments::id.eq(enrollment.id.as_uuid())),
        )
        .set(&ProgressChangeset::from(enrollment))
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(EnrollmentPersistenceError::query("enrollment vanished during update"));
        }
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EnrolledCourse>, EnrollmentPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(EnrollmentRow, Option<CourseRow>)> = enrollments::table
            .left_join(courses::table.on(courses::id.eq(enrollments::course_id)))
            .filter(enrollments::user_id.eq(user_id.as_uuid()))
            .order_by((enrollments::last_accessed.desc(), enrollments::id.desc()))
            .select((EnrollmentRow::as_select(), Option::<CourseRow>::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(join_row).collect()
    }
}
