//! PostgreSQL-backed `CourseRepository` implementation using Diesel ORM.
//!
//! Listing builds a boxed query so the optional filters and the requested
//! ordering compose at runtime. Search uses `ILIKE` with the user's term
//! escaped, matching the in-memory adapter's case-insensitive substring rule.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CoursePersistenceError, CourseRepository};
use crate::domain::{Course, CourseFilter, CourseId, CourseListQuery, CourseSort, CourseSortField};

use super::error_mapping::{
    DieselFailure, classify, collect_rows, page_bounds, total_from_db,
};
use super::models::{CourseChangeset, CourseRow, NewCourseRow};
use super::pool::{DbPool, PoolError};
use super::schema::courses;

type BoxedCourses = courses::BoxedQuery<'static, Pg>;

/// Diesel-backed catalog store.
#[derive(Clone)]
pub struct DieselCourseRepository {
    pool: DbPool,
}

impl DieselCourseRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> CoursePersistenceError {
    CoursePersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> CoursePersistenceError {
    match classify(error) {
        DieselFailure::Connection(message) => CoursePersistenceError::connection(message),
        DieselFailure::Query(message) => CoursePersistenceError::query(message),
        DieselFailure::UniqueViolation { constraint } => {
            CoursePersistenceError::query(format!("unique constraint violated: {constraint:?}"))
        }
    }
}

/// Escape `LIKE` metacharacters so the term matches literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn filtered(filter: &CourseFilter) -> BoxedCourses {
    let mut query = courses::table.into_boxed();
    if let Some(category) = filter.category {
        query = query.filter(courses::category.eq(category.as_str()));
    }
    if let Some(level) = filter.level {
        query = query.filter(courses::level.eq(level.as_str()));
    }
    if let Some(term) = filter.search.as_deref() {
        let pattern = like_pattern(term);
        query = query.filter(
            courses::title
                .ilike(pattern.clone())
                .or(courses::description.ilike(pattern.clone()))
                .or(courses::instructor.ilike(pattern)),
        );
    }
    query
}

fn sorted(query: BoxedCourses, sort: CourseSort) -> BoxedCourses {
    let query = match (sort.field, sort.descending) {
        (CourseSortField::CreatedAt, false) => query.order_by(courses::created_at.asc()),
        (CourseSortField::CreatedAt, true) => query.order_by(courses::created_at.desc()),
        (CourseSortField::Price, false) => query.order_by(courses::price.asc()),
        (CourseSortField::Price, true) => query.order_by(courses::price.desc()),
        (CourseSortField::Rating, false) => query.order_by(courses::rating.asc()),
        (CourseSortField::Rating, true) => query.order_by(courses::rating.desc()),
        (CourseSortField::StudentsCount, false) => query.order_by(courses::students_count.asc()),
        (CourseSortField::StudentsCount, true) => query.order_by(courses::students_count.desc()),
        (CourseSortField::Title, false) => query.order_by(courses::title.asc()),
        (CourseSortField::Title, true) => query.order_by(courses::title.desc()),
        (CourseSortField::Duration, false) => query.order_by(courses::duration.asc()),
        (CourseSortField::Duration, true) => query.order_by(courses::duration.desc()),
    };
    if sort.descending {
        query.then_order_by(courses::id.desc())
    } else {
        query.then_order_by(courses::id.asc())
    }
}

fn convert(row: CourseRow) -> Result<Course, CoursePersistenceError> {
    Course::try_from(row).map_err(CoursePersistenceError::query)
}

#[async_trait]
impl CourseRepository for DieselCourseRepository {
    async fn insert(&self, course: &Course) -> Result<(), CoursePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(courses::table)
            .values(&NewCourseRow::from(course))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn update(&self, course: &Course) -> Result<bool, CoursePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(courses::table.filter(courses::id.eq(course.id.as_uuid())))
            .set(&CourseChangeset::from(course))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(updated > 0)
    }

    async fn find_by_id(&self, id: &CourseId) -> Result<Option<Course>, CoursePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<CourseRow> = courses::table
            .filter(courses::id.eq(id.as_uuid()))
            .select(CourseRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(convert).transpose()
    }

    async fn delete(&self, id: &CourseId) -> Result<bool, CoursePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(courses::table.filter(courses::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(deleted > 0)
    }

    async fn list(&self, query: &CourseListQuery) -> Result<Vec<Course>, CoursePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (offset, limit) = page_bounds(query.page);
        let rows: Vec<CourseRow> = sorted(filtered(&query.filter), query.sort)
            .select(CourseRow::as_select())
            .offset(offset)
            .limit(limit)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        collect_rows(rows.into_iter().map(Course::try_from), |message| {
            CoursePersistenceError::query(message)
        })
    }

    async fn count(&self, filter: &CourseFilter) -> Result<u64, CoursePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let total: i64 = filtered(filter)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(total_from_db(total))
    }
}
