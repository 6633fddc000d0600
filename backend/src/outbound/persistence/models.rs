//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Conversions back into domain types are
//! fallible because stored text columns are re-validated on the way out.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Bio, Course, CourseCategory, CourseId, CourseLevel, CourseSummary, EmailAddress, Enrollment,
    EnrollmentId, MediaReference, PasswordHash, PersonName, Progress, Role, User, UserId,
    UserProfile,
};

use super::schema::{courses, enrollments, users};

/// Saturating conversion for counters stored as `INTEGER`.
pub(crate) fn count_to_db(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Counters are guarded by `CHECK (... >= 0)`; negatives read back as zero.
pub(crate) fn count_from_db(value: i32) -> u32 {
    u32::try_from(value).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub avatar: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = String;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let invalid = |err: crate::domain::UserValidationError| {
            format!("stored user {} is invalid: {err}", row.id)
        };
        Ok(Self {
            id: UserId::from_uuid(row.id),
            first_name: PersonName::new("firstName", &row.first_name).map_err(invalid)?,
            last_name: PersonName::new("lastName", &row.last_name).map_err(invalid)?,
            email: EmailAddress::new(&row.email).map_err(invalid)?,
            password_hash: PasswordHash::new(row.password_hash),
            role: row.role.parse::<Role>().map_err(invalid)?,
            avatar: MediaReference::new(row.avatar),
            profile: UserProfile {
                phone: row.phone,
                bio: row.bio.map(Bio::new).transpose().map_err(invalid)?,
                location: row.location,
                date_of_birth: row.date_of_birth,
                occupation: row.occupation,
                education: row.education,
            },
            is_active: row.is_active,
            is_email_verified: row.is_email_verified,
            last_login: row.last_login,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert and full-update shape for the users table.
///
/// `treat_none_as_null` lets profile fields be cleared on update.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserRecord<'a> {
    pub id: Uuid,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
    pub avatar: &'a str,
    pub phone: Option<&'a str>,
    pub bio: Option<&'a str>,
    pub location: Option<&'a str>,
    pub date_of_birth: Option<NaiveDate>,
    pub occupation: Option<&'a str>,
    pub education: Option<&'a str>,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for UserRecord<'a> {
    fn from(user: &'a User) -> Self {
        let profile = &user.profile;
        Self {
            id: *user.id.as_uuid(),
            first_name: user.first_name.as_ref(),
            last_name: user.last_name.as_ref(),
            email: user.email.as_ref(),
            password_hash: user.password_hash.as_str(),
            role: user.role.as_str(),
            avatar: user.avatar.as_ref(),
            phone: profile.phone.as_deref(),
            bio: profile.bio.as_ref().map(AsRef::as_ref),
            location: profile.location.as_deref(),
            date_of_birth: profile.date_of_birth,
            occupation: profile.occupation.as_deref(),
            education: profile.education.as_deref(),
            is_active: user.is_active,
            is_email_verified: user.is_email_verified,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = courses)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CourseRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub level: String,
    pub duration: f64,
    pub instructor: String,
    pub thumbnail: String,
    pub rating: f64,
    pub students_count: i32,
    pub lessons_count: i32,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<CourseRow> for Course {
    type Error = String;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        let invalid = |err: crate::domain::CourseValidationError| {
            format!("stored course {} is invalid: {err}", row.id)
        };
        Ok(Self {
            id: CourseId::from_uuid(row.id),
            category: row.category.parse::<CourseCategory>().map_err(invalid)?,
            level: row.level.parse::<CourseLevel>().map_err(invalid)?,
            title: row.title,
            description: row.description,
            price: row.price,
            duration: row.duration,
            instructor: row.instructor,
            thumbnail: MediaReference::new(row.thumbnail),
            rating: row.rating,
            students_count: count_from_db(row.students_count),
            lessons_count: count_from_db(row.lessons_count),
            tags: row.tags,
            is_published: row.is_published,
            created_by: row.created_by.map(UserId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

impl TryFrom<CourseRow> for CourseSummary {
    type Error = String;

    fn try_from(row: CourseRow) -> Result<Self, Self::Error> {
        Course::try_from(row).map(|course| course.summary())
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = courses)]
pub(crate) struct NewCourseRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub category: &'a str,
    pub level: &'a str,
    pub duration: f64,
    pub instructor: &'a str,
    pub thumbnail: &'a str,
    pub rating: f64,
    pub students_count: i32,
    pub lessons_count: i32,
    pub tags: &'a [String],
    pub is_published: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Course> for NewCourseRow<'a> {
    fn from(course: &'a Course) -> Self {
        Self {
            id: *course.id.as_uuid(),
            title: &course.title,
            description: &course.description,
            price: course.price,
            category: course.category.as_str(),
            level: course.level.as_str(),
            duration: course.duration,
            instructor: &course.instructor,
            thumbnail: course.thumbnail.as_ref(),
            rating: course.rating,
            students_count: count_to_db(course.students_count),
            lessons_count: count_to_db(course.lessons_count),
            tags: &course.tags,
            is_published: course.is_published,
            created_by: course.created_by.map(|id| *id.as_uuid()),
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

/// Editable course columns. `students_count` is absent on purpose so an
/// edit can never overwrite a concurrent enrollment bump.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = courses)]
pub(crate) struct CourseChangeset<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub price: f64,
    pub category: &'a str,
    pub level: &'a str,
    pub duration: f64,
    pub instructor: &'a str,
    pub thumbnail: &'a str,
    pub rating: f64,
    pub lessons_count: i32,
    pub tags: &'a [String],
    pub is_published: bool,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a Course> for CourseChangeset<'a> {
    fn from(course: &'a Course) -> Self {
        Self {
            title: &course.title,
            description: &course.description,
            price: course.price,
            category: course.category.as_str(),
            level: course.level.as_str(),
            duration: course.duration,
            instructor: &course.instructor,
            thumbnail: course.thumbnail.as_ref(),
            rating: course.rating,
            lessons_count: count_to_db(course.lessons_count),
            tags: &course.tags,
            is_published: course.is_published,
            updated_at: course.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Enrollments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Queryable, Selectable, Insertable)]
#[diesel(table_name = enrollments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EnrollmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub progress: f64,
    pub completed_lessons: i32,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Enrollment> for EnrollmentRow {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: *enrollment.id.as_uuid(),
            user_id: *enrollment.user_id.as_uuid(),
            course_id: *enrollment.course_id.as_uuid(),
            progress: enrollment.progress.value(),
            completed_lessons: count_to_db(enrollment.completed_lessons),
            enrolled_at: enrollment.enrolled_at,
            last_accessed: enrollment.last_accessed,
            updated_at: enrollment.updated_at,
        }
    }
}

impl TryFrom<EnrollmentRow> for Enrollment {
    type Error = String;

    fn try_from(row: EnrollmentRow) -> Result<Self, Self::Error> {
        let progress = Progress::clamped(row.progress)
            .map_err(|err| format!("stored enrollment {} is invalid: {err}", row.id))?;
        Ok(Self {
            id: EnrollmentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            course_id: CourseId::from_uuid(row.course_id),
            progress,
            completed_lessons: count_from_db(row.completed_lessons),
            enrolled_at: row.enrolled_at,
            last_accessed: row.last_accessed,
            updated_at: row.updated_at,
        })
    }
}

/// Progress columns written by an update.
#[derive(Debug, Clone, Copy, AsChangeset)]
#[diesel(table_name = enrollments)]
pub(crate) struct ProgressChangeset {
    pub progress: f64,
    pub completed_lessons: i32,
    pub last_accessed: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Enrollment> for ProgressChangeset {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            progress: enrollment.progress.value(),
            completed_lessons: count_to_db(enrollment.completed_lessons),
            last_accessed: enrollment.last_accessed,
            updated_at: enrollment.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion coverage.
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    fn user_row(now: DateTime<Utc>) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            role: "MANAGER".to_owned(),
            avatar: "uploads/default.png".to_owned(),
            phone: None,
            bio: Some("Analyst".to_owned()),
            location: None,
            date_of_birth: None,
            occupation: None,
            education: None,
            is_active: true,
            is_email_verified: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn user_row_round_trips_through_record(now: DateTime<Utc>) {
        let user = User::try_from(user_row(now)).expect("valid row");
        assert_eq!(user.role, Role::Manager);
        let record = UserRecord::from(&user);
        assert_eq!(record.role, "MANAGER");
        assert_eq!(record.bio, Some("Analyst"));
    }

    #[rstest]
    fn user_row_with_unknown_role_is_rejected(now: DateTime<Utc>) {
        let mut row = user_row(now);
        row.role = "ROOT".to_owned();
        let error = User::try_from(row).expect_err("unknown role");
        assert!(error.contains("unknown role"));
    }

    #[rstest]
    #[case(-3, 0)]
    #[case(7, 7)]
    fn negative_counts_read_as_zero(#[case] stored: i32, #[case] expected: u32) {
        assert_eq!(count_from_db(stored), expected);
    }

    #[rstest]
    fn course_changeset_omits_student_count(now: DateTime<Utc>) {
        let row = CourseRow {
            id: Uuid::new_v4(),
            title: "Data Basics".to_owned(),
            description: "Tables and charts".to_owned(),
            price: 0.0,
            category: "Data Science".to_owned(),
            level: "All Levels".to_owned(),
            duration: 2.0,
            instructor: "Grace".to_owned(),
            thumbnail: "uploads/courses/default-course.jpg".to_owned(),
            rating: 0.0,
            students_count: 41,
            lessons_count: 3,
            tags: Vec::new(),
            is_published: true,
            created_by: None,
            created_at: now,
            updated_at: now,
        };
        let course = Course::try_from(row).expect("valid row");
        assert_eq!(course.category, CourseCategory::DataScience);
        assert_eq!(course.students_count, 41);
        let changeset = CourseChangeset::from(&course);
        assert_eq!(changeset.lessons_count, 3);
    }
}
