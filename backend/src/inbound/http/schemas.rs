//! Wire representations of domain types.
//!
//! Domain types stay free of serialisation concerns; these bodies define the
//! camelCase JSON returned to clients and double as OpenAPI schemas.

use chrono::{DateTime, NaiveDate, Utc};
use pagination::PaginationMeta;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    Course, CourseCategory, CourseLevel, CourseSummary, DashboardCourseCard, DashboardStats,
    DashboardSummary, EnrolledCourse, Enrollment, EnrollmentStatus, MonthlyGoal, RecentActivity,
    Role, SessionToken, User,
};

/// Position of a page within a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationBody {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl From<PaginationMeta> for PaginationBody {
    fn from(meta: PaginationMeta) -> Self {
        Self {
            page: meta.page,
            limit: meta.limit,
            total: meta.total,
            pages: meta.pages,
        }
    }
}

/// Public view of an account. The password hash never leaves the server.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    #[schema(example = "uploads/default.png")]
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

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        let profile = &user.profile;
        Self {
            id: *user.id.as_uuid(),
            first_name: user.first_name.as_ref().to_owned(),
            last_name: user.last_name.as_ref().to_owned(),
            email: user.email.to_string(),
            role: user.role,
            avatar: user.avatar.to_string(),
            phone: profile.phone.clone(),
            bio: profile.bio.as_ref().map(|bio| bio.as_ref().to_owned()),
            location: profile.location.clone(),
            date_of_birth: profile.date_of_birth,
            occupation: profile.occupation.clone(),
            education: profile.education.clone(),
            is_active: user.is_active,
            is_email_verified: user.is_email_verified,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Account plus its freshly issued bearer token.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthBody {
    pub user: UserBody,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AuthBody {
    pub fn new(user: &User, token: SessionToken) -> Self {
        Self {
            user: UserBody::from(user),
            token: token.token,
            expires_at: token.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserListBody {
    pub users: Vec<UserBody>,
    pub pagination: PaginationBody,
}

/// Full catalog entry.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseBody {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: CourseCategory,
    pub level: CourseLevel,
    /// Length in hours.
    pub duration: f64,
    pub instructor: String,
    pub thumbnail: String,
    pub rating: f64,
    pub students_count: u32,
    pub lessons_count: u32,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Course> for CourseBody {
    fn from(course: &Course) -> Self {
        Self {
            id: *course.id.as_uuid(),
            title: course.title.clone(),
            description: course.description.clone(),
            price: course.price,
            category: course.category,
            level: course.level,
            duration: course.duration,
            instructor: course.instructor.clone(),
            thumbnail: course.thumbnail.to_string(),
            rating: course.rating,
            students_count: course.students_count,
            lessons_count: course.lessons_count,
            tags: course.tags.clone(),
            is_published: course.is_published,
            created_by: course.created_by.map(|id| *id.as_uuid()),
            created_at: course.created_at,
            updated_at: course.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseListBody {
    pub courses: Vec<CourseBody>,
    pub pagination: PaginationBody,
}

/// Course display fields joined onto an enrollment.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummaryBody {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub thumbnail: String,
    pub price: f64,
    pub rating: f64,
    pub duration: f64,
    pub category: CourseCategory,
    pub level: CourseLevel,
    pub students_count: u32,
}

impl From<&CourseSummary> for CourseSummaryBody {
    fn from(course: &CourseSummary) -> Self {
        Self {
            id: *course.id.as_uuid(),
            title: course.title.clone(),
            description: course.description.clone(),
            instructor: course.instructor.clone(),
            thumbnail: course.thumbnail.to_string(),
            price: course.price,
            rating: course.rating,
            duration: course.duration,
            category: course.category,
            level: course.level,
            students_count: course.students_count,
        }
    }
}

/// Enrollment record with its derived status.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentBody {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    #[schema(minimum = 0, maximum = 100)]
    pub progress: f64,
    pub completed_lessons: u32,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Enrollment> for EnrollmentBody {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            id: *enrollment.id.as_uuid(),
            user_id: *enrollment.user_id.as_uuid(),
            course_id: *enrollment.course_id.as_uuid(),
            progress: enrollment.progress.value(),
            completed_lessons: enrollment.completed_lessons,
            status: enrollment.status(),
            enrolled_at: enrollment.enrolled_at,
            last_accessed: enrollment.last_accessed,
            updated_at: enrollment.updated_at,
        }
    }
}

/// Enrollment joined with its course; `course` is null once the course is
/// deleted.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrolledCourseBody {
    #[serde(flatten)]
    pub enrollment: EnrollmentBody,
    pub course: Option<CourseSummaryBody>,
}

impl From<&EnrolledCourse> for EnrolledCourseBody {
    fn from(entry: &EnrolledCourse) -> Self {
        Self {
            enrollment: EnrollmentBody::from(&entry.enrollment),
            course: entry.course.as_ref().map(CourseSummaryBody::from),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MyEnrollmentsBody {
    pub count: usize,
    pub enrollments: Vec<EnrolledCourseBody>,
}

impl MyEnrollmentsBody {
    pub fn new(entries: &[EnrolledCourse]) -> Self {
        Self {
            count: entries.len(),
            enrollments: entries.iter().map(EnrolledCourseBody::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsBody {
    pub total_enrolled: usize,
    pub completed: usize,
    pub total_hours: f64,
    pub certificates: usize,
    pub avg_progress: u32,
}

impl From<DashboardStats> for DashboardStatsBody {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_enrolled: stats.total_enrolled,
            completed: stats.completed,
            total_hours: stats.total_hours,
            certificates: stats.certificates,
            avg_progress: stats.avg_progress,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCourseBody {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub thumbnail: String,
    pub instructor: String,
    pub rating: f64,
    pub duration: f64,
    pub price: f64,
    pub category: CourseCategory,
    pub level: CourseLevel,
    pub progress: f64,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub completed_lessons: u32,
    pub total_lessons: u32,
    pub students_count: u32,
}

impl From<&DashboardCourseCard> for DashboardCourseBody {
    fn from(card: &DashboardCourseCard) -> Self {
        Self {
            id: *card.enrollment_id.as_uuid(),
            course_id: *card.course_id.as_uuid(),
            title: card.title.clone(),
            thumbnail: card.thumbnail.to_string(),
            instructor: card.instructor.clone(),
            rating: card.rating,
            duration: card.duration,
            price: card.price,
            category: card.category,
            level: card.level,
            progress: card.progress.value(),
            status: card.status,
            enrolled_at: card.enrolled_at,
            last_accessed: card.last_accessed,
            completed_lessons: card.completed_lessons,
            total_lessons: card.total_lessons,
            students_count: card.students_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivityBody {
    pub course_title: String,
    pub last_accessed: DateTime<Utc>,
    pub progress: f64,
}

impl From<&RecentActivity> for RecentActivityBody {
    fn from(activity: &RecentActivity) -> Self {
        Self {
            course_title: activity.course_title.clone(),
            last_accessed: activity.last_accessed,
            progress: activity.progress.value(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct MonthlyGoalBody {
    pub target: u32,
    pub completed: u32,
    pub progress: u32,
}

impl From<MonthlyGoal> for MonthlyGoalBody {
    fn from(goal: MonthlyGoal) -> Self {
        Self {
            target: goal.target,
            completed: goal.completed,
            progress: goal.progress,
        }
    }
}

/// Learner dashboard.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBody {
    pub stats: DashboardStatsBody,
    pub enrollments: Vec<DashboardCourseBody>,
    pub recent_activity: Vec<RecentActivityBody>,
    pub monthly_goal: MonthlyGoalBody,
}

impl From<&DashboardSummary> for DashboardBody {
    fn from(summary: &DashboardSummary) -> Self {
        Self {
            stats: summary.stats.into(),
            enrollments: summary
                .enrollments
                .iter()
                .map(DashboardCourseBody::from)
                .collect(),
            recent_activity: summary
                .recent_activity
                .iter()
                .map(RecentActivityBody::from)
                .collect(),
            monthly_goal: summary.monthly_goal.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CourseId, Progress, UserId};
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    fn enrolled_courses_flatten_the_enrollment_and_null_missing_courses() {
        let now = Utc
            .with_ymd_and_hms(2026, 2, 3, 4, 5, 6)
            .single()
            .expect("valid timestamp");
        let mut enrollment = Enrollment::start(UserId::random(), CourseId::random(), now);
        enrollment.progress = Progress::COMPLETE;
        let body = EnrolledCourseBody::from(&EnrolledCourse {
            enrollment,
            course: None,
        });

        let value = serde_json::to_value(body).expect("serialise");
        assert_eq!(value.get("status"), Some(&json!("completed")));
        assert_eq!(value.get("progress"), Some(&json!(100.0)));
        assert_eq!(value.get("course"), Some(&Value::Null));
        assert!(value.get("enrollment").is_none());
        assert!(value.get("lastAccessed").is_some());
    }
}
