//! Learner dashboard aggregation.
//!
//! [`DashboardSummary::compute`] is a pure function over the learner's joined
//! enrollments. Enrollments whose course has been deleted still count; their
//! course fields fall back to placeholders instead of failing the summary.

use std::num::NonZeroU32;

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};

use super::course::{CourseCategory, CourseLevel};
use super::enrollment::{EnrolledCourse, EnrollmentStatus, Progress, sort_by_recent_access};
use super::ids::{CourseId, EnrollmentId};
use super::media::MediaReference;

/// Number of entries in the recent activity feed.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;
/// Completions per month a learner aims for unless configured otherwise.
pub const DEFAULT_MONTHLY_TARGET: NonZeroU32 = match NonZeroU32::new(3) {
    Some(target) => target,
    None => NonZeroU32::MIN,
};

const MISSING_COURSE_TITLE: &str = "Course Not Found";
const UNKNOWN_COURSE_TITLE: &str = "Unknown Course";
const UNKNOWN_INSTRUCTOR: &str = "Unknown";

/// Calendar settings for the monthly goal.
///
/// The month boundary is evaluated in `offset` rather than the host time zone
/// so every replica agrees on when a month starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardCalendar {
    pub offset: FixedOffset,
    pub monthly_target: NonZeroU32,
}

impl Default for DashboardCalendar {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            monthly_target: DEFAULT_MONTHLY_TARGET,
        }
    }
}

impl DashboardCalendar {
    fn same_month(&self, left: DateTime<Utc>, right: DateTime<Utc>) -> bool {
        let left = left.with_timezone(&self.offset);
        let right = right.with_timezone(&self.offset);
        left.year() == right.year() && left.month() == right.month()
    }
}

/// Headline counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardStats {
    pub total_enrolled: usize,
    pub completed: usize,
    pub total_hours: f64,
    pub certificates: usize,
    pub avg_progress: u32,
}

/// One enrollment formatted for the dashboard grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardCourseCard {
    pub enrollment_id: EnrollmentId,
    pub course_id: CourseId,
    pub title: String,
    pub thumbnail: MediaReference,
    pub instructor: String,
    pub rating: f64,
    pub duration: f64,
    pub price: f64,
    pub category: CourseCategory,
    pub level: CourseLevel,
    pub progress: Progress,
    pub status: EnrollmentStatus,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub completed_lessons: u32,
    pub total_lessons: u32,
    pub students_count: u32,
}

/// Entry in the recent activity feed.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentActivity {
    pub course_title: String,
    pub last_accessed: DateTime<Utc>,
    pub progress: Progress,
}

/// Completions this calendar month against the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyGoal {
    pub target: u32,
    pub completed: u32,
    pub progress: u32,
}

/// Everything the dashboard page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub stats: DashboardStats,
    pub enrollments: Vec<DashboardCourseCard>,
    pub recent_activity: Vec<RecentActivity>,
    pub monthly_goal: MonthlyGoal,
}

impl DashboardSummary {
    /// Aggregate `entries` as seen at `now`.
    pub fn compute(
        mut entries: Vec<EnrolledCourse>,
        now: DateTime<Utc>,
        calendar: DashboardCalendar,
    ) -> Self {
        sort_by_recent_access(&mut entries);
        Self {
            stats: stats(&entries),
            enrollments: entries.iter().map(card).collect(),
            recent_activity: entries
                .iter()
                .take(RECENT_ACTIVITY_LIMIT)
                .map(|entry| RecentActivity {
                    course_title: entry.course.as_ref().map_or_else(
                        || UNKNOWN_COURSE_TITLE.to_owned(),
                        |course| course.title.clone(),
                    ),
                    last_accessed: entry.enrollment.last_accessed,
                    progress: entry.enrollment.progress,
                })
                .collect(),
            monthly_goal: monthly_goal(&entries, now, calendar),
        }
    }
}

fn stats(entries: &[EnrolledCourse]) -> DashboardStats {
    let completed = entries
        .iter()
        .filter(|entry| entry.enrollment.status() == EnrollmentStatus::Completed)
        .count();
    let certificates = entries
        .iter()
        .filter(|entry| {
            entry.enrollment.progress == Progress::COMPLETE
                || entry.enrollment.status() == EnrollmentStatus::Completed
        })
        .count();
    let total_hours = entries
        .iter()
        .filter_map(|entry| entry.course.as_ref())
        .map(|course| course.duration)
        .sum();
    DashboardStats {
        total_enrolled: entries.len(),
        completed,
        total_hours,
        certificates,
        avg_progress: average_progress(entries),
    }
}

fn average_progress(entries: &[EnrolledCourse]) -> u32 {
    if entries.is_empty() {
        return 0;
    }
    let total: f64 = entries
        .iter()
        .map(|entry| entry.enrollment.progress.value())
        .sum();
    let count = u32::try_from(entries.len()).unwrap_or(u32::MAX);
    rounded_percentage(total / f64::from(count))
}

fn rounded_percentage(value: f64) -> u32 {
    // Inputs are already within [0, 100].
    value.round().clamp(0.0, 100.0) as u32
}

fn monthly_goal(
    entries: &[EnrolledCourse],
    now: DateTime<Utc>,
    calendar: DashboardCalendar,
) -> MonthlyGoal {
    let completed = entries
        .iter()
        .filter(|entry| entry.enrollment.status() == EnrollmentStatus::Completed)
        .filter(|entry| calendar.same_month(entry.enrollment.updated_at, now))
        .count();
    let completed = u32::try_from(completed).unwrap_or(u32::MAX);
    let target = calendar.monthly_target.get();
    let ratio = f64::from(completed) * 100.0 / f64::from(target);
    MonthlyGoal {
        target,
        completed,
        progress: rounded_percentage(ratio.min(100.0)),
    }
}

fn card(entry: &EnrolledCourse) -> DashboardCourseCard {
    let enrollment = &entry.enrollment;
    let course = entry.course.as_ref();
    DashboardCourseCard {
        enrollment_id: enrollment.id,
        course_id: enrollment.course_id,
        title: course.map_or_else(|| MISSING_COURSE_TITLE.to_owned(), |c| c.title.clone()),
        thumbnail: course.map_or_else(MediaReference::default_course_thumbnail, |c| {
            c.thumbnail.clone()
        }),
        instructor: course.map_or_else(|| UNKNOWN_INSTRUCTOR.to_owned(), |c| c.instructor.clone()),
        rating: course.map_or(0.0, |c| c.rating),
        duration: course.map_or(0.0, |c| c.duration),
        price: course.map_or(0.0, |c| c.price),
        category: course.map_or_else(CourseCategory::default, |c| c.category),
        level: course.map_or_else(CourseLevel::default, |c| c.level),
        progress: enrollment.progress,
        status: enrollment.status(),
        enrolled_at: enrollment.enrolled_at,
        last_accessed: enrollment.last_accessed,
        completed_lessons: enrollment.completed_lessons,
        total_lessons: course.map_or(0, |c| c.lessons_count),
        students_count: course.map_or(0, |c| c.students_count),
    }
}
