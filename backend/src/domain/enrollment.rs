//! Enrollment model and progress tracking rules.
//!
//! An enrollment links one user to one course. Completion is never stored:
//! [`EnrollmentStatus::derive`] computes it from the recorded progress every
//! time it is read, so the status cannot drift from the percentage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::course::CourseSummary;
use super::ids::{CourseId, EnrollmentId, UserId};

/// Rejections raised for malformed progress input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrollmentValidationError {
    #[error("progress must be a finite number")]
    NonFiniteProgress,
}

/// Completion percentage in the closed range `[0, 100]`.
///
/// # Examples
/// ```
/// use coursehub::domain::Progress;
///
/// assert_eq!(Progress::clamped(150.0).unwrap().value(), 100.0);
/// assert_eq!(Progress::clamped(-10.0).unwrap().value(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize)]
#[serde(transparent)]
pub struct Progress(f64);

impl Progress {
    pub const NONE: Self = Self(0.0);
    pub const COMPLETE: Self = Self(100.0);

    /// Clamp a raw percentage into range. Out-of-range values are not errors.
    pub fn clamped(raw: f64) -> Result<Self, EnrollmentValidationError> {
        if !raw.is_finite() {
            return Err(EnrollmentValidationError::NonFiniteProgress);
        }
        Ok(Self(raw.clamp(Self::NONE.0, Self::COMPLETE.0)))
    }

    pub const fn value(self) -> f64 {
        self.0
    }

    pub fn is_complete(self) -> bool {
        self.0 >= Self::COMPLETE.0
    }
}

/// Lifecycle state derived from progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Completed,
}

impl EnrollmentStatus {
    /// `Completed` exactly when progress has reached 100.
    pub fn derive(progress: Progress) -> Self {
        if progress.is_complete() {
            Self::Completed
        } else {
            Self::Active
        }
    }
}

/// Stored enrollment record.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub progress: Progress,
    pub completed_lessons: u32,
    pub enrolled_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Enrollment {
    /// Open a fresh enrollment at zero progress.
    pub fn start(user_id: UserId, course_id: CourseId, now: DateTime<Utc>) -> Self {
        Self {
            id: EnrollmentId::random(),
            user_id,
            course_id,
            progress: Progress::NONE,
            completed_lessons: 0,
            enrolled_at: now,
            last_accessed: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> EnrollmentStatus {
        EnrollmentStatus::derive(self.progress)
    }

    /// Record a progress update. Access time moves even when nothing else
    /// changes.
    pub fn record(&mut self, update: ProgressUpdate, now: DateTime<Utc>) {
        if let Some(progress) = update.progress {
            self.progress = progress;
        }
        if let Some(completed_lessons) = update.completed_lessons {
            self.completed_lessons = completed_lessons;
        }
        self.last_accessed = now;
        self.updated_at = now;
    }
}

/// Optional progress fields supplied by a client.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProgressUpdate {
    pub progress: Option<Progress>,
    pub completed_lessons: Option<u32>,
}

/// How a progress update names its enrollment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentTarget {
    Enrollment(EnrollmentId),
    Course(CourseId),
}

impl EnrollmentTarget {
    /// Client-facing message when the target does not resolve.
    pub const fn not_found_message(self) -> &'static str {
        match self {
            Self::Enrollment(_) => "Enrollment not found",
            Self::Course(_) => "Enrollment not found. Please enroll in this course first.",
        }
    }

    pub fn matches(self, enrollment: &Enrollment) -> bool {
        match self {
            Self::Enrollment(id) => enrollment.id == id,
            Self::Course(id) => enrollment.course_id == id,
        }
    }
}

/// Enrollment joined with its course; `course` is `None` when the course no
/// longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrolledCourse {
    pub enrollment: Enrollment,
    pub course: Option<CourseSummary>,
}

/// Order enrollments most recently accessed first.
pub fn sort_by_recent_access(entries: &mut [EnrolledCourse]) {
    entries.sort_by(|left, right| {
        right
            .enrollment
            .last_accessed
            .cmp(&left.enrollment.last_accessed)
            .then_with(|| right.enrollment.id.cmp(&left.enrollment.id))
    });
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use rstest::{fixture, rstest};

    #[fixture]
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[fixture]
    fn enrollment(now: DateTime<Utc>) -> Enrollment {
        Enrollment::start(UserId::random(), CourseId::random(), now)
    }

    #[rstest]
    #[case(150.0, 100.0)]
    #[case(-10.0, 0.0)]
    #[case(42.5, 42.5)]
    #[case(100.0, 100.0)]
    fn progress_is_clamped(#[case] raw: f64, #[case] expected: f64) {
        let progress = Progress::clamped(raw).expect("finite input");
        assert!((progress.value() - expected).abs() < f64::EPSILON);
    }

    #[rstest]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    fn progress_rejects_non_finite_values(#[case] raw: f64) {
        assert_eq!(
            Progress::clamped(raw),
            Err(EnrollmentValidationError::NonFiniteProgress)
        );
    }

    #[rstest]
    #[case(0.0, EnrollmentStatus::Active)]
    #[case(99.9, EnrollmentStatus::Active)]
    #[case(100.0, EnrollmentStatus::Completed)]
    #[case(250.0, EnrollmentStatus::Completed)]
    fn status_derives_from_progress(#[case] raw: f64, #[case] expected: EnrollmentStatus) {
        let progress = Progress::clamped(raw).expect("finite input");
        assert_eq!(EnrollmentStatus::derive(progress), expected);
    }

    #[rstest]
    fn start_is_active_with_zero_progress(enrollment: Enrollment, now: DateTime<Utc>) {
        assert_eq!(enrollment.status(), EnrollmentStatus::Active);
        assert_eq!(enrollment.progress, Progress::NONE);
        assert_eq!(enrollment.completed_lessons, 0);
        assert_eq!(enrollment.enrolled_at, now);
        assert_eq!(enrollment.last_accessed, now);
    }

    #[rstest]
    fn record_touches_access_time_without_fields(mut enrollment: Enrollment, now: DateTime<Utc>) {
        let later = now + TimeDelta::minutes(3);
        enrollment.record(ProgressUpdate::default(), later);
        assert_eq!(enrollment.last_accessed, later);
        assert_eq!(enrollment.enrolled_at, now);
        assert_eq!(enrollment.progress, Progress::NONE);
    }

    #[rstest]
    fn status_is_not_sticky(mut enrollment: Enrollment, now: DateTime<Utc>) {
        enrollment.record(
            ProgressUpdate {
                progress: Some(Progress::COMPLETE),
                completed_lessons: Some(12),
            },
            now,
        );
        assert_eq!(enrollment.status(), EnrollmentStatus::Completed);

        enrollment.record(
            ProgressUpdate {
                progress: Some(Progress::clamped(40.0).expect("finite input")),
                completed_lessons: None,
            },
            now,
        );
        assert_eq!(enrollment.status(), EnrollmentStatus::Active);
        assert_eq!(enrollment.completed_lessons, 12);
    }

    #[rstest]
    fn recent_access_sorts_descending(now: DateTime<Utc>) {
        let older = Enrollment::start(UserId::random(), CourseId::random(), now);
        let newer = Enrollment::start(
            UserId::random(),
            CourseId::random(),
            now + TimeDelta::hours(1),
        );
        let mut entries = vec![
            EnrolledCourse {
                enrollment: older.clone(),
                course: None,
            },
            EnrolledCourse {
                enrollment: newer.clone(),
                course: None,
            },
        ];
        sort_by_recent_access(&mut entries);
        let ids: Vec<_> = entries.iter().map(|entry| entry.enrollment.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[rstest]
    fn target_messages_differ_by_path() {
        let by_course = EnrollmentTarget::Course(CourseId::random());
        assert!(by_course.not_found_message().contains("Please enroll"));
        let by_id = EnrollmentTarget::Enrollment(EnrollmentId::random());
        assert_eq!(by_id.not_found_message(), "Enrollment not found");
    }
}
