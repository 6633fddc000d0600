//! Course catalog model.
//!
//! A [`Course`] is created from a validated [`CourseDraft`], edited through a
//! [`CoursePatch`], and listed with a [`CourseListQuery`]. The enrollment
//! counter is owned by the enrollment flow and never appears in drafts or
//! patches.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use pagination::PageRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{CourseId, UserId};
use super::media::MediaReference;

/// Minimum title length once trimmed.
pub const TITLE_MIN: usize = 2;
/// Highest allowed rating.
pub const RATING_MAX: f64 = 5.0;

/// Validation failures for course fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CourseValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },
    #[error("title must be at least {min} characters")]
    TitleTooShort { min: usize },
    #[error("{field} must be a non-negative number")]
    Negative { field: &'static str },
    #[error("rating must be between 0 and 5")]
    RatingOutOfRange,
    #[error("invalid category: {0}")]
    UnknownCategory(String),
    #[error("invalid level: {0}")]
    UnknownLevel(String),
    #[error("invalid sort field: {0}")]
    UnknownSort(String),
}

/// Closed set of catalog categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CourseCategory {
    Development,
    Design,
    Business,
    Marketing,
    #[serde(rename = "IT & Software")]
    ItAndSoftware,
    #[serde(rename = "Data Science")]
    DataScience,
    #[default]
    Other,
}

impl CourseCategory {
    pub const ALL: [Self; 7] = [
        Self::Development,
        Self::Design,
        Self::Business,
        Self::Marketing,
        Self::ItAndSoftware,
        Self::DataScience,
        Self::Other,
    ];

    /// Label stored and returned on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "Development",
            Self::Design => "Design",
            Self::Business => "Business",
            Self::Marketing => "Marketing",
            Self::ItAndSoftware => "IT & Software",
            Self::DataScience => "Data Science",
            Self::Other => "Other",
        }
    }
}

impl FromStr for CourseCategory {
    type Err = CourseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| CourseValidationError::UnknownCategory(s.to_owned()))
    }
}

impl fmt::Display for CourseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of difficulty levels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
    #[default]
    #[serde(rename = "All Levels")]
    AllLevels,
}

impl CourseLevel {
    pub const ALL: [Self; 4] = [
        Self::Beginner,
        Self::Intermediate,
        Self::Advanced,
        Self::AllLevels,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::AllLevels => "All Levels",
        }
    }
}

impl FromStr for CourseLevel {
    type Err = CourseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| CourseValidationError::UnknownLevel(s.to_owned()))
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: CourseCategory,
    pub level: CourseLevel,
    pub duration: f64,
    pub instructor: String,
    pub thumbnail: MediaReference,
    pub rating: f64,
    pub students_count: u32,
    pub lessons_count: u32,
    pub tags: Vec<String>,
    pub is_published: bool,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a course.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub category: CourseCategory,
    pub level: CourseLevel,
    pub duration: f64,
    pub instructor: String,
    pub rating: f64,
    pub lessons_count: u32,
    pub tags: Vec<String>,
    pub is_published: bool,
}

impl CourseDraft {
    /// Trim text fields and check every numeric bound.
    pub fn validate(mut self) -> Result<Self, CourseValidationError> {
        self.title = self.title.trim().to_owned();
        self.description = self.description.trim().to_owned();
        self.instructor = self.instructor.trim().to_owned();
        self.tags = normalise_tags(self.tags);
        validate_text(&self.title, &self.description, &self.instructor)?;
        validate_numbers(self.price, self.duration, self.rating)?;
        Ok(self)
    }

    /// Materialise the draft as a new course owned by `created_by`.
    pub fn into_course(self, created_by: UserId, now: DateTime<Utc>) -> Course {
        Course {
            id: CourseId::random(),
            title: self.title,
            description: self.description,
            price: self.price,
            category: self.category,
            level: self.level,
            duration: self.duration,
            instructor: self.instructor,
            thumbnail: MediaReference::default_course_thumbnail(),
            rating: self.rating,
            students_count: 0,
            lessons_count: self.lessons_count,
            tags: self.tags,
            is_published: self.is_published,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial course update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoursePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<CourseCategory>,
    pub level: Option<CourseLevel>,
    pub duration: Option<f64>,
    pub instructor: Option<String>,
    pub rating: Option<f64>,
    pub lessons_count: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub is_published: Option<bool>,
}

impl Course {
    /// Apply `patch`, leaving the course untouched when the result is invalid.
    pub fn apply(&mut self, patch: CoursePatch, now: DateTime<Utc>) -> Result<(), CourseValidationError> {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = title.trim().to_owned();
        }
        if let Some(description) = patch.description {
            next.description = description.trim().to_owned();
        }
        if let Some(instructor) = patch.instructor {
            next.instructor = instructor.trim().to_owned();
        }
        next.price = patch.price.unwrap_or(next.price);
        next.duration = patch.duration.unwrap_or(next.duration);
        next.rating = patch.rating.unwrap_or(next.rating);
        next.category = patch.category.unwrap_or(next.category);
        next.level = patch.level.unwrap_or(next.level);
        next.lessons_count = patch.lessons_count.unwrap_or(next.lessons_count);
        next.is_published = patch.is_published.unwrap_or(next.is_published);
        if let Some(tags) = patch.tags {
            next.tags = normalise_tags(tags);
        }
        validate_text(&next.title, &next.description, &next.instructor)?;
        validate_numbers(next.price, next.duration, next.rating)?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    /// Display projection used when joining enrollments to courses.
    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            instructor: self.instructor.clone(),
            thumbnail: self.thumbnail.clone(),
            price: self.price,
            rating: self.rating,
            duration: self.duration,
            category: self.category,
            level: self.level,
            students_count: self.students_count,
            lessons_count: self.lessons_count,
        }
    }
}

fn validate_text(title: &str, description: &str, instructor: &str) -> Result<(), CourseValidationError> {
    if title.is_empty() {
        return Err(CourseValidationError::Missing { field: "title" });
    }
    if title.chars().count() < TITLE_MIN {
        return Err(CourseValidationError::TitleTooShort { min: TITLE_MIN });
    }
    if description.is_empty() {
        return Err(CourseValidationError::Missing {
            field: "description",
        });
    }
    if instructor.is_empty() {
        return Err(CourseValidationError::Missing {
            field: "instructor",
        });
    }
    Ok(())
}

fn validate_numbers(price: f64, duration: f64, rating: f64) -> Result<(), CourseValidationError> {
    for (field, value) in [("price", price), ("duration", duration)] {
        if !value.is_finite() || value < 0.0 {
            return Err(CourseValidationError::Negative { field });
        }
    }
    if !(0.0..=RATING_MAX).contains(&rating) {
        return Err(CourseValidationError::RatingOutOfRange);
    }
    Ok(())
}

fn normalise_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_owned())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Split a comma separated tag list as sent by form clients.
pub fn split_tags(raw: &str) -> Vec<String> {
    normalise_tags(raw.split(',').map(str::to_owned).collect())
}

/// Course fields exposed alongside an enrollment.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseSummary {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub instructor: String,
    pub thumbnail: MediaReference,
    pub price: f64,
    pub rating: f64,
    pub duration: f64,
    pub category: CourseCategory,
    pub level: CourseLevel,
    pub students_count: u32,
    pub lessons_count: u32,
}

/// Sortable course attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseSortField {
    CreatedAt,
    Price,
    Rating,
    StudentsCount,
    Title,
    Duration,
}

/// Ordering requested by `?sort=`; a leading `-` means descending.
///
/// # Examples
/// ```
/// use coursehub::domain::{CourseSort, CourseSortField};
///
/// let sort: CourseSort = "-price".parse().unwrap();
/// assert_eq!(sort.field, CourseSortField::Price);
/// assert!(sort.descending);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseSort {
    pub field: CourseSortField,
    pub descending: bool,
}

impl Default for CourseSort {
    fn default() -> Self {
        Self {
            field: CourseSortField::CreatedAt,
            descending: true,
        }
    }
}

impl FromStr for CourseSort {
    type Err = CourseValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (descending, name) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let field = match name {
            "createdAt" => CourseSortField::CreatedAt,
            "price" => CourseSortField::Price,
            "rating" => CourseSortField::Rating,
            "studentsCount" => CourseSortField::StudentsCount,
            "title" => CourseSortField::Title,
            "duration" => CourseSortField::Duration,
            _ => return Err(CourseValidationError::UnknownSort(s.to_owned())),
        };
        Ok(Self { field, descending })
    }
}

impl CourseSort {
    /// Compare two courses under this ordering, breaking ties by id.
    pub fn compare(&self, left: &Course, right: &Course) -> Ordering {
        let ordering = match self.field {
            CourseSortField::CreatedAt => left.created_at.cmp(&right.created_at),
            CourseSortField::Price => left.price.total_cmp(&right.price),
            CourseSortField::Rating => left.rating.total_cmp(&right.rating),
            CourseSortField::StudentsCount => left.students_count.cmp(&right.students_count),
            CourseSortField::Title => left.title.cmp(&right.title),
            CourseSortField::Duration => left.duration.total_cmp(&right.duration),
        }
        .then_with(|| left.id.cmp(&right.id));
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Filters applied before pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    /// Case-insensitive substring matched against title, description and
    /// instructor.
    pub search: Option<String>,
    pub category: Option<CourseCategory>,
    pub level: Option<CourseLevel>,
}

impl CourseFilter {
    /// Whether `course` satisfies every populated filter.
    pub fn matches(&self, course: &Course) -> bool {
        if self.category.is_some_and(|category| category != course.category) {
            return false;
        }
        if self.level.is_some_and(|level| level != course.level) {
            return false;
        }
        match self.search.as_deref() {
            None => true,
            Some(term) => {
                let needle = term.to_lowercase();
                [&course.title, &course.description, &course.instructor]
                    .into_iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }
}

/// Listing request: filters, ordering and page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseListQuery {
    pub filter: CourseFilter,
    pub sort: CourseSort,
    pub page: PageRequest,
}
