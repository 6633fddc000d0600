//! Domain primitives, aggregates and services.
//!
//! Purpose: define strongly typed entities shared by the HTTP and persistence
//! adapters, plus the services that implement the driving ports. Nothing in
//! this module knows about Actix or Diesel.
//!
//! Public surface:
//! - Error / ErrorCode: transport agnostic failure payload.
//! - User, Course, Enrollment: the stored aggregates.
//! - DashboardSummary: the learner dashboard projection.
//! - AccountService, CatalogService, EnrollmentService: port implementations.

pub mod account_service;
pub mod auth;
pub mod catalog_service;
pub mod course;
pub mod dashboard;
pub mod enrollment;
pub mod enrollment_service;
pub mod error;
pub mod ids;
pub mod media;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountCollaborators, AccountService};
pub use self::auth::{
    CredentialValidationError, LoginCredentials, PASSWORD_MIN, PasswordHash, PlainPassword,
    SessionClaims, SessionToken,
};
pub use self::catalog_service::CatalogService;
pub use self::course::{
    Course, CourseCategory, CourseDraft, CourseFilter, CourseLevel, CourseListQuery, CoursePatch,
    CourseSort, CourseSortField, CourseSummary, CourseValidationError, split_tags,
};
pub use self::dashboard::{
    DashboardCalendar, DashboardCourseCard, DashboardStats, DashboardSummary, MonthlyGoal,
    RecentActivity,
};
pub use self::enrollment::{
    EnrolledCourse, Enrollment, EnrollmentStatus, EnrollmentTarget, EnrollmentValidationError,
    Progress, ProgressUpdate,
};
pub use self::enrollment_service::EnrollmentService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::ids::{CourseId, EnrollmentId, InvalidId, UserId};
pub use self::media::{
    ImageFormat, ImageUpload, MAX_UPLOAD_BYTES, MediaKind, MediaReference, UploadValidationError,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Bio, EmailAddress, NewAccount, PersonName, ProfileUpdate, Role, User, UserProfile,
    UserValidationError,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use coursehub::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
