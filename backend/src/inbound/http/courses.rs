//! Catalog handlers.
//!
//! ```text
//! GET /api/courses?page=1&limit=12&search=rust&category=Development&sort=-price
//! GET /api/courses/{courseId}
//! POST /api/courses {"title":"Rust","description":"...","price":49,"duration":6,"instructor":"Ferris"}
//! ```
//!
//! Reads are public. Mutations sit behind the [`Staff`] role gate.

use actix_web::{HttpRequest, HttpResponse, delete, get, patch, post, put, web};
use pagination::PagePolicy;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{
    ApiResult, CourseCategory, CourseDraft, CourseFilter, CourseId, CourseLevel, CourseListQuery,
    CoursePatch, CourseSort, Error, MediaKind, split_tags,
};
use crate::inbound::http::auth::{Authorized, Staff};
use crate::inbound::http::envelope::{Envelope, ErrorEnvelope, MessageEnvelope};
use crate::inbound::http::schemas::{CourseBody, CourseListBody, PaginationBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, PageQuery, image_upload, invalid_field_error, missing_field_error, parse_id,
    stored_count,
};

const COURSES_PAGE_POLICY: PagePolicy = PagePolicy::new(12, 100);
const ALL_FIELDS_REQUIRED: &str = "All required fields must be provided";

/// Query parameters for `GET /api/courses`. Empty values are ignored.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CourseListParams {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Case-insensitive match on title, description or instructor.
    pub search: Option<String>,
    #[param(example = "Development")]
    pub category: Option<String>,
    #[param(example = "Beginner")]
    pub level: Option<String>,
    /// `createdAt`, `price`, `rating`, `studentsCount`, `title` or
    /// `duration`; prefix with `-` for descending.
    #[param(example = "-createdAt")]
    pub sort: Option<String>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|raw| !raw.is_empty())
}

fn parse_field<T>(value: Option<&str>, field: &'static str) -> Result<Option<T>, Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    non_empty(value)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|error| invalid_field_error(FieldName::new(field), error.to_string()))
        })
        .transpose()
}

impl CourseListParams {
    fn into_query(self) -> Result<CourseListQuery, Error> {
        let page = PageQuery {
            page: self.page,
            limit: self.limit,
        }
        .resolve(COURSES_PAGE_POLICY)?;
        let filter = CourseFilter {
            search: non_empty(self.search.as_deref()).map(str::to_owned),
            category: parse_field::<CourseCategory>(self.category.as_deref(), "category")?,
            level: parse_field::<CourseLevel>(self.level.as_deref(), "level")?,
        };
        let sort = parse_field::<CourseSort>(self.sort.as_deref(), "sort")?.unwrap_or_default();
        Ok(CourseListQuery { filter, sort, page })
    }
}

/// Browse the catalog.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseListParams),
    responses(
        (status = 200, description = "Page of courses", body = Envelope<CourseListBody>),
        (status = 400, description = "Invalid filter or pagination", body = ErrorEnvelope)
    ),
    tags = ["courses"],
    operation_id = "listCourses",
    security([])
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    params: web::Query<CourseListParams>,
) -> ApiResult<HttpResponse> {
    let query = params.into_inner().into_query()?;
    let listed = state.catalog_query.list_courses(query).await?;
    Ok(Envelope::success(CourseListBody {
        courses: listed.items.iter().map(CourseBody::from).collect(),
        pagination: PaginationBody::from(listed.pagination),
    })
    .ok())
}

fn course_id(raw: &str) -> Result<CourseId, Error> {
    parse_id(raw, FieldName::new("courseId"))
}

#[utoipa::path(
    get,
    path = "/api/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course", body = Envelope<CourseBody>),
        (status = 400, description = "Malformed identifier", body = ErrorEnvelope),
        (status = 404, description = "Course not found", body = ErrorEnvelope)
    ),
    tags = ["courses"],
    operation_id = "getCourse",
    security([])
)]
#[get("/courses/{course_id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = course_id(&path)?;
    let course = state.catalog_query.course(&id).await?;
    Ok(Envelope::success(CourseBody::from(&course)).ok())
}

/// Tags may arrive as a JSON array or a comma separated string.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl From<TagsInput> for Vec<String> {
    fn from(value: TagsInput) -> Self {
        match value {
            TagsInput::List(tags) => tags,
            TagsInput::Csv(raw) => split_tags(&raw),
        }
    }
}

/// Course fields accepted on create and update.
///
/// `thumbnail` and `studentsCount` are not writable here; unknown fields are
/// ignored.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[schema(minimum = 0)]
    pub price: Option<f64>,
    pub category: Option<CourseCategory>,
    pub level: Option<CourseLevel>,
    /// Length in hours.
    #[schema(minimum = 0)]
    pub duration: Option<f64>,
    pub instructor: Option<String>,
    #[schema(minimum = 0, maximum = 5)]
    pub rating: Option<f64>,
    #[schema(minimum = 0, maximum = 2_147_483_647)]
    pub lessons_count: Option<u32>,
    pub tags: Option<TagsInput>,
    pub is_published: Option<bool>,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, Error> {
    value.ok_or_else(|| missing_field_error(FieldName::new(field), ALL_FIELDS_REQUIRED))
}

fn required_text(value: Option<String>, field: &'static str) -> Result<String, Error> {
    required(value.filter(|raw| !raw.trim().is_empty()), field)
}

impl TryFrom<CourseRequest> for CourseDraft {
    type Error = Error;

    fn try_from(value: CourseRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: required_text(value.title, "title")?,
            description: required_text(value.description, "description")?,
            price: required(value.price, "price")?,
            category: value.category.unwrap_or_default(),
            level: value.level.unwrap_or_default(),
            duration: required(value.duration, "duration")?,
            instructor: required_text(value.instructor, "instructor")?,
            rating: value.rating.unwrap_or_default(),
            lessons_count: stored_count(FieldName::new("lessonsCount"), value.lessons_count)?
                .unwrap_or_default(),
            tags: value.tags.map(Vec::from).unwrap_or_default(),
            is_published: value.is_published.unwrap_or(true),
        })
    }
}

impl TryFrom<CourseRequest> for CoursePatch {
    type Error = Error;

    fn try_from(value: CourseRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            description: value.description,
            price: value.price,
            category: value.category,
            level: value.level,
            duration: value.duration,
            instructor: value.instructor,
            rating: value.rating,
            lessons_count: stored_count(FieldName::new("lessonsCount"), value.lessons_count)?,
            tags: value.tags.map(Vec::from),
            is_published: value.is_published,
        })
    }
}

/// Add a course owned by the caller.
#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Course created", body = Envelope<CourseBody>),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Forbidden", body = ErrorEnvelope)
    ),
    tags = ["courses"],
    operation_id = "createCourse"
)]
#[post("/courses")]
pub async fn create_course(
    state: web::Data<HttpState>,
    staff: Authorized<Staff>,
    payload: web::Json<CourseRequest>,
) -> ApiResult<HttpResponse> {
    let draft = CourseDraft::try_from(payload.into_inner())?;
    let course = state.catalog.create_course(staff.user_id(), draft).await?;
    Ok(Envelope::success(CourseBody::from(&course))
        .with_message("Course created successfully")
        .created())
}

#[utoipa::path(
    patch,
    path = "/api/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier")),
    request_body = CourseRequest,
    responses(
        (status = 200, description = "Course updated", body = Envelope<CourseBody>),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Forbidden", body = ErrorEnvelope),
        (status = 404, description = "Course not found", body = ErrorEnvelope)
    ),
    tags = ["courses"],
    operation_id = "updateCourse"
)]
#[patch("/courses/{course_id}")]
pub async fn update_course(
    state: web::Data<HttpState>,
    _staff: Authorized<Staff>,
    path: web::Path<String>,
    payload: web::Json<CourseRequest>,
) -> ApiResult<HttpResponse> {
    let id = course_id(&path)?;
    let patch = CoursePatch::try_from(payload.into_inner())?;
    let course = state.catalog.update_course(&id, patch).await?;
    Ok(Envelope::success(CourseBody::from(&course))
        .with_message("Course updated successfully")
        .ok())
}

/// Replace a course thumbnail with the raw image in the request body.
#[utoipa::path(
    put,
    path = "/api/courses/{courseId}/thumbnail",
    params(("courseId" = String, Path, description = "Course identifier")),
    request_body(
        content = Vec<u8>,
        content_type = "image/jpeg",
        description = "JPEG, PNG or WebP image, at most 5 MiB"
    ),
    responses(
        (status = 200, description = "Thumbnail replaced", body = Envelope<CourseBody>),
        (status = 400, description = "Missing or unsupported image", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Forbidden", body = ErrorEnvelope),
        (status = 404, description = "Course not found", body = ErrorEnvelope)
    ),
    tags = ["courses"],
    operation_id = "uploadCourseThumbnail"
)]
#[put("/courses/{course_id}/thumbnail")]
pub async fn upload_thumbnail(
    state: web::Data<HttpState>,
    _staff: Authorized<Staff>,
    path: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let id = course_id(&path)?;
    let upload = image_upload(MediaKind::CourseThumbnail, &req, body)?;
    let course = state.catalog.replace_thumbnail(&id, upload).await?;
    Ok(Envelope::success(CourseBody::from(&course))
        .with_message("Thumbnail updated successfully")
        .ok())
}

#[utoipa::path(
    delete,
    path = "/api/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier")),
    responses(
        (status = 200, description = "Course deleted", body = MessageEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 403, description = "Forbidden", body = ErrorEnvelope),
        (status = 404, description = "Course not found", body = ErrorEnvelope)
    ),
    tags = ["courses"],
    operation_id = "deleteCourse"
)]
#[delete("/courses/{course_id}")]
pub async fn delete_course(
    state: web::Data<HttpState>,
    _staff: Authorized<Staff>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = course_id(&path)?;
    state.catalog.delete_course(&id).await?;
    Ok(MessageEnvelope::new("Course deleted successfully").ok())
}
