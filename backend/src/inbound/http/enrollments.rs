//! Enrollment handlers.
//!
//! ```text
//! POST /api/enrollments/enroll {"courseId":"..."}
//! GET /api/enrollments/my-courses
//! PUT /api/enrollments/{id}/progress {"progress":40,"completedLessons":4}
//! PATCH /api/enrollments/course/{courseId}/progress {"progress":100}
//! ```

use actix_web::{HttpResponse, get, patch, post, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::{
    ApiResult, CourseId, EnrollmentId, EnrollmentTarget, Error, Progress, ProgressUpdate,
};
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::envelope::{Envelope, ErrorEnvelope};
use crate::inbound::http::schemas::{EnrollmentBody, MyEnrollmentsBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, invalid_field_error, missing_field_error, optional_json_body, parse_id,
    stored_count,
};

const PROGRESS_UPDATED: &str = "Progress updated successfully";

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollRequest {
    pub course_id: Option<String>,
}

/// Enroll the caller in a course.
#[utoipa::path(
    post,
    path = "/api/enrollments/enroll",
    request_body = EnrollRequest,
    responses(
        (status = 201, description = "Enrolled", body = Envelope<EnrollmentBody>),
        (status = 400, description = "Invalid request or already enrolled", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Course not found", body = ErrorEnvelope)
    ),
    tags = ["enrollments"],
    operation_id = "enroll"
)]
#[post("/enrollments/enroll")]
pub async fn enroll(
    state: web::Data<HttpState>,
    caller: Authenticated,
    payload: web::Json<EnrollRequest>,
) -> ApiResult<HttpResponse> {
    let field = FieldName::new("courseId");
    let raw = payload
        .course_id
        .as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .ok_or_else(|| missing_field_error(field, "courseId is required"))?;
    let course_id: CourseId = parse_id(raw.trim(), field)?;
    let enrollment = state.enrollments.enroll(caller.user_id(), &course_id).await?;
    Ok(Envelope::success(EnrollmentBody::from(&enrollment))
        .with_message("Successfully enrolled in course!")
        .created())
}

/// The caller's enrollments, most recently accessed first.
#[utoipa::path(
    get,
    path = "/api/enrollments/my-courses",
    responses(
        (status = 200, description = "Enrollments", body = Envelope<MyEnrollmentsBody>),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope)
    ),
    tags = ["enrollments"],
    operation_id = "myCourses"
)]
#[get("/enrollments/my-courses")]
pub async fn my_courses(
    state: web::Data<HttpState>,
    caller: Authenticated,
) -> ApiResult<HttpResponse> {
    let entries = state.enrollment_query.my_enrollments(caller.user_id()).await?;
    Ok(Envelope::success(MyEnrollmentsBody::new(&entries)).ok())
}

/// Progress report. Absent fields keep their stored values; `progress` is
/// clamped into `[0, 100]`. An empty body only refreshes `lastAccessed`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    pub progress: Option<f64>,
    #[schema(minimum = 0, maximum = 2_147_483_647)]
    pub completed_lessons: Option<u32>,
}

impl TryFrom<ProgressRequest> for ProgressUpdate {
    type Error = Error;

    fn try_from(value: ProgressRequest) -> Result<Self, Self::Error> {
        let progress = value
            .progress
            .map(Progress::clamped)
            .transpose()
            .map_err(|error| invalid_field_error(FieldName::new("progress"), error.to_string()))?;
        let completed_lessons =
            stored_count(FieldName::new("completedLessons"), value.completed_lessons)?;
        Ok(Self {
            progress,
            completed_lessons,
        })
    }
}

async fn record_progress(
    state: &HttpState,
    caller: &Authenticated,
    target: EnrollmentTarget,
    body: &web::Bytes,
) -> ApiResult<HttpResponse> {
    let payload: ProgressRequest = optional_json_body(body)?;
    let update = ProgressUpdate::try_from(payload)?;
    let enrollment = state
        .enrollments
        .update_progress(caller.user_id(), target, update)
        .await?;
    Ok(Envelope::success(EnrollmentBody::from(&enrollment))
        .with_message(PROGRESS_UPDATED)
        .ok())
}

#[utoipa::path(
    put,
    path = "/api/enrollments/{id}/progress",
    params(("id" = String, Path, description = "Enrollment identifier")),
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Progress recorded", body = Envelope<EnrollmentBody>),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Enrollment not found", body = ErrorEnvelope)
    ),
    tags = ["enrollments"],
    operation_id = "updateEnrollmentProgress"
)]
#[put("/enrollments/{id}/progress")]
pub async fn update_enrollment_progress(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let id: EnrollmentId = parse_id(&path, FieldName::new("id"))?;
    record_progress(&state, &caller, EnrollmentTarget::Enrollment(id), &body).await
}

#[utoipa::path(
    patch,
    path = "/api/enrollments/course/{courseId}/progress",
    params(("courseId" = String, Path, description = "Course identifier")),
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Progress recorded", body = Envelope<EnrollmentBody>),
        (status = 400, description = "Invalid request", body = ErrorEnvelope),
        (status = 401, description = "Unauthorised", body = ErrorEnvelope),
        (status = 404, description = "Not enrolled in this course", body = ErrorEnvelope)
    ),
    tags = ["enrollments"],
    operation_id = "updateCourseProgress"
)]
#[patch("/enrollments/course/{course_id}/progress")]
pub async fn update_course_progress(
    state: web::Data<HttpState>,
    caller: Authenticated,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let id: CourseId = parse_id(&path, FieldName::new("courseId"))?;
    record_progress(&state, &caller, EnrollmentTarget::Course(id), &body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestHarness, bearer, field, json_body};
    use actix_web::http::StatusCode;
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::test as actix_test;
    use rstest::rstest;
    use serde_json::{Value, json};

    #[rstest]
    #[case(json!({"progress": 150}), 100.0)]
    #[case(json!({"progress": -10}), 0.0)]
    #[case(json!({"progress": 42.5}), 42.5)]
    fn progress_requests_clamp(#[case] payload: Value, #[case] expected: f64) {
        let request: ProgressRequest = serde_json::from_value(payload).expect("valid payload");
        let update = ProgressUpdate::try_from(request).expect("valid update");
        assert_eq!(update.progress.map(Progress::value), Some(expected));
        assert_eq!(update.completed_lessons, None);
    }

    #[rstest]
    fn lesson_counts_beyond_storage_are_invalid() {
        let request = ProgressRequest {
            progress: None,
            completed_lessons: Some(3_000_000_000),
        };
        let error = ProgressUpdate::try_from(request).expect_err("too many lessons");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "completedLessons", "code": "invalid_value"}))
        );
    }

    async fn enrolled(harness: &TestHarness) -> (String, String) {
        let course = harness.seed_course("Touched", 0).await;
        let (learner, token) = harness.seed_user("touch@example.com", Role::User).await;
        let enrollment = harness
            .state()
            .enrollments
            .enroll(&learner.id, &course.id)
            .await
            .expect("enrolled");
        (enrollment.id.to_string(), token)
    }

    #[rstest]
    #[case(json!({}), StatusCode::BAD_REQUEST)]
    #[case(json!({"courseId": "nope"}), StatusCode::BAD_REQUEST)]
    #[case(json!({"courseId": CourseId::random().to_string()}), StatusCode::NOT_FOUND)]
    #[actix_web::test]
    async fn enroll_rejects_bad_course_ids(#[case] payload: Value, #[case] expected: StatusCode) {
        let harness = TestHarness::new();
        let (_, token) = harness.token_for(Role::User);
        let app = actix_test::init_service(harness.app()).await;

        let request = actix_test::TestRequest::post()
            .uri("/api/enrollments/enroll")
            .insert_header((AUTHORIZATION, bearer(&token)))
            .set_json(payload)
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn progress_on_unknown_targets_is_not_found() {
        let harness = TestHarness::new();
        let course = harness.seed_course("Unjoined", 0).await;
        let (_, token) = harness.token_for(Role::User);
        let app = actix_test::init_service(harness.app()).await;

        let by_course = actix_test::TestRequest::patch()
            .uri(&format!("/api/enrollments/course/{}/progress", course.id))
            .insert_header((AUTHORIZATION, bearer(&token)))
            .set_json(json!({"progress": 10}))
            .to_request();
        let response = actix_test::call_service(&app, by_course).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(
            field(&body, "message"),
            Some(&json!(
                "Enrollment not found. Please enroll in this course first."
            ))
        );

        let by_id = actix_test::TestRequest::put()
            .uri(&format!("/api/enrollments/{}/progress", EnrollmentId::random()))
            .insert_header((AUTHORIZATION, bearer(&token)))
            .set_json(json!({"progress": 10}))
            .to_request();
        let response = actix_test::call_service(&app, by_id).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(field(&body, "message"), Some(&json!("Enrollment not found")));
    }

    #[rstest]
    #[actix_web::test]
    async fn negative_lesson_counts_are_rejected() {
        let harness = TestHarness::new();
        let course = harness.seed_course("Lessons", 0).await;
        let (_, token) = harness.token_for(Role::User);
        let app = actix_test::init_service(harness.app()).await;

        let request = actix_test::TestRequest::patch()
            .uri(&format!("/api/enrollments/course/{}/progress", course.id))
            .insert_header((AUTHORIZATION, bearer(&token)))
            .set_json(json!({"completedLessons": -1}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(field(&body, "status"), Some(&json!("fail")));
        assert_eq!(field(&body, "details/code"), Some(&json!("malformed_body")));
    }

    #[rstest]
    #[actix_web::test]
    async fn empty_progress_bodies_only_touch_the_enrollment() {
        let harness = TestHarness::new();
        let (enrollment_id, token) = enrolled(&harness).await;
        let app = actix_test::init_service(harness.app()).await;

        let seed = actix_test::TestRequest::put()
            .uri(&format!("/api/enrollments/{enrollment_id}/progress"))
            .insert_header((AUTHORIZATION, bearer(&token)))
            .set_json(json!({"progress": 30, "completedLessons": 3}))
            .to_request();
        let seeded = json_body(actix_test::call_service(&app, seed).await).await;
        let seeded_access = field(&seeded, "data/lastAccessed").cloned();

        harness.clock().advance_seconds(90);
        let touch = actix_test::TestRequest::put()
            .uri(&format!("/api/enrollments/{enrollment_id}/progress"))
            .insert_header((AUTHORIZATION, bearer(&token)))
            .to_request();
        let response = actix_test::call_service(&app, touch).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(field(&body, "data/progress"), Some(&json!(30.0)));
        assert_eq!(field(&body, "data/completedLessons"), Some(&json!(3)));
        assert!(field(&body, "data/lastAccessed").is_some());
        assert_ne!(field(&body, "data/lastAccessed").cloned(), seeded_access);
    }

    #[rstest]
    #[actix_web::test]
    async fn oversized_lesson_counts_are_rejected_before_storage() {
        let harness = TestHarness::new();
        let (enrollment_id, token) = enrolled(&harness).await;
        let app = actix_test::init_service(harness.app()).await;

        let request = actix_test::TestRequest::put()
            .uri(&format!("/api/enrollments/{enrollment_id}/progress"))
            .insert_header((AUTHORIZATION, bearer(&token)))
            .set_json(json!({"completedLessons": 2_147_483_648_u64}))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(field(&body, "details/field"), Some(&json!("completedLessons")));
    }
}
