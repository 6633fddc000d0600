//! Serves stored avatars and thumbnails under `/uploads/...`.

use actix_web::http::header::{self, CacheControl, CacheDirective};
use actix_web::{HttpResponse, get, web};
use tracing::debug;

use crate::domain::ports::MediaStorageError;
use crate::domain::{ApiResult, Error};
use crate::inbound::http::envelope::ErrorEnvelope;
use crate::inbound::http::state::HttpState;

pub(crate) const NOT_AVAILABLE: &str = "this resource is not available";
const MEDIA_MAX_AGE_SECS: u32 = 24 * 60 * 60;

/// Fetch a stored upload by its path below the upload root.
#[utoipa::path(
    get,
    path = "/uploads/{path}",
    params(("path" = String, Path, description = "Path returned in an avatar or thumbnail reference")),
    responses(
        (status = 200, description = "Image bytes", content_type = "image/*"),
        (status = 404, description = "No such upload", body = ErrorEnvelope)
    ),
    tags = ["uploads"],
    operation_id = "getUpload",
    security([])
)]
#[get("/uploads/{path:.*}")]
pub async fn serve_upload(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let stored = match state.media.load(&path).await {
        Ok(stored) => stored,
        Err(MediaStorageError::InvalidPath { path }) => {
            debug!(%path, "rejected upload path");
            None
        }
        Err(error) => return Err(Error::internal(error.to_string())),
    };
    let media = stored.ok_or_else(|| Error::not_found(NOT_AVAILABLE))?;
    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, media.content_type))
        .insert_header(CacheControl(vec![
            CacheDirective::Public,
            CacheDirective::MaxAge(MEDIA_MAX_AGE_SECS),
        ]))
        .body(media.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MediaStorage;
    use crate::domain::{ImageUpload, MediaKind};
    use crate::inbound::http::test_utils::TestHarness;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use rstest::rstest;

    #[rstest]
    #[actix_web::test]
    async fn stored_uploads_are_served_with_their_content_type() {
        let harness = TestHarness::new();
        let upload = ImageUpload::new(MediaKind::Avatar, "image/gif", b"GIF89a".to_vec())
            .expect("valid upload");
        let reference = harness.media().store(&upload).await.expect("stored");
        let app = actix_test::init_service(harness.app()).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/{reference}"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"image/gif"[..])
        );
        let body = actix_test::read_body(response).await;
        assert_eq!(&body[..], b"GIF89a");
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_uploads_are_not_available() {
        let harness = TestHarness::new();
        let app = actix_test::init_service(harness.app()).await;

        let request = actix_test::TestRequest::get()
            .uri("/uploads/users/missing.png")
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
