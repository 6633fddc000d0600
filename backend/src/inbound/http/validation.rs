//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every rejection is an `invalid_request` domain error whose `details`
//! object names the offending field and a machine-readable reason.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, web};
use pagination::{PagePolicy, PageRequest, PageRequestError};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use utoipa::IntoParams;

use crate::domain::{Error, ImageUpload, InvalidId, MediaKind};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    MalformedBody,
    MalformedQuery,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidValue => "invalid_value",
            Self::MalformedBody => "malformed_body",
            Self::MalformedQuery => "malformed_query",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": ErrorCode::MissingField.as_str(),
    }))
}

pub(crate) fn invalid_field_error(field: FieldName, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": ErrorCode::InvalidValue.as_str(),
    }))
}

/// Parse a UUID-backed identifier from a path or body field.
pub(crate) fn parse_id<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: std::str::FromStr<Err = InvalidId>,
{
    value.parse::<T>().map_err(|error| {
        Error::invalid_request(error.to_string()).with_details(json!({
            "field": field.as_str(),
            "value": value,
            "code": ErrorCode::InvalidUuid.as_str(),
        }))
    })
}

/// Reject counters that do not fit the signed `INTEGER` columns backing them.
pub(crate) fn stored_count(field: FieldName, value: Option<u32>) -> Result<Option<u32>, Error> {
    match value {
        Some(count) if i32::try_from(count).is_err() => Err(invalid_field_error(
            field,
            format!("{} must not exceed {}", field.as_str(), i32::MAX),
        )),
        other => Ok(other),
    }
}

/// Decode a JSON body where an empty payload means "no fields".
///
/// Non-empty bodies must still be valid JSON for `T`; the content type is not
/// inspected so bare `PUT`s from simple clients work.
pub(crate) fn optional_json_body<T>(body: &web::Bytes) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|error| {
        Error::invalid_request(format!("invalid request body: {error}"))
            .with_details(json!({ "code": ErrorCode::MalformedBody.as_str() }))
    })
}

/// Raw `page` and `limit` query parameters.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    /// One-based page number.
    pub page: Option<u64>,
    /// Items per page.
    pub limit: Option<u64>,
}

impl PageQuery {
    /// Apply `policy` to the raw parameters.
    pub(crate) fn resolve(&self, policy: PagePolicy) -> Result<PageRequest, Error> {
        policy.resolve(self.page, self.limit).map_err(|error| {
            let field = match error {
                PageRequestError::ZeroPage => "page",
                PageRequestError::ZeroLimit | PageRequestError::LimitTooLarge { .. } => "limit",
            };
            invalid_field_error(FieldName::new(field), error.to_string())
        })
    }
}

/// Validate a raw request body as an image upload of `kind`.
pub(crate) fn image_upload(
    kind: MediaKind,
    req: &HttpRequest,
    body: web::Bytes,
) -> Result<ImageUpload, Error> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    ImageUpload::new(kind, content_type, body.to_vec())
        .map_err(|error| invalid_field_error(FieldName::new("file"), error.to_string()))
}

fn json_error(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid request body: {error}"))
        .with_details(json!({ "code": ErrorCode::MalformedBody.as_str() }))
        .into()
}

fn query_error(error: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    Error::invalid_request(format!("invalid query string: {error}"))
        .with_details(json!({ "code": ErrorCode::MalformedQuery.as_str() }))
        .into()
}

/// JSON extractor settings: malformed bodies become enveloped 400s.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(json_error)
}

/// Query extractor settings: malformed query strings become enveloped 400s.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(query_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CourseId, ErrorCode as DomainCode};
    use rstest::rstest;

    #[rstest]
    fn parse_id_reports_field_and_value() {
        let error = parse_id::<CourseId>("nope", FieldName::new("courseId"))
            .expect_err("not a UUID");
        assert_eq!(error.code(), DomainCode::InvalidRequest);
        assert_eq!(
            error.details(),
            Some(&json!({"field": "courseId", "value": "nope", "code": "invalid_uuid"}))
        );
    }

    #[rstest]
    fn parse_id_accepts_uuids() {
        let id = CourseId::random();
        let parsed = parse_id::<CourseId>(&id.to_string(), FieldName::new("courseId"))
            .expect("valid UUID");
        assert_eq!(parsed, id);
    }

    #[rstest]
    #[case(Some(0), None, "page")]
    #[case(None, Some(0), "limit")]
    #[case(Some(2), Some(101), "limit")]
    fn page_query_rejections_name_the_field(
        #[case] page: Option<u64>,
        #[case] limit: Option<u64>,
        #[case] field: &str,
    ) {
        let error = PageQuery { page, limit }
            .resolve(PagePolicy::new(10, 100))
            .expect_err("rejected");
        assert_eq!(
            error.details().and_then(|details| details.get("field")),
            Some(&json!(field))
        );
    }

    #[rstest]
    fn uploads_require_a_supported_content_type() {
        let req = actix_web::test::TestRequest::default()
            .insert_header((CONTENT_TYPE, "text/plain"))
            .to_http_request();
        let error = image_upload(MediaKind::Avatar, &req, web::Bytes::from_static(b"hello"))
            .expect_err("not an image");
        assert_eq!(error.code(), DomainCode::InvalidRequest);
        assert_eq!(error.message(), "Unsupported image type: text/plain");
    }

    #[rstest]
    fn missing_fields_carry_their_name() {
        let error = missing_field_error(FieldName::new("courseId"), "courseId is required");
        assert_eq!(
            error.details(),
            Some(&json!({"field": "courseId", "code": "missing_field"}))
        );
    }

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Knobs {
        level: Option<u8>,
    }

    #[rstest]
    #[case(b"".as_slice())]
    #[case(b" \n".as_slice())]
    fn blank_bodies_decode_to_defaults(#[case] raw: &[u8]) {
        let knobs: Knobs =
            optional_json_body(&web::Bytes::copy_from_slice(raw)).expect("blank body");
        assert_eq!(knobs, Knobs::default());
    }

    #[rstest]
    fn non_blank_bodies_must_be_valid_json() {
        let knobs: Knobs =
            optional_json_body(&web::Bytes::from_static(br#"{"level":3}"#)).expect("json");
        assert_eq!(knobs.level, Some(3));

        let error = optional_json_body::<Knobs>(&web::Bytes::from_static(b"{level"))
            .expect_err("malformed");
        assert_eq!(error.details(), Some(&json!({"code": "malformed_body"})));
    }

    #[rstest]
    #[case(Some(2_147_483_647), true)]
    #[case(Some(2_147_483_648), false)]
    #[case(Some(u32::MAX), false)]
    #[case(None, true)]
    fn stored_counts_fit_signed_columns(#[case] value: Option<u32>, #[case] accepted: bool) {
        let result = stored_count(FieldName::new("completedLessons"), value);
        assert_eq!(result.is_ok(), accepted);
        if let Err(error) = result {
            assert_eq!(
                error.details(),
                Some(&json!({"field": "completedLessons", "code": "invalid_value"}))
            );
        }
    }
}
