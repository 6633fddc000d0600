//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers turn
//! domain failures into consistent JSON envelopes and status codes.

use std::sync::OnceLock;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

use super::envelope::{EnvelopeStatus, ErrorEnvelope};

pub use crate::domain::ApiResult;

const REDACTED_MESSAGE: &str = "Internal server error";

static EXPOSE_INTERNAL_ERRORS: OnceLock<bool> = OnceLock::new();

/// Keep internal error messages and details in responses.
///
/// Meant for development deployments only and honoured once per process;
/// later calls are ignored. Internal errors are redacted when never set.
pub fn expose_internal_errors(expose: bool) {
    let _already_configured = EXPOSE_INTERNAL_ERRORS.set(expose).is_err();
}

fn internal_errors_exposed() -> bool {
    EXPOSE_INTERNAL_ERRORS.get().copied().unwrap_or(false)
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::Conflict => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Build the client payload, hiding internal failures unless `expose` is set.
pub(crate) fn envelope_for(error: &Error, expose: bool) -> ErrorEnvelope {
    let code = error.code();
    let redact = matches!(code, ErrorCode::InternalError) && !expose;
    ErrorEnvelope {
        status: EnvelopeStatus::for_error(code),
        message: if redact {
            REDACTED_MESSAGE.to_owned()
        } else {
            error.message().to_owned()
        },
        code,
        trace_id: error.trace_id().map(str::to_owned),
        details: if redact { None } else { error.details().cloned() },
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        if self.code() == ErrorCode::InternalError {
            tracing::error!(message = self.message(), "request failed with internal error");
        }
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(envelope_for(self, internal_errors_exposed()))
    }
}
