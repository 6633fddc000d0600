//! Response envelopes shared by every endpoint.
//!
//! Successful responses wrap their payload as
//! `{"status": "success", "message": ..., "data": ...}`; failures use
//! [`ErrorEnvelope`] with `status` set to `fail` for client input problems and
//! `error` for everything else.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::ErrorCode;

/// Outcome marker carried in the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Fail,
    Error,
}

impl EnvelopeStatus {
    /// Classify a failure by its domain code.
    pub const fn for_error(code: ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidRequest | ErrorCode::Conflict => Self::Fail,
            _ => Self::Error,
        }
    }
}

/// Success envelope around `data`.
#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub status: EnvelopeStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: None,
            data,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Render with `status_code`.
    pub fn respond(self, status_code: StatusCode) -> HttpResponse {
        HttpResponse::build(status_code).json(self)
    }

    pub fn ok(self) -> HttpResponse {
        self.respond(StatusCode::OK)
    }

    pub fn created(self) -> HttpResponse {
        self.respond(StatusCode::CREATED)
    }
}

/// Success envelope carrying only a message and `"data": null`.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MessageEnvelope {
    pub status: EnvelopeStatus,
    pub message: String,
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
}

impl MessageEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: EnvelopeStatus::Success,
            message: message.into(),
            data: None,
        }
    }

    pub fn ok(self) -> HttpResponse {
        HttpResponse::Ok().json(self)
    }
}

/// Failure envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status: EnvelopeStatus,
    pub message: String,
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
