//! Test helpers for inbound HTTP components.

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::test as actix_test;
use serde_json::Value;

pub use crate::test_support::{SEEDED_PASSWORD, TestHarness, bearer};

/// Read a response body as JSON.
pub async fn json_body<B>(response: ServiceResponse<B>) -> Value
where
    B: MessageBody,
{
    let body = actix_test::read_body(response).await;
    serde_json::from_slice(&body).expect("response body is JSON")
}

/// Look up a `/`-separated path inside a JSON value.
pub fn field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/')
        .try_fold(value, |current, segment| match segment.parse::<usize>() {
            Ok(index) => current.get(index),
            Err(_) => current.get(segment),
        })
}
