//! Helpers shared by the HTTP integration suites.

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::test as actix_test;
use serde_json::Value;

/// Decode a response body as JSON.
pub async fn json_body<B: MessageBody>(response: ServiceResponse<B>) -> Value {
    let bytes = actix_test::read_body(response).await;
    serde_json::from_slice(&bytes).expect("response body is JSON")
}

/// Walk a `/`-separated path of object keys and array indices.
pub fn field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('/').try_fold(value, |current, segment| {
        segment
            .parse::<usize>()
            .ok()
            .map_or_else(|| current.get(segment), |index| current.get(index))
    })
}

/// Read a string field, panicking with the path when absent.
pub fn string_at(value: &Value, path: &str) -> String {
    field(value, path)
        .and_then(Value::as_str)
        .unwrap_or_else(|| panic!("expected string at {path} in {value}"))
        .to_owned()
}
