//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod envelope;
pub mod error;
pub mod health;
pub mod routes;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod uploads;
pub mod users;
pub mod validation;

pub use error::ApiResult;
