//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint from the inbound layer together
//! with the envelope schemas and a bearer token security scheme. Schemas
//! referenced by handler annotations are collected automatically.
//!
//! The generated specification backs Swagger UI (debug builds) and is
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::envelope::{EnvelopeStatus, ErrorEnvelope, MessageEnvelope};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the security scheme referenced by protected operations.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "Token returned by POST /api/users/register or /api/users/login.",
                    ))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Coursehub backend API",
        description = "Accounts, course catalog, enrollments and learner dashboards."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::profile,
        crate::inbound::http::users::update_profile,
        crate::inbound::http::users::upload_avatar,
        crate::inbound::http::users::change_password,
        crate::inbound::http::users::delete_account,
        crate::inbound::http::users::dashboard,
        crate::inbound::http::courses::list_courses,
        crate::inbound::http::courses::get_course,
        crate::inbound::http::courses::create_course,
        crate::inbound::http::courses::update_course,
        crate::inbound::http::courses::upload_thumbnail,
        crate::inbound::http::courses::delete_course,
        crate::inbound::http::enrollments::enroll,
        crate::inbound::http::enrollments::my_courses,
        crate::inbound::http::enrollments::update_enrollment_progress,
        crate::inbound::http::enrollments::update_course_progress,
        crate::inbound::http::uploads::serve_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorEnvelope, MessageEnvelope, EnvelopeStatus)),
    tags(
        (name = "users", description = "Accounts, profiles and the learner dashboard"),
        (name = "courses", description = "Course catalog"),
        (name = "enrollments", description = "Enrollment and progress tracking"),
        (name = "uploads", description = "Stored avatars and thumbnails"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
