//! Route table shared by the server and the test harness.
//!
//! ```text
//! /api/users/...        accounts and the learner dashboard
//! /api/courses/...      catalog
//! /api/enrollments/...  enrollment and progress
//! /uploads/...          stored media
//! ```
//!
//! Health probes, API docs and metrics are mounted by the server.

use actix_web::{HttpResponse, web};

use crate::domain::{Error, MAX_UPLOAD_BYTES};

use super::uploads::NOT_AVAILABLE;
use super::{courses, enrollments, uploads, users, validation};

/// Register the API, extractor settings and the 404 fallback.
///
/// # Examples
/// ```no_run
/// use actix_web::App;
/// use coursehub::inbound::http::routes;
///
/// let app = App::new().configure(routes::configure);
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(validation::json_config())
        .app_data(validation::query_config())
        .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
        .service(
            web::scope("/api")
                .service(users::register)
                .service(users::login)
                .service(users::list_users)
                .service(users::profile)
                .service(users::update_profile)
                .service(users::upload_avatar)
                .service(users::change_password)
                .service(users::delete_account)
                .service(users::dashboard)
                .service(courses::list_courses)
                .service(courses::create_course)
                .service(courses::get_course)
                .service(courses::update_course)
                .service(courses::upload_thumbnail)
                .service(courses::delete_course)
                .service(enrollments::enroll)
                .service(enrollments::my_courses)
                .service(enrollments::update_enrollment_progress)
                .service(enrollments::update_course_progress),
        )
        .service(uploads::serve_upload)
        .default_service(web::to(not_available));
}

async fn not_available() -> Result<HttpResponse, Error> {
    Err(Error::not_found(NOT_AVAILABLE))
}
