//! Builders wiring domain services onto their outbound adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use coursehub::domain::ports::{
    CourseRepository, EnrollmentRepository, MediaStorage, PasswordHasher, TokenService,
    UserRepository,
};
use coursehub::domain::{
    AccountCollaborators, AccountService, CatalogService, DashboardCalendar, EnrollmentService,
};
use coursehub::inbound::http::state::HttpState;
use coursehub::outbound::credentials::{Argon2PasswordHasher, JwtTokenService};
use coursehub::outbound::memory::InMemoryStore;
use coursehub::outbound::persistence::{
    DieselCourseRepository, DieselEnrollmentRepository, DieselUserRepository,
};
use coursehub::outbound::storage::LocalMediaStorage;
use tracing::info;

use super::ServerConfig;

/// Adapters shared by every service regardless of the storage backend.
struct SharedAdapters {
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    media: Arc<dyn MediaStorage>,
    clock: Arc<dyn Clock>,
    calendar: DashboardCalendar,
    allow_role_self_assignment: bool,
}

/// Repositories backing the three aggregates.
struct Repositories<U, C, E> {
    users: Arc<U>,
    courses: Arc<C>,
    enrollments: Arc<E>,
}

fn wire_services<U, C, E>(repos: Repositories<U, C, E>, shared: SharedAdapters) -> HttpState
where
    U: UserRepository + 'static,
    C: CourseRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    let Repositories {
        users,
        courses,
        enrollments,
    } = repos;
    let accounts = Arc::new(
        AccountService::new(
            users,
            AccountCollaborators {
                hasher: shared.hasher,
                tokens: shared.tokens.clone(),
                media: shared.media.clone(),
                clock: shared.clock.clone(),
            },
        )
        .with_role_self_assignment(shared.allow_role_self_assignment),
    );
    let catalog = Arc::new(CatalogService::new(
        courses.clone(),
        shared.media.clone(),
        shared.clock.clone(),
    ));
    let enrollment_service = Arc::new(EnrollmentService::new(
        enrollments,
        courses,
        shared.clock,
        shared.calendar,
    ));
    HttpState {
        accounts: accounts.clone(),
        account_query: accounts,
        catalog: catalog.clone(),
        catalog_query: catalog,
        enrollments: enrollment_service.clone(),
        enrollment_query: enrollment_service,
        media: shared.media,
        tokens: shared.tokens,
    }
}

/// Build the HTTP state, using Diesel repositories when a pool is configured
/// and the in-memory store otherwise.
///
/// # Errors
/// Returns [`std::io::Error`] when the upload directory cannot be opened.
pub fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let media = LocalMediaStorage::open(&config.upload_dir).map_err(|err| {
        std::io::Error::other(format!(
            "failed to open upload directory {}: {err}",
            config.upload_dir.display()
        ))
    })?;
    let shared = SharedAdapters {
        hasher: Arc::new(Argon2PasswordHasher::new()),
        tokens: Arc::new(JwtTokenService::new(
            &config.jwt_secret,
            config.token_ttl,
            clock.clone(),
        )),
        media: Arc::new(media),
        clock,
        calendar: config.calendar,
        allow_role_self_assignment: config.allow_role_self_assignment,
    };

    let state = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL repositories");
            wire_services(
                Repositories {
                    users: Arc::new(DieselUserRepository::new(pool.clone())),
                    courses: Arc::new(DieselCourseRepository::new(pool.clone())),
                    enrollments: Arc::new(DieselEnrollmentRepository::new(pool.clone())),
                },
                shared,
            )
        }
        None => {
            info!("no database configured; records live in process memory");
            let store = Arc::new(InMemoryStore::new());
            wire_services(
                Repositories {
                    users: store.clone(),
                    courses: store.clone(),
                    enrollments: store,
                },
                shared,
            )
        }
    };
    Ok(web::Data::new(state))
}
