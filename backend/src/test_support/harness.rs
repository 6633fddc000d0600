//! In-memory application harness for HTTP tests.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{CourseRepository, TokenService, UserRepository};
use crate::domain::{
    AccountCollaborators, AccountService, CatalogService, Course, CourseCategory, CourseDraft,
    CourseLevel, DashboardCalendar, EmailAddress, EnrollmentService, NewAccount, PasswordHash,
    PersonName, Role, SessionClaims, User, UserId,
};
use crate::inbound::http::routes;
use crate::inbound::http::state::HttpState;
use crate::outbound::credentials::JwtTokenService;
use crate::outbound::memory::InMemoryStore;

use super::MutableClock;
use super::doubles::{MemoryMediaStorage, PlainPasswordHasher};

/// Signing secret used by harness tokens.
pub const TEST_JWT_SECRET: &[u8] = b"coursehub-test-secret";
/// Password accepted for every seeded account.
pub const SEEDED_PASSWORD: &str = "password123";

/// Format an `Authorization` header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

fn start_of_test_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 4, 10, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("harness start time is valid"))
}

/// Fully wired in-memory application state plus handles to its parts.
pub struct TestHarness {
    store: Arc<InMemoryStore>,
    clock: Arc<MutableClock>,
    media: Arc<MemoryMediaStorage>,
    tokens: Arc<JwtTokenService>,
    state: web::Data<HttpState>,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_calendar(DashboardCalendar::default())
    }

    pub fn with_calendar(calendar: DashboardCalendar) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(MutableClock::new(start_of_test_time()));
        let media = Arc::new(MemoryMediaStorage::new());
        let tokens = Arc::new(JwtTokenService::new(
            TEST_JWT_SECRET,
            TimeDelta::days(1),
            clock.clone(),
        ));
        let deps = AccountCollaborators {
            hasher: Arc::new(PlainPasswordHasher),
            tokens: tokens.clone(),
            media: media.clone(),
            clock: clock.clone(),
        };
        let accounts = Arc::new(AccountService::new(store.clone(), deps));
        let catalog = Arc::new(CatalogService::new(
            store.clone(),
            media.clone(),
            clock.clone(),
        ));
        let enrollments = Arc::new(EnrollmentService::new(
            store.clone(),
            store.clone(),
            clock.clone(),
            calendar,
        ));
        let state = web::Data::new(HttpState {
            accounts: accounts.clone(),
            account_query: accounts,
            catalog: catalog.clone(),
            catalog_query: catalog,
            enrollments: enrollments.clone(),
            enrollment_query: enrollments,
            media: media.clone(),
            tokens: tokens.clone(),
        });
        Self {
            store,
            clock,
            media,
            tokens,
            state,
        }
    }

    pub fn state(&self) -> web::Data<HttpState> {
        self.state.clone()
    }

    pub fn store(&self) -> &Arc<InMemoryStore> {
        &self.store
    }

    pub fn clock(&self) -> &Arc<MutableClock> {
        &self.clock
    }

    pub fn media(&self) -> &Arc<MemoryMediaStorage> {
        &self.media
    }

    /// The API routes over this harness's state.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state())
            .configure(routes::configure)
    }

    /// Issue a token for an identity that has no stored account.
    pub fn token_for(&self, role: Role) -> (UserId, String) {
        let user_id = UserId::random();
        let claims = SessionClaims {
            user_id,
            email: EmailAddress::new(format!("{user_id}@example.com"))
                .unwrap_or_else(|error| panic!("generated email is valid: {error}")),
            role,
        };
        (user_id, self.issue(&claims))
    }

    fn issue(&self, claims: &SessionClaims) -> String {
        self.tokens
            .issue(claims)
            .unwrap_or_else(|error| panic!("harness token issues: {error}"))
            .token
    }

    /// Store an account whose password is [`SEEDED_PASSWORD`] and sign it in.
    pub async fn seed_user(&self, email: &str, role: Role) -> (User, String) {
        let account = NewAccount {
            first_name: PersonName::new("firstName", "Test")
                .unwrap_or_else(|error| panic!("seed name is valid: {error}")),
            last_name: PersonName::new("lastName", "Learner")
                .unwrap_or_else(|error| panic!("seed name is valid: {error}")),
            email: EmailAddress::new(email)
                .unwrap_or_else(|error| panic!("seed email is valid: {error}")),
            password_hash: PasswordHash::new(format!("plain:{SEEDED_PASSWORD}")),
            role,
        };
        let user = User::register(account, self.clock.utc());
        UserRepository::insert(self.store.as_ref(), &user)
            .await
            .unwrap_or_else(|error| panic!("seed user stored: {error}"));
        let token = self.issue(&SessionClaims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
        });
        (user, token)
    }

    /// Store a published course with the given enrollment counter.
    pub async fn seed_course(&self, title: &str, students_count: u32) -> Course {
        let draft = CourseDraft {
            title: title.to_owned(),
            description: format!("Learn {title} from scratch"),
            price: 49.0,
            category: CourseCategory::Development,
            level: CourseLevel::Beginner,
            duration: 6.5,
            instructor: "Grace Hopper".to_owned(),
            rating: 4.6,
            lessons_count: 12,
            tags: vec!["programming".to_owned()],
            is_published: true,
        }
        .validate()
        .unwrap_or_else(|error| panic!("seed course is valid: {error}"));
        let mut course = draft.into_course(UserId::random(), self.clock.utc());
        course.students_count = students_count;
        CourseRepository::insert(self.store.as_ref(), &course)
            .await
            .unwrap_or_else(|error| panic!("seed course stored: {error}"));
        course
    }
}
