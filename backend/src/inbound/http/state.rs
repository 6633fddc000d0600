//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountCommand, AccountQuery, CatalogCommand, CatalogQuery, EnrollmentCommand,
    EnrollmentQuery, MediaStorage, TokenService,
};

/// Dependency bundle for HTTP handlers.
///
/// # Examples
/// ```no_run
/// use std::sync::Arc;
///
/// use coursehub::domain::{AccountCollaborators, AccountService, CatalogService, EnrollmentService};
/// use coursehub::inbound::http::state::HttpState;
/// use coursehub::outbound::memory::InMemoryStore;
/// # fn collaborators() -> AccountCollaborators { unimplemented!() }
///
/// let store = Arc::new(InMemoryStore::new());
/// let deps = collaborators();
/// let accounts = Arc::new(AccountService::new(store.clone(), deps.clone()));
/// let catalog = Arc::new(CatalogService::new(store.clone(), deps.media.clone(), deps.clock.clone()));
/// let enrollments = Arc::new(EnrollmentService::new(
///     store.clone(),
///     store,
///     deps.clock.clone(),
///     Default::default(),
/// ));
/// let state = HttpState {
///     accounts: accounts.clone(),
///     account_query: accounts,
///     catalog: catalog.clone(),
///     catalog_query: catalog,
///     enrollments: enrollments.clone(),
///     enrollment_query: enrollments,
///     media: deps.media,
///     tokens: deps.tokens,
/// };
/// let _tokens = state.tokens.clone();
/// ```
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountCommand>,
    pub account_query: Arc<dyn AccountQuery>,
    pub catalog: Arc<dyn CatalogCommand>,
    pub catalog_query: Arc<dyn CatalogQuery>,
    pub enrollments: Arc<dyn EnrollmentCommand>,
    pub enrollment_query: Arc<dyn EnrollmentQuery>,
    /// Serves stored uploads back to clients.
    pub media: Arc<dyn MediaStorage>,
    /// Verifies bearer tokens during request extraction.
    pub tokens: Arc<dyn TokenService>,
}
