//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::TimeDelta;
use coursehub::domain::DashboardCalendar;
use coursehub::outbound::persistence::DbPool;
use zeroize::Zeroizing;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: Zeroizing<Vec<u8>>,
    pub(crate) token_ttl: TimeDelta,
    pub(crate) upload_dir: PathBuf,
    pub(crate) calendar: DashboardCalendar,
    pub(crate) allow_role_self_assignment: bool,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration with in-memory storage and default
    /// dashboard settings.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        jwt_secret: Zeroizing<Vec<u8>>,
        token_ttl: TimeDelta,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            upload_dir,
            calendar: DashboardCalendar::default(),
            allow_role_self_assignment: false,
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// Without a pool the server keeps every record in process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[must_use]
    pub fn with_calendar(mut self, calendar: DashboardCalendar) -> Self {
        self.calendar = calendar;
        self
    }

    #[must_use]
    pub fn with_role_self_assignment(mut self, allowed: bool) -> Self {
        self.allow_role_self_assignment = allowed;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
