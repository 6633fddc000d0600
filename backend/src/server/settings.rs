//! Process configuration loaded via OrthoConfig.
//!
//! Values merge from CLI flags, `COURSEHUB_*` environment variables and
//! config files. Accessors resolve defaults and validate ranges so the rest
//! of startup works with checked values only.

use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{FixedOffset, TimeDelta};
use ortho_config::OrthoConfig;
use rand::RngCore;
use rand::rngs::OsRng;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;
use zeroize::Zeroizing;

use coursehub::domain::DashboardCalendar;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 24 * 60;
const DEFAULT_MONTHLY_GOAL: u32 = 3;
const EPHEMERAL_SECRET_LEN: usize = 64;

/// Deployment mode; controls how much internal detail errors reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }

    fn build_default() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

impl FromStr for Environment {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            _ => Err(SettingsError::UnknownEnvironment(raw.to_owned())),
        }
    }
}

/// Invalid or missing configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("invalid bind address `{0}`")]
    BindAddr(String),
    #[error("unknown environment `{0}`; expected development or production")]
    UnknownEnvironment(String),
    #[error("COURSEHUB_JWT_SECRET must be set in release builds")]
    MissingJwtSecret,
    #[error("token lifetime must be positive, got {0} minutes")]
    TokenTtl(i64),
    #[error("dashboard UTC offset of {0} minutes is out of range")]
    UtcOffset(i32),
    #[error("monthly goal target must be at least 1")]
    MonthlyGoal,
}

/// Settings for the HTTP server process.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "COURSEHUB")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection string; in-memory adapters are used when unset.
    pub database_url: Option<String>,
    /// HS256 signing secret for session tokens.
    pub jwt_secret: Option<String>,
    pub token_ttl_minutes: Option<i64>,
    /// `development` or `production`.
    pub environment: Option<String>,
    /// Directory holding uploaded media.
    pub upload_dir: Option<PathBuf>,
    pub dashboard_utc_offset_minutes: Option<i32>,
    pub monthly_goal_target: Option<u32>,
    pub db_pool_max_size: Option<u32>,
    /// Honour the `role` field sent at registration.
    #[ortho_config(default = false)]
    pub allow_role_self_assignment: bool,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|_| SettingsError::BindAddr(raw.to_owned()))
    }

    pub fn environment(&self) -> Result<Environment, SettingsError> {
        self.environment
            .as_deref()
            .map_or(Ok(Environment::build_default()), str::parse)
    }

    /// Signing secret bytes.
    ///
    /// Debug builds without a configured secret get a random one, which
    /// invalidates every token on restart.
    pub fn jwt_secret(&self) -> Result<Zeroizing<Vec<u8>>, SettingsError> {
        match self.jwt_secret.as_deref() {
            Some(secret) if !secret.is_empty() => Ok(Zeroizing::new(secret.as_bytes().to_vec())),
            _ if cfg!(debug_assertions) => {
                warn!("COURSEHUB_JWT_SECRET unset; using an ephemeral signing secret (dev only)");
                let mut secret = Zeroizing::new(vec![0_u8; EPHEMERAL_SECRET_LEN]);
                OsRng.fill_bytes(&mut secret);
                Ok(secret)
            }
            _ => Err(SettingsError::MissingJwtSecret),
        }
    }

    pub fn token_ttl(&self) -> Result<TimeDelta, SettingsError> {
        let minutes = self.token_ttl_minutes.unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);
        if minutes <= 0 {
            return Err(SettingsError::TokenTtl(minutes));
        }
        TimeDelta::try_minutes(minutes).ok_or(SettingsError::TokenTtl(minutes))
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR))
    }

    /// Month window and goal used by the learner dashboard.
    pub fn dashboard_calendar(&self) -> Result<DashboardCalendar, SettingsError> {
        let minutes = self.dashboard_utc_offset_minutes.unwrap_or(0);
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(SettingsError::UtcOffset(minutes))?;
        let monthly_target =
            NonZeroU32::new(self.monthly_goal_target.unwrap_or(DEFAULT_MONTHLY_GOAL))
                .ok_or(SettingsError::MonthlyGoal)?;
        Ok(DashboardCalendar {
            offset,
            monthly_target,
        })
    }
}
