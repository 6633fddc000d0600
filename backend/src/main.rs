//! Backend entry-point: loads settings, prepares storage and runs the HTTP server.

mod server;

use std::ffi::OsString;

use actix_web::web;
use color_eyre::eyre::{Context, Result, eyre};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use coursehub::inbound::http::error::expose_internal_errors;
use coursehub::inbound::http::health::HealthState;
use coursehub::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use ortho_config::OrthoConfig;
use server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os().collect::<Vec<OsString>>())
        .map_err(|err| eyre!("failed to load configuration: {err}"))?;
    let environment = settings.environment()?;
    expose_internal_errors(environment.is_development());

    let config = ServerConfig::new(
        settings.bind_addr()?,
        settings.jwt_secret()?,
        settings.token_ttl()?,
        settings.upload_dir(),
    )
    .with_calendar(settings.dashboard_calendar()?)
    .with_role_self_assignment(settings.allow_role_self_assignment);

    let config = match settings.database_url.as_deref() {
        Some(url) => {
            run_migrations(url)
                .await
                .map_err(|err| eyre!(err.into_message()))
                .wrap_err("database migrations failed")?;
            let mut pool_config = PoolConfig::new(url);
            if let Some(max_size) = settings.db_pool_max_size {
                pool_config = pool_config.with_max_size(max_size);
            }
            let pool = DbPool::new(pool_config)
                .await
                .map_err(|err| eyre!(err.into_message()))
                .wrap_err("failed to build database pool")?;
            config.with_db_pool(pool)
        }
        None => config,
    };

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::build_prometheus());

    info!(
        bind_addr = %config.bind_addr(),
        ?environment,
        "starting coursehub"
    );
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start HTTP server")?;
    server.await.wrap_err("HTTP server terminated abnormally")
}
