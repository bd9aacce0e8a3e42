//! SnapBeam backend entry-point: reads configuration, opens the stores and
//! serves the REST API.

mod server;

use actix_web::web;
use color_eyre::eyre::{Result, WrapErr};
use mockable::DefaultEnv;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use snapbeam::inbound::http::health::HealthState;

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

    let config = ServerConfig::from_env(&DefaultEnv::new()).wrap_err("invalid configuration")?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config).await?;

    let result = server.await;
    health_state.mark_unhealthy();
    result.wrap_err("server terminated abnormally")
}
