use std::env;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shift_payroll::api::{AppState, create_router};
use shift_payroll::config::ConfigLoader;

const DEFAULT_CONFIG_DIR: &str = "./config/default";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir =
        env::var("PAYROLL_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let config = ConfigLoader::load(&config_dir)?;

    // RUST_LOG wins over the configured filter.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.settings().logging.filter))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let bind_address = config.settings().server.bind_address.clone();
    info!(
        config_dir = %config_dir,
        week_starts_on = ?config.payroll().week_starts_on,
        "configuration loaded"
    );

    let app = create_router(AppState::new(config));
    let listener = TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "shift payroll service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
