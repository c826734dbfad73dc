use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod auth_routes;
mod behavior_routes;
mod config;
mod error;
mod extract;
mod geo_routes;
mod info_routes;
mod rating_routes;
mod refresh;
mod state;
mod tracking_routes;

use config::GatewayConfig;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "safety_gateway=debug,tower_http=info,info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env()?;
    let addr = config.listen_addr();

    let state = AppState::new(config).context("failed to build upstream HTTP clients")?;
    tracing::info!(
        "   Hotspot refresh every {}s, alert cooldown {}s",
        state.config.hotspot_refresh_secs,
        state.config.notification_cooldown_secs
    );

    let _refresh = refresh::start_background_refresh(state.clone());
    let app = app::build_router(state);

    tracing::info!("🧭 Safety Gateway starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
