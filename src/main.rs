//! Shop Admin - bilingual e-commerce admin backend

use anyhow::Result;
use shop_admin::{auth::JwtKeys, config::AppConfig, http::{router, AppState}, publisher::EventPublisher, store::Stores};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let stores = Stores::connect(config.database_url.as_deref(), config.max_connections).await?;
    let publisher = EventPublisher::connect(config.nats_url.as_deref()).await;
    let state = AppState::new(stores, publisher, config.display, JwtKeys::new(&config.jwt_secret));

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(tax_rate = %config.display.tax_rate, "shop-admin listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, router(state)).await?;
    Ok(())
}
