//! Storefront Admin - flash-sale clock and admin screens over a resident catalog

use anyhow::Result;
use std::sync::Arc;
use storefront_admin::app::App;
use storefront_admin::config::ServerConfig;
use storefront_admin::http;
use storefront_admin::ticker::SystemClock;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let config = ServerConfig::from_env()?;
    let app = App::bootstrap(&config, Arc::new(SystemClock))?;
    let router = http::router(app.state());

    let address = config.bind_address();
    tracing::info!("🛍️ Storefront admin listening on {}", address);
    let served = axum::serve(tokio::net::TcpListener::bind(&address).await?, router)
        .with_graceful_shutdown(async { tokio::signal::ctrl_c().await.ok(); })
        .await;

    app.shutdown();
    served?;
    Ok(())
}
