//! Deck generation service binary.
//!
//! # Environment Variables
//! - `DECK_ADDR`: listen address (default: "0.0.0.0:8080")
//! - `DECK_TEMPLATE`: template document path (default: "template.pptx")

use deck_server::{router, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("deck_server=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        "-- Starting deck generator on {} (template: {})",
        config.bind_addr,
        config.template_path.display()
    );

    // The template is opened per request, so a missing file is not fatal
    // here; flag it early anyway.
    if !config.template_path.exists() {
        tracing::warn!(
            "template {} not found; generation requests will fail until it exists",
            config.template_path.display()
        );
    }

    let app = router(AppState::new(config.template_path));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
