use std::sync::Arc;

use avatar_chatbot::{config::AppConfig, routes, state::AppState};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,avatar_chatbot=debug,tower_http=info".into()),
        )
        .init();

    let config = AppConfig::from_env()?;
    let state = Arc::new(AppState::from_config(&config).await?);

    let cors = CorsLayer::very_permissive();

    let app = routes::create_router(state, &config.audio_dir).layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;

    tracing::info!(addr = %config.bind_addr(), "chatbot listening");
    axum::serve(listener, app).await?;
    Ok(())
}
