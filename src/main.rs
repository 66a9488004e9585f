use std::sync::Arc;

use atrium_api::engine::Engine;
use atrium_api::routes;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up APP_ENV, ATRIUM_PORT, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = atrium_api::config::config();
    tracing::info!("Starting Atrium API in {:?} mode", config.environment);

    let engine = Arc::new(Engine::new());
    let app = routes::app(engine);

    // Allow tests or deployments to override port via env
    let port = std::env::var("ATRIUM_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Atrium API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
