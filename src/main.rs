//! Content signals service: binary entrypoint.
//! Boots the Axum HTTP server with the risk scorer and recommendation routes.

use shuttle_axum::ShuttleAxum;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    // Initialize dev tracing early (no-op in production).
    content_signals::telemetry::enable_dev_tracing();

    let router = content_signals::app().await?;

    Ok(router.into())
}
