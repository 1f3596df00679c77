use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::types::AppState;

/// Build the router for the given state.
pub fn app(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/data/:dataset", get(protected::data::dataset_get))
        .route("/api/find/:dataset", post(protected::find::find_post))
        .route("/api/preview/:dataset", post(protected::preview::preview_post))
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(protected_routes)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    if config.security.jwt_secret.is_empty() {
        if crate::is_production!() {
            anyhow::bail!("JWT_SECRET must be set in production");
        }
        warn!("JWT_SECRET is not set; every protected request will be rejected");
    }

    let state = AppState::from_config(config);
    let mut app = app(state);

    if config.security.enable_cors {
        app = app.layer(CorsLayer::permissive());
    }
    if config.api.enable_request_logging {
        app = app.layer(TraceLayer::new_for_http());
    }

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Cohort Access API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
