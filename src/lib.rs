// src/lib.rs
use anyhow::Result;
use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use handlers::*;

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod app_state;
mod config;
mod handlers;
mod infrastructure;
mod sweeper;

// Hoist up only the public symbol(s)
pub use app_state::AppState;
pub use sweeper::spawn_session_sweeper;

pub use config::*;

// Publicly expose the infrastructure creation functions
pub use infrastructure::{
    create_argon2_hasher, // ---
    create_memory_repository,
    create_noop_metrics,
    create_prom_metrics,
};

/// Build application state from configuration with a fresh in-memory store.
pub fn create_state(config: &AppConfig) -> Result<AppState> {
    // ---
    let metrics = if config.server.metrics_type == "prom" {
        create_prom_metrics()?
    } else {
        create_noop_metrics()?
    };

    let policy = domain::TokenPolicy {
        token_ttl: chrono::Duration::from_std(config.token.ttl)?,
        rotation_interval: chrono::Duration::from_std(config.token.rotation_interval)?,
    };

    Ok(AppState::new(
        create_memory_repository(),
        create_argon2_hasher(),
        metrics,
        policy,
    ))
}

/// Build the HTTP router with configuration taken from environment variables.
pub fn create_router() -> Result<Router> {
    // ---
    let config = AppConfig::from_env()?;

    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    let app_state = create_state(&config)?;

    Ok(build_router(app_state, &config.server))
}

/// Wire every endpoint onto `app_state`.
pub fn build_router(app_state: AppState, server: &ServerConfig) -> Router {
    // ---
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/create-session", post(create_session))
        .route("/get-new-token", post(get_new_token))
        .route("/close-session", post(close_session))
        .route("/get-attendance", post(get_attendance))
        .route("/mark-attendance", post(mark_attendance))
        .route("/scan", post(scan))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            track_requests,
        ))
        .layer(build_cors(&server.allowed_origins))
        .with_state(app_state)
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    // ---
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse::<HeaderValue>()
                .map_err(|e| {
                    tracing::warn!("Failed to parse origin '{}': {}", origin, e);
                })
                .ok()
        })
        .collect();

    layer.allow_origin(origins)
}
