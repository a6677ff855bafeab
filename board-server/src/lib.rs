pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod jobs;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, middleware::from_fn_with_state, routing::get, Router};
use tokio::sync::broadcast;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::{GoogleIdentityProvider, IdentityProvider, SessionStore};
use crate::config::Config;
use crate::db::Database;
use crate::jobs::PromotionJob;
use crate::services::PromotionService;

const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub sessions: SessionStore,
    pub identity: Arc<dyn IdentityProvider>,
}

impl AppState {
    pub fn new(db: Database, config: Config, identity: Arc<dyn IdentityProvider>) -> Self {
        let sessions = SessionStore::new(config.admin.session_ttl_hours);
        Self {
            db,
            config: Arc::new(config),
            sessions,
            identity,
        }
    }
}

/// Builds the full router. `/health` sits outside the password gate.
pub fn app(state: AppState) -> Router {
    let static_dir = PathBuf::from(&state.config.server.static_dir);

    let gated = Router::new()
        .nest("/api", api::routes(state.clone()))
        .merge(api::pages::routes(&static_dir))
        .fallback_service(api::pages::static_files(&static_dir))
        .layer(from_fn_with_state(state.clone(), middleware::require_password));

    Router::new()
        .route("/health", get(health_check))
        .merge(gated)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

/// Connects storage, starts the background jobs and serves until a
/// shutdown signal arrives.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let db = Database::connect(&config.database).await?;
    db.run_migrations().await?;

    if config.access.enabled() {
        tracing::info!("Board password gate enabled");
    } else {
        tracing::warn!("ACCESS__PASSWORD is empty; the board is open to everyone");
    }

    let identity: Arc<dyn IdentityProvider> = Arc::new(GoogleIdentityProvider::new(&config.oauth));
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let promotion = PromotionService::new(db.clone(), config.promotion.clone());
    let state = AppState::new(db.clone(), config, identity);

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let promotion_job = PromotionJob::new(promotion).start(shutdown_tx.subscribe());
    let sweeper = jobs::session_sweep::start(state.sessions.clone(), shutdown_tx.subscribe());

    let app = app(state);

    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped, shutting down background jobs");
    let _ = shutdown_tx.send(());
    for handle in [promotion_job, sweeper] {
        if let Err(e) = handle.await {
            tracing::error!(error = %e, "Background job panicked");
        }
    }

    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
