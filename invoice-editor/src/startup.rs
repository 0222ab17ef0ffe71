//! Application startup and lifecycle management.

use crate::config::{EditorConfig, SessionConfig};
use crate::handlers;
use crate::services::{metrics, CatalogClient, SessionStore};
use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::tracing::{request_id_middleware, REQUEST_ID_HEADER};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::MissedTickBehavior;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: EditorConfig,
    pub sessions: SessionStore,
    pub catalog: CatalogClient,
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    server: ServerFuture,
    state: AppState,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/totals", post(handlers::totals::compute_totals))
        .route("/api/tax/inclusive", post(handlers::tax::split_inclusive))
        .route("/api/gstin/:gstin", get(handlers::tax::check_gstin))
        .route("/api/sessions", post(handlers::sessions::create_session))
        .route(
            "/api/sessions/:id",
            get(handlers::sessions::get_session).delete(handlers::sessions::delete_session),
        )
        .route(
            "/api/sessions/:id/events",
            post(handlers::sessions::apply_event),
        )
        .route(
            "/api/sessions/:id/products",
            get(handlers::catalog::search_products),
        )
        .route(
            "/api/sessions/:id/parties",
            get(handlers::catalog::search_parties),
        )
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: EditorConfig) -> Result<Self, AppError> {
        let catalog = CatalogClient::new(config.catalog.clone());
        if catalog.is_configured() {
            tracing::info!(base_url = %config.catalog.base_url, "Catalog client initialized");
        } else {
            tracing::warn!("CATALOG_BASE_URL not configured - product and party search disabled");
        }

        let state = AppState {
            sessions: SessionStore::new(config.seller_state_code.clone()),
            catalog,
            config: config.clone(),
        };

        let addr: SocketAddr = config.common.address().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!(
                "Invalid listen address {}: {}",
                config.common.address(),
                e
            ))
        })?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, router(state.clone())).into_future();

        Ok(Self {
            port,
            server: Box::pin(server),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.state.sessions
    }

    /// Serve requests and sweep idle sessions until the server stops.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let sweeper = tokio::spawn(sweep_idle_sessions(
            self.state.sessions.clone(),
            self.state.config.session.clone(),
        ));

        let result = self.server.await;
        sweeper.abort();
        result
    }
}

async fn sweep_idle_sessions(sessions: SessionStore, config: SessionConfig) {
    let period = config.sweep_interval.max(Duration::from_secs(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        sessions.purge_idle(config.idle_timeout);
        metrics::set_active_sessions(sessions.len());
    }
}
