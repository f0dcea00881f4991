//! # HTTP Server
//!
//! Main HTTP server combining all endpoint routers, plus the background
//! sweep of idle search sessions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::search::SessionCache;

use super::config::HttpServerConfig;
use super::index_routes::index_routes;
use super::list_routes::list_routes;
use super::search_routes::search_routes;
use super::service_routes::{health_routes, service_routes};
use super::state::AppState;

/// HTTP Server for the annotation search services
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, state: Arc<AppState>) -> Self {
        let router = Self::build_router(&config, state);
        Self { config, router }
    }

    /// Build the combined router with all endpoints
    fn build_router(config: &HttpServerConfig, state: Arc<AppState>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(service_routes(Arc::clone(&state)))
            .merge(search_routes(Arc::clone(&state)))
            .merge(index_routes(Arc::clone(&state)))
            .merge(list_routes(state))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Start the HTTP server (async)
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid socket address {}: {}", self.config.socket_addr(), e),
            )
        })?;

        let listener = TcpListener::bind(addr).await?;
        info!(%addr, "annostore listening");
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

/// Periodically drop idle search sessions. Must be called inside a tokio
/// runtime.
pub fn spawn_session_sweeper(cache: Arc<SessionCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let expired = cache.evict_expired();
            let stats = cache.stats();
            debug!(
                expired,
                live = cache.len(),
                hits = stats.hits,
                misses = stats.misses,
                expirations = stats.expirations,
                evictions = stats.evictions,
                "swept idle search sessions"
            );
        }
    })
}
