//! # HTTP Server
//!
//! Binds the import and health routers behind request tracing and a body
//! size limit.

use std::io;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{error, info, Level};
use uuid::Uuid;

use crate::observability::Event;
use crate::service::ImportService;

use super::config::HttpServerConfig;
use super::routes::{health_routes, import_routes};

/// HTTP server for the citizens service
pub struct HttpServer {
    config: HttpServerConfig,
    service: Arc<ImportService>,
    debug: bool,
}

impl HttpServer {
    /// Create a new HTTP server with custom configuration
    pub fn with_config(config: HttpServerConfig, service: Arc<ImportService>) -> Self {
        Self {
            config,
            service,
            debug: false,
        }
    }

    /// Log request and response lines at debug instead of trace.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Build the combined router
    pub fn router(&self) -> Router {
        let level = if self.debug { Level::DEBUG } else { Level::TRACE };
        let trace = TraceLayer::new_for_http()
            .make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    request_id = %Uuid::new_v4(),
                    method = %request.method(),
                    uri = %request.uri(),
                )
            })
            .on_request(DefaultOnRequest::new().level(level))
            .on_response(DefaultOnResponse::new().level(level));

        Router::new()
            .merge(health_routes())
            .merge(import_routes(Arc::clone(&self.service)))
            .layer(DefaultBodyLimit::max(self.config.body_limit))
            .layer(trace)
    }

    /// Serve until Ctrl-C.
    pub async fn start(self) -> io::Result<()> {
        let addr = self.socket_addr();
        let listener = TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!(event = %Event::Serving, addr = %local_addr, "citizens service listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!(event = %Event::ShutdownComplete, "shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ImportConfig;
    use crate::storage::MemoryStore;

    #[test]
    fn test_socket_addr() {
        let service = Arc::new(ImportService::new(
            Arc::new(MemoryStore::new()),
            ImportConfig::default(),
        ));
        let server = HttpServer::with_config(HttpServerConfig::with_port(9100), service);
        assert_eq!(server.socket_addr(), "0.0.0.0:9100");
    }
}
