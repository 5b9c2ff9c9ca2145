//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router: every path and method goes to one proxy handler
//! - Wire up request tracing
//! - Select exactly one backend per request and delegate to it
//! - Answer 503 without forwarding when no backend is alive
//! - Serve until the shutdown broadcast, then drain

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::http::response::ProxyError;
use crate::lifecycle::shutdown::recv_shutdown;
use crate::load_balancer::Dispatcher;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

/// The load balancer's front door.
pub struct HttpServer {
    router: Router,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        let state = AppState {
            dispatcher: Arc::clone(&dispatcher),
        };

        Self {
            router: Self::build_router(state),
            dispatcher,
        }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }

    /// The router, for driving the front door without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Serve on `listener` until `shutdown` fires, then finish in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backends = self.dispatcher.len(),
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(recv_shutdown(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Selects one backend and hands it the request; no retry on failure.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let backend = match state.dispatcher.select_next() {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(
                method = %request.method(),
                path = %request.uri().path(),
                error = %e,
                "No live backend, rejecting request"
            );
            return ProxyError::from(e).into_response();
        }
    };

    tracing::info!(
        backend = %backend.address(),
        method = %request.method(),
        path = %request.uri().path(),
        "Forwarding request"
    );

    backend.handle(request).await
}
