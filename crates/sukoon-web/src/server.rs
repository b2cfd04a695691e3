//! Axum server setup and router construction.

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::routing::{get, post};
use sukoon::guidance::GuidancePipeline;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::api::{self, AppState};
use crate::view::ViewState;

/// Build the full axum router.
///
/// The router serves:
/// - The chat page at `/`
/// - REST API at `/api/*`
pub fn build_router(pipeline: Arc<GuidancePipeline>, view: Arc<Mutex<ViewState>>) -> Router {
    let app_state = AppState { pipeline, view };

    // CORS layer for development (page served from another origin).
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::index))
        .route("/api/state", get(api::get_state))
        .route("/api/theme", post(api::post_theme))
        .route("/api/guidance", post(api::post_guidance))
        .with_state(app_state)
        .layer(cors)
}

/// Bind, start serving on a Tokio task, and return the bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;
    info!("listening on http://{addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("server stopped: {e}");
        }
    });

    Ok(addr)
}
