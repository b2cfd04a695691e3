//! Browser chat page for the sukoon guidance pipeline.
//!
//! `sukoon-web` serves a single server-rendered page and a small REST API.
//! Each submission runs through a shared
//! [`GuidancePipeline`](sukoon::guidance::GuidancePipeline); the page's theme
//! and title live in a separate [`ViewState`] that only this crate touches.
//!
//! # Quick start
//!
//! ```ignore
//! use std::sync::{Arc, Mutex};
//! use sukoon::guidance::{GuidanceConfig, GuidancePipeline};
//! use sukoon_web::{ViewState, WebConfig, spawn_web};
//!
//! let pipeline = Arc::new(GuidancePipeline::from_config(GuidanceConfig::from_file("sukoon.json")?)?);
//! let view = Arc::new(Mutex::new(ViewState::default()));
//!
//! let addr = spawn_web(pipeline, view, WebConfig::default()).await?;
//! println!("Web UI: http://{addr}");
//! ```
//!
//! # Routes
//!
//! ```text
//! GET  /               chat page rendered from ViewState
//! GET  /api/state      ViewState as JSON
//! POST /api/theme      {"theme"?: "light"|"dark"}  set, or toggle when omitted
//! POST /api/guidance   {"message": "..."}  204 when empty, else {outcome, html, answered_at}
//! ```

mod api;
pub mod render;
mod server;
pub mod view;

pub use api::{GuidanceReply, ThemeRequest};
pub use view::{Theme, ViewState};

use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use sukoon::guidance::GuidancePipeline;

/// Configuration for the web server.
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_web(
    pipeline: Arc<GuidancePipeline>,
    view: Arc<Mutex<ViewState>>,
    config: WebConfig,
) -> io::Result<SocketAddr> {
    let router = server::build_router(pipeline, view);
    server::start_server(router, config.bind_addr).await
}
