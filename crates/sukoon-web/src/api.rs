//! HTTP endpoint handlers.
//!
//! The page is server-rendered; the REST endpoints return JSON so the page
//! script (or curl) can submit messages and switch themes.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sukoon::guidance::{GuidanceOutcome, GuidancePipeline};

use crate::render::{render_outcome, render_page};
use crate::view::{Theme, ViewState};

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GuidancePipeline>,
    pub view: Arc<Mutex<ViewState>>,
}

impl AppState {
    fn view(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// GET /: The chat page.
pub async fn index(State(app): State<AppState>) -> Html<String> {
    let view = app.view().clone();
    Html(render_page(&view))
}

/// GET /api/state: Current view state.
pub async fn get_state(State(app): State<AppState>) -> Json<ViewState> {
    Json(app.view().clone())
}

/// Request body for POST /api/theme.
#[derive(Debug, Default, Deserialize)]
pub struct ThemeRequest {
    /// Omit to toggle.
    #[serde(default)]
    pub theme: Option<Theme>,
}

/// POST /api/theme: Set or toggle the theme. Returns the new view state.
pub async fn post_theme(
    State(app): State<AppState>,
    Json(body): Json<ThemeRequest>,
) -> Json<ViewState> {
    let mut view = app.view();
    view.apply_theme(body.theme);
    Json(view.clone())
}

/// Request body for POST /api/guidance.
#[derive(Debug, Deserialize)]
pub struct GuidanceRequestBody {
    #[serde(default)]
    pub message: String,
}

/// Response body for POST /api/guidance.
#[derive(Debug, Serialize)]
pub struct GuidanceReply {
    pub outcome: GuidanceOutcome,
    /// Rendered, escaped cards for `outcome`.
    pub html: String,
    pub answered_at: DateTime<Utc>,
}

/// POST /api/guidance: Run one submission through the pipeline.
///
/// Returns 204 for empty input (nothing to display), otherwise 200 with the
/// outcome and its rendered cards.
pub async fn post_guidance(
    State(app): State<AppState>,
    Json(body): Json<GuidanceRequestBody>,
) -> Response {
    let outcome = app.pipeline.respond(&body.message).await;
    if !outcome.is_displayable() {
        return StatusCode::NO_CONTENT.into_response();
    }

    let answered_at = Utc::now();
    app.view().record_answer(answered_at);

    Json(GuidanceReply {
        html: render_outcome(&outcome),
        outcome,
        answered_at,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn theme_request_deserializes() {
        let req: ThemeRequest = serde_json::from_str(r#"{"theme":"dark"}"#).unwrap();
        assert_eq!(req.theme, Some(Theme::Dark));
        let req: ThemeRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.theme, None);
    }

    #[test]
    fn guidance_request_defaults_to_empty_message() {
        let req: GuidanceRequestBody = serde_json::from_str("{}").unwrap();
        assert!(req.message.is_empty());
    }
}
