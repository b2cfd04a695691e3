//! Presentation state for the chat page.
//!
//! [`ViewState`] is everything the page remembers between requests. It lives
//! behind an `Arc<Mutex<_>>` owned by the server; the guidance pipeline never
//! sees it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Sukoon AI";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewState {
    pub theme: Theme,
    pub title: String,
    /// When the last displayable outcome was produced.
    pub last_answered_at: Option<DateTime<Utc>>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            title: DEFAULT_TITLE.to_string(),
            last_answered_at: None,
        }
    }
}

impl ViewState {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the theme, or toggle it when `theme` is `None`. Returns the new theme.
    pub fn apply_theme(&mut self, theme: Option<Theme>) -> Theme {
        self.theme = theme.unwrap_or_else(|| self.theme.toggled());
        self.theme
    }

    pub fn record_answer(&mut self, at: DateTime<Utc>) {
        self.last_answered_at = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_theme() {
        let mut view = ViewState::default();
        assert_eq!(view.apply_theme(None), Theme::Dark);
        assert_eq!(view.apply_theme(None), Theme::Light);
    }

    #[test]
    fn explicit_theme_is_kept() {
        let mut view = ViewState::default();
        assert_eq!(view.apply_theme(Some(Theme::Dark)), Theme::Dark);
        assert_eq!(view.apply_theme(Some(Theme::Dark)), Theme::Dark);
    }

    #[test]
    fn serializes_lowercase_theme() {
        let json = serde_json::to_value(ViewState::default()).unwrap();
        assert_eq!(json["theme"], "light");
        assert_eq!(json["title"], DEFAULT_TITLE);
        assert!(json["last_answered_at"].is_null());
    }
}
