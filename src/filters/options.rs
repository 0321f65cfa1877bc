//! Presentation settings for filter controls.
//!
//! Both structs are immutable once built; overrides go through the `with_*`
//! constructors, which return a new value.

use serde::{Deserialize, Serialize};

use super::state::FilterState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextColors {
    pub active: String,
    pub inactive: String,
    pub disabled: String,
}

impl Default for TextColors {
    fn default() -> Self {
        Self {
            active: "#ffffff".to_string(),
            inactive: "#495057".to_string(),
            disabled: "#6c757d".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlOptions {
    pub active_color: String,
    pub inactive_color: String,
    pub disabled_color: String,
    pub border_width: String,
    pub text_colors: TextColors,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            active_color: "#ff8c00".to_string(),
            inactive_color: "transparent".to_string(),
            disabled_color: "#dee2e6".to_string(),
            border_width: "2px".to_string(),
            text_colors: TextColors::default(),
        }
    }
}

/// Resolved colors for one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateColors {
    pub border: String,
    pub background: String,
    pub text: String,
    pub footer: String,
}

impl ControlOptions {
    pub fn with_active_color(self, color: impl Into<String>) -> Self {
        Self {
            active_color: color.into(),
            ..self
        }
    }

    pub fn with_inactive_color(self, color: impl Into<String>) -> Self {
        Self {
            inactive_color: color.into(),
            ..self
        }
    }

    pub fn with_disabled_color(self, color: impl Into<String>) -> Self {
        Self {
            disabled_color: color.into(),
            ..self
        }
    }

    pub fn with_text_colors(self, text_colors: TextColors) -> Self {
        Self {
            text_colors,
            ..self
        }
    }

    pub fn colors_for(&self, state: FilterState) -> StateColors {
        match state {
            FilterState::Active => StateColors {
                border: self.active_color.clone(),
                background: self.active_color.clone(),
                text: self.text_colors.active.clone(),
                footer: self.active_color.clone(),
            },
            FilterState::Inactive => StateColors {
                border: self.inactive_color.clone(),
                background: "transparent".to_string(),
                text: self.text_colors.inactive.clone(),
                footer: self.inactive_color.clone(),
            },
            FilterState::Disabled => StateColors {
                border: self.disabled_color.clone(),
                background: "transparent".to_string(),
                text: self.text_colors.disabled.clone(),
                footer: self.disabled_color.clone(),
            },
        }
    }
}

/// Icon names shown by an icon filter in each state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconConfig {
    pub inactive_icon: String,
    pub active_icon: String,
    pub disabled_icon: String,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self::uniform_pair("flag-outline", "flag")
    }
}

impl IconConfig {
    fn uniform_pair(off: &str, on: &str) -> Self {
        Self {
            inactive_icon: off.to_string(),
            active_icon: on.to_string(),
            disabled_icon: off.to_string(),
        }
    }

    /// Built-in icon set for well-known toolbar filters. Unknown types get
    /// the flag icons.
    pub fn for_filter_type(filter_type: &str) -> Self {
        match filter_type {
            "flag" | "flagged" => Self::default(),
            "refresh" => Self::uniform_pair("refresh-outline", "refresh-outline"),
            "create" => Self::uniform_pair("create-outline", "create-outline"),
            "clear" => Self::uniform_pair("close", "close"),
            other => {
                tracing::warn!("no icon config for filter type '{other}', using flag icons");
                Self::default()
            }
        }
    }

    pub fn with_active_icon(self, icon: impl Into<String>) -> Self {
        Self {
            active_icon: icon.into(),
            ..self
        }
    }

    pub fn icon_for(&self, state: FilterState) -> &str {
        match state {
            FilterState::Active => &self.active_icon,
            FilterState::Inactive => &self.inactive_icon,
            FilterState::Disabled => &self.disabled_icon,
        }
    }
}
