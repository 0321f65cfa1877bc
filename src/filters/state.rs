use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::FilterError;

/// Lifecycle of a filter control.
///
/// `Active` contributes its value, `Inactive` holds nothing, `Disabled`
/// keeps its stored value but contributes the control's default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterState {
    Active,
    #[default]
    Inactive,
    Disabled,
}

impl FilterState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Disabled => "disabled",
        }
    }

    /// CSS class applied to the control's container.
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Active => "filter-active",
            Self::Inactive => "filter-inactive",
            Self::Disabled => "filter-disabled",
        }
    }

    /// Footer-click transition. Cycling toggles between on and suspended;
    /// `Inactive` is never reached from here.
    pub const fn cycled(self) -> Self {
        match self {
            Self::Active => Self::Disabled,
            Self::Disabled => Self::Active,
            Self::Inactive => Self::Active,
        }
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterState {
    type Err = FilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "disabled" => Ok(Self::Disabled),
            _ => Err(FilterError::UnknownState(value.to_string())),
        }
    }
}
