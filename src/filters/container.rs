//! Description of a page container a control is bound to.
//!
//! The page layout is owned elsewhere; a control only learns which elements
//! its container holds. Operations that need a missing element do nothing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterContainer {
    /// Value of the container's `data-filter-type` attribute.
    #[serde(default)]
    pub filter_type_attr: Option<String>,
    /// Footer label. Without a footer the container cannot be cycled.
    #[serde(default)]
    pub footer: Option<String>,
    #[serde(default)]
    pub text_input: bool,
    #[serde(default)]
    pub clear_button: bool,
    /// Option ids of the container's `<select>`, if it has one.
    #[serde(default)]
    pub select_options: Option<Vec<String>>,
    #[serde(default)]
    pub button: bool,
}

impl FilterContainer {
    pub fn new(filter_type: impl Into<String>) -> Self {
        let filter_type = filter_type.into();
        Self {
            footer: Some(filter_type.clone()),
            filter_type_attr: Some(filter_type),
            ..Self::default()
        }
    }

    pub fn with_footer(mut self, label: impl Into<String>) -> Self {
        self.footer = Some(label.into());
        self
    }

    pub fn without_footer(mut self) -> Self {
        self.footer = None;
        self
    }

    pub fn with_text_input(mut self) -> Self {
        self.text_input = true;
        self.clear_button = true;
        self
    }

    pub fn with_select<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_button(mut self) -> Self {
        self.button = true;
        self
    }

    pub fn has_select(&self) -> bool {
        self.select_options.is_some()
    }

    /// Key the control registers under: the `data-filter-type` attribute,
    /// else the lower-cased footer text.
    pub fn resolve_filter_type(&self) -> Option<String> {
        if let Some(attr) = self.filter_type_attr.as_deref() {
            let attr = attr.trim();
            if !attr.is_empty() {
                return Some(attr.to_string());
            }
        }
        let footer = self.footer.as_deref()?.trim().to_lowercase();
        if footer.is_empty() {
            return None;
        }
        tracing::warn!("no data-filter-type attribute, using footer text '{footer}'");
        Some(footer)
    }
}
