//! Filter controls and their shared state machine.
//!
//! A [`FilterControl`] owns one predicate field. Its variant ([`FilterKind`])
//! decides how the raw value is read and how user events change state; the
//! state machine, visual bookkeeping and aggregator push are common.

use std::sync::Arc;

use serde::Serialize;

use crate::bus::{BusEvent, ControlId, EventBus, EventKind};

use super::aggregator::{FilterAggregator, FilterValue};
use super::container::FilterContainer;
use super::error::FilterError;
use super::options::{ControlOptions, IconConfig, StateColors};
use super::session::FilterSession;
use super::state::FilterState;

/// Filter type of the control that clears every filter.
pub const CLEAR_ALL_FILTER_TYPE: &str = "all";
const CLEAR_PREFIX: &str = "clear-";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ClearTarget {
    /// Clear the control registered under this filter type.
    Filter(String),
    All,
}

impl ClearTarget {
    /// Parse a clear control's filter type: `all` or `clear-<filter>`.
    pub fn from_filter_type(filter_type: &str) -> Option<Self> {
        if filter_type == CLEAR_ALL_FILTER_TYPE {
            return Some(Self::All);
        }
        filter_type
            .strip_prefix(CLEAR_PREFIX)
            .filter(|target| !target.is_empty())
            .map(|target| Self::Filter(target.to_string()))
    }

    /// Registry key for the clear control itself.
    pub fn filter_type(&self) -> String {
        match self {
            Self::All => CLEAR_ALL_FILTER_TYPE.to_string(),
            Self::Filter(target) => format!("{CLEAR_PREFIX}{target}"),
        }
    }
}

/// Side effect requested by a control that the session must carry out once
/// the control's lock has been released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlEffect {
    Clear(ClearTarget),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    /// `None` when the container has no input element.
    pub text: Option<String>,
    pub clear_button: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectInput {
    /// `None` when the container has no select element.
    pub selected: Option<String>,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconToggle {
    pub config: IconConfig,
    pub button: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearAction {
    pub target: ClearTarget,
    pub button: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterKind {
    /// Free text; state follows content.
    Text(TextInput),
    /// Single choice; state follows selection.
    Select(SelectInput),
    /// Boolean toggle.
    Icon(IconToggle),
    /// Momentary action; never stays active.
    Clear(ClearAction),
}

impl FilterKind {
    pub fn text(container: &FilterContainer) -> Self {
        Self::Text(TextInput {
            text: container.text_input.then(String::new),
            clear_button: container.clear_button,
        })
    }

    pub fn select(container: &FilterContainer) -> Self {
        Self::Select(SelectInput {
            selected: container.select_options.as_ref().map(|_| String::new()),
            options: container.select_options.clone().unwrap_or_default(),
        })
    }

    pub fn icon(container: &FilterContainer, config: IconConfig) -> Self {
        Self::Icon(IconToggle {
            config,
            button: container.button,
        })
    }

    pub fn clear(container: &FilterContainer, target: ClearTarget) -> Self {
        Self::Clear(ClearAction {
            target,
            button: container.button,
        })
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Select(_) => "select",
            Self::Icon(_) => "icon",
            Self::Clear(_) => "clear",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct VisualState {
    class: &'static str,
    revision: u64,
}

pub struct FilterControl {
    id: ControlId,
    filter_type: String,
    state: FilterState,
    kind: FilterKind,
    options: ControlOptions,
    has_footer: bool,
    visual: VisualState,
    aggregator: Arc<FilterAggregator>,
    bus: Arc<EventBus>,
}

impl FilterControl {
    pub fn new(
        filter_type: impl Into<String>,
        kind: FilterKind,
        container: &FilterContainer,
        options: ControlOptions,
        session: &FilterSession,
    ) -> Self {
        let mut control = Self {
            id: ControlId::next(),
            filter_type: filter_type.into(),
            state: FilterState::Inactive,
            kind,
            options,
            has_footer: container.footer.is_some(),
            visual: VisualState {
                class: FilterState::Inactive.css_class(),
                revision: 0,
            },
            aggregator: session.aggregator().clone(),
            bus: session.bus().clone(),
        };
        control.update_visual_state();
        control
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn filter_type(&self) -> &str {
        &self.filter_type
    }

    pub(crate) fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn kind(&self) -> &FilterKind {
        &self.kind
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn is_applying(&self) -> bool {
        self.state == FilterState::Active
    }

    pub fn is_disabled(&self) -> bool {
        self.state == FilterState::Disabled
    }

    // -----------------------------------------------------------------------
    // State machine
    // -----------------------------------------------------------------------

    /// Move to `new_state`, re-render and push to the aggregator. Setting the
    /// current state again does nothing.
    pub fn set_state(&mut self, new_state: FilterState) -> bool {
        if self.state == new_state {
            return false;
        }
        tracing::debug!(
            "{} ({}) {} -> {new_state}",
            self.filter_type,
            self.id,
            self.state
        );
        self.state = new_state;
        self.update_visual_state();
        self.update_filter_manager();
        true
    }

    /// String form of [`set_state`](Self::set_state). Unknown names are
    /// logged and rejected.
    pub fn set_state_named(&mut self, name: &str) -> bool {
        match name.parse::<FilterState>() {
            Ok(state) => self.set_state(state),
            Err(e) => {
                tracing::warn!("{}: {e}", self.filter_type);
                false
            }
        }
    }

    pub fn activate(&mut self) -> bool {
        self.set_state(FilterState::Active)
    }

    pub fn deactivate(&mut self) -> bool {
        self.set_state(FilterState::Inactive)
    }

    pub fn disable(&mut self) -> bool {
        self.set_state(FilterState::Disabled)
    }

    /// Re-enabling always lands on `Inactive`, not the state before disable.
    pub fn enable(&mut self) -> bool {
        self.set_state(FilterState::Inactive)
    }

    /// Flip between active and inactive. A disabled control stays disabled.
    pub fn toggle(&mut self) -> bool {
        match self.state {
            FilterState::Active => self.deactivate(),
            FilterState::Inactive => self.activate(),
            FilterState::Disabled => false,
        }
    }

    pub fn cycle_state(&mut self) -> bool {
        let next = self.state.cycled();
        self.set_state(next)
    }

    // -----------------------------------------------------------------------
    // Values
    // -----------------------------------------------------------------------

    /// Raw value regardless of state.
    pub fn value(&self) -> FilterValue {
        match &self.kind {
            FilterKind::Text(input) => {
                FilterValue::Text(input.text.as_deref().unwrap_or("").trim().to_string())
            }
            FilterKind::Select(select) => {
                FilterValue::Text(select.selected.clone().unwrap_or_default())
            }
            FilterKind::Icon(_) | FilterKind::Clear(_) => {
                FilterValue::Flag(self.state == FilterState::Active)
            }
        }
    }

    /// `None` exactly when the control is disabled.
    pub fn effective_value(&self) -> Option<FilterValue> {
        if self.state == FilterState::Disabled {
            return None;
        }
        Some(self.value())
    }

    /// What the aggregator receives while this control is disabled.
    pub fn default_value(&self) -> FilterValue {
        match &self.kind {
            FilterKind::Icon(_) | FilterKind::Clear(_) => FilterValue::Flag(false),
            FilterKind::Text(_) | FilterKind::Select(_) => FilterValue::Text(String::new()),
        }
    }

    /// Push the effective value (or the default when disabled).
    pub fn update_filter_manager(&self) {
        if matches!(self.kind, FilterKind::Clear(_)) {
            return;
        }
        let value = self
            .effective_value()
            .unwrap_or_else(|| self.default_value());
        self.aggregator.update_filter(&self.filter_type, value);
    }

    // -----------------------------------------------------------------------
    // Presentation
    // -----------------------------------------------------------------------

    fn update_visual_state(&mut self) {
        if !self.has_footer {
            return;
        }
        self.visual.class = self.state.css_class();
        self.visual.revision += 1;
    }

    /// CSS state class currently rendered on the container.
    pub fn css_class(&self) -> &'static str {
        self.visual.class
    }

    /// Number of re-renders so far.
    pub fn visual_revision(&self) -> u64 {
        self.visual.revision
    }

    pub fn state_colors(&self) -> StateColors {
        self.options.colors_for(self.state)
    }

    pub fn icon(&self) -> Option<&str> {
        match &self.kind {
            FilterKind::Icon(icon) => Some(icon.config.icon_for(self.state)),
            _ => None,
        }
    }

    pub fn clear_button_visible(&self) -> bool {
        match &self.kind {
            FilterKind::Text(input) => input.clear_button && self.has_content(),
            _ => false,
        }
    }

    // -----------------------------------------------------------------------
    // Text input
    // -----------------------------------------------------------------------

    fn has_content(&self) -> bool {
        match &self.kind {
            FilterKind::Text(input) => input
                .text
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty()),
            _ => false,
        }
    }

    /// Content-driven transition. A disabled control keeps its state.
    fn update_input_state(&mut self) {
        if !matches!(&self.kind, FilterKind::Text(input) if input.text.is_some()) {
            return;
        }
        if self.state == FilterState::Disabled {
            return;
        }
        let has_content = self.has_content();
        if has_content && self.state == FilterState::Inactive {
            self.set_state(FilterState::Active);
        } else if !has_content && self.state == FilterState::Active {
            self.set_state(FilterState::Inactive);
        }
    }

    /// Replace the field's text without re-evaluating state.
    fn write_text(&mut self, value: &str) -> bool {
        match &mut self.kind {
            FilterKind::Text(TextInput {
                text: Some(text), ..
            }) => {
                *text = value.to_string();
                true
            }
            _ => false,
        }
    }

    pub fn set_text(&mut self, value: &str) {
        if !self.write_text(value) {
            tracing::debug!("{}: no text input, ignoring set_text", self.filter_type);
            return;
        }
        self.update_input_state();
        self.update_filter_manager();
    }

    /// Empty the field, force `Inactive` and push.
    pub fn clear_input(&mut self) {
        if !self.write_text("") {
            return;
        }
        if !self.set_state(FilterState::Inactive) {
            self.update_filter_manager();
        }
        tracing::debug!("{} filter cleared", self.filter_type);
    }

    // -----------------------------------------------------------------------
    // Select
    // -----------------------------------------------------------------------

    /// Mirror the selection into the state unless disabled.
    fn update_select_state(&mut self) {
        let has_value = match &self.kind {
            FilterKind::Select(SelectInput {
                selected: Some(selected),
                ..
            }) => !selected.is_empty(),
            _ => return,
        };
        if self.state == FilterState::Disabled {
            return;
        }
        if has_value {
            self.set_state(FilterState::Active);
        } else {
            self.set_state(FilterState::Inactive);
        }
    }

    pub fn select_value(&mut self, value: &str) {
        let filter_type = self.filter_type.clone();
        let FilterKind::Select(SelectInput {
            selected: Some(selected),
            options,
        }) = &mut self.kind
        else {
            tracing::debug!("{filter_type}: no select element, ignoring value");
            return;
        };
        if !value.is_empty() && !options.is_empty() && !options.iter().any(|o| o == value) {
            let err = FilterError::UnknownOption {
                key: filter_type,
                value: value.to_string(),
            };
            tracing::warn!("ignoring selection: {err}");
            return;
        }
        *selected = value.to_string();
        self.update_select_state();
        self.update_filter_manager();
    }

    /// Replace the option list (from the configuration feed). A current
    /// selection that is no longer offered is cleared.
    pub fn set_options(&mut self, new_options: Vec<String>) {
        let FilterKind::Select(SelectInput { selected, options }) = &mut self.kind else {
            return;
        };
        *options = new_options;
        let stale = selected
            .as_deref()
            .is_some_and(|s| !s.is_empty() && !options.iter().any(|o| o == s));
        if stale {
            self.clear_filter();
        }
    }

    pub fn options(&self) -> &[String] {
        match &self.kind {
            FilterKind::Select(select) => &select.options,
            _ => &[],
        }
    }

    /// Reset the selection, force `Inactive` and push.
    pub fn clear_filter(&mut self) {
        let FilterKind::Select(SelectInput {
            selected: Some(selected),
            ..
        }) = &mut self.kind
        else {
            return;
        };
        selected.clear();
        if !self.set_state(FilterState::Inactive) {
            self.update_filter_manager();
        }
        tracing::debug!("{} filter cleared", self.filter_type);
    }

    // -----------------------------------------------------------------------
    // Variant-independent entry points
    // -----------------------------------------------------------------------

    /// Set the control's value from a string: text content, selection, or
    /// for icon filters `"true"`/`"false"`.
    pub fn set_value(&mut self, value: &str) {
        match &self.kind {
            FilterKind::Text(_) => self.set_text(value),
            FilterKind::Select(_) => self.select_value(value),
            FilterKind::Icon(_) => match value.trim() {
                "true" => {
                    self.activate();
                }
                "false" => {
                    self.deactivate();
                }
                other => tracing::warn!("{}: '{other}' is not a boolean", self.filter_type),
            },
            FilterKind::Clear(_) => {
                tracing::debug!("{}: clear controls hold no value", self.filter_type)
            }
        }
    }

    /// Return to the neutral state with no value.
    pub fn clear(&mut self) {
        match &self.kind {
            FilterKind::Text(_) => self.clear_input(),
            FilterKind::Select(_) => self.clear_filter(),
            FilterKind::Icon(_) | FilterKind::Clear(_) => {
                if !self.deactivate() {
                    self.update_filter_manager();
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Handle a bus event. Every control sees every event; only the
    /// originator acts on it.
    pub fn apply_event(&mut self, event: &BusEvent) -> Option<ControlEffect> {
        if !event.is_from(self.id) {
            self.on_sibling_event(event);
            return None;
        }

        match (event.kind, &self.kind) {
            (EventKind::ButtonClick, FilterKind::Clear(_)) => self.trigger_clear(),
            (EventKind::StateCycleRequest, FilterKind::Clear(_)) => {
                tracing::debug!("{}: clear controls only react to their button", self.filter_type);
                None
            }
            (EventKind::StateCycleRequest, _) => {
                if !self.has_footer {
                    tracing::debug!("{}: no footer, ignoring cycle request", self.filter_type);
                    return None;
                }
                self.cycle_state();
                None
            }
            (EventKind::InputChange, FilterKind::Text(_)) => {
                if let Some(value) = payload_str(event, "value") {
                    self.write_text(value);
                }
                self.update_input_state();
                self.update_filter_manager();
                None
            }
            (EventKind::KeyUp, FilterKind::Text(_)) => {
                if let Some(value) = payload_str(event, "value") {
                    self.write_text(value);
                }
                self.update_input_state();
                None
            }
            (EventKind::SelectChange, FilterKind::Select(_)) => {
                let value = payload_str(event, "selected_value").unwrap_or("").to_string();
                self.select_value(&value);
                None
            }
            (EventKind::ButtonClick, FilterKind::Icon(icon)) => {
                if icon.button {
                    self.toggle();
                }
                None
            }
            (kind, variant) => {
                tracing::debug!(
                    "{}: {} control ignores {kind}",
                    self.filter_type,
                    variant.name()
                );
                None
            }
        }
    }

    /// Reserved for coordination between sibling controls.
    fn on_sibling_event(&self, event: &BusEvent) {
        tracing::trace!(
            "{} observed {} from {}",
            self.filter_type,
            event.kind,
            event.source_id
        );
    }

    fn trigger_clear(&mut self) -> Option<ControlEffect> {
        let FilterKind::Clear(action) = &self.kind else {
            return None;
        };
        if !action.button {
            tracing::debug!("{}: no clear button, ignoring click", self.filter_type);
            return None;
        }
        if self.state == FilterState::Disabled {
            tracing::debug!("{}: clear control disabled", self.filter_type);
            return None;
        }
        let target = action.target.clone();
        self.activate();
        Some(ControlEffect::Clear(target))
    }
}

fn payload_str<'a>(event: &'a BusEvent, field: &str) -> Option<&'a str> {
    event.payload.get(field).and_then(|value| value.as_str())
}
