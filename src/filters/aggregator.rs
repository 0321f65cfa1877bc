//! Combined filter predicate shared by every control of a session.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::error::FilterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKey {
    Type,
    Status,
    Category,
    Search,
    Flagged,
}

impl FilterKey {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Type => "type",
            Self::Status => "status",
            Self::Category => "category",
            Self::Search => "search",
            Self::Flagged => "flagged",
        }
    }

    pub const fn all() -> &'static [FilterKey] {
        &[
            FilterKey::Type,
            FilterKey::Status,
            FilterKey::Category,
            FilterKey::Search,
            FilterKey::Flagged,
        ]
    }

    pub const fn default_value(&self) -> FilterValue {
        match self {
            Self::Flagged => FilterValue::Flag(false),
            _ => FilterValue::Text(String::new()),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKey {
    type Err = FilterError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "type" => Ok(Self::Type),
            "status" => Ok(Self::Status),
            "category" => Ok(Self::Category),
            "search" => Ok(Self::Search),
            "flagged" => Ok(Self::Flagged),
            other => Err(FilterError::UnknownFilterKey(other.to_string())),
        }
    }
}

/// A control's contribution to the predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Text(String),
    Flag(bool),
}

impl FilterValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Flag(_) => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for FilterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => write!(f, "'{text}'"),
            Self::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// The five predicate fields. Empty strings and `false` mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub flagged: bool,
}

impl FilterSet {
    pub fn get(&self, key: FilterKey) -> FilterValue {
        match key {
            FilterKey::Type => FilterValue::Text(self.kind.clone()),
            FilterKey::Status => FilterValue::Text(self.status.clone()),
            FilterKey::Category => FilterValue::Text(self.category.clone()),
            FilterKey::Search => FilterValue::Text(self.search.clone()),
            FilterKey::Flagged => FilterValue::Flag(self.flagged),
        }
    }

    pub fn set(&mut self, key: FilterKey, value: FilterValue) -> Result<(), FilterError> {
        match (key, value) {
            (FilterKey::Flagged, FilterValue::Flag(flag)) => self.flagged = flag,
            (FilterKey::Flagged, FilterValue::Text(_)) => {
                return Err(FilterError::ValueMismatch {
                    key: key.to_string(),
                    expected: "boolean",
                })
            }
            (_, FilterValue::Flag(_)) => {
                return Err(FilterError::ValueMismatch {
                    key: key.to_string(),
                    expected: "string",
                })
            }
            (FilterKey::Type, FilterValue::Text(text)) => self.kind = text,
            (FilterKey::Status, FilterValue::Text(text)) => self.status = text,
            (FilterKey::Category, FilterValue::Text(text)) => self.category = text,
            (FilterKey::Search, FilterValue::Text(text)) => self.search = text,
        }
        Ok(())
    }

    pub fn is_set(&self, key: FilterKey) -> bool {
        self.get(key) != key.default_value()
    }

    pub fn active_count(&self) -> usize {
        FilterKey::all().iter().filter(|key| self.is_set(**key)).count()
    }
}

/// Consumer of predicate snapshots (the query/render stage).
pub trait FilterSink: Send + Sync {
    fn filters_changed(&self, filters: FilterSet);
}

/// Single source of truth for the combined predicate.
///
/// Every mutation ends by handing a snapshot copy to the attached sink.
pub struct FilterAggregator {
    current: Mutex<FilterSet>,
    sink: Mutex<Option<Arc<dyn FilterSink>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FilterAggregator {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(FilterSet::default()),
            sink: Mutex::new(None),
        }
    }

    pub fn attach_sink(&self, sink: Arc<dyn FilterSink>) {
        *lock(&self.sink) = Some(sink);
        tracing::info!("filter aggregator attached to query stage");
    }

    pub fn detach_sink(&self) -> Option<Arc<dyn FilterSink>> {
        lock(&self.sink).take()
    }

    /// Snapshot of the current predicate.
    pub fn get_filter(&self) -> FilterSet {
        lock(&self.current).clone()
    }

    /// Set one field by its string key. Unknown keys and mistyped values are
    /// logged and leave the predicate untouched.
    pub fn update_filter(&self, key: &str, value: impl Into<FilterValue>) {
        let value = value.into();
        let key = match key.parse::<FilterKey>() {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("ignoring filter update: {e}");
                return;
            }
        };
        let applied = lock(&self.current).set(key, value.clone());
        match applied {
            Ok(()) => {
                tracing::debug!("filter updated: {key} = {value}");
                self.notify();
            }
            Err(e) => tracing::warn!("ignoring filter update: {e}"),
        }
    }

    /// Merge several fields at once. Either every field is applied or none.
    pub fn update_filters<I>(&self, updates: I)
    where
        I: IntoIterator<Item = (FilterKey, FilterValue)>,
    {
        let applied = {
            let mut current = lock(&self.current);
            let mut next = current.clone();
            let result = updates
                .into_iter()
                .try_for_each(|(key, value)| next.set(key, value));
            if result.is_ok() {
                *current = next;
            }
            result
        };
        match applied {
            Ok(()) => {
                tracing::debug!("multiple filters updated");
                self.notify();
            }
            Err(e) => tracing::warn!("ignoring filter batch: {e}"),
        }
    }

    /// Restore one field to its default.
    pub fn clear_filter(&self, key: &str) {
        match key.parse::<FilterKey>() {
            Ok(key) => self.update_filter(key.as_str(), key.default_value()),
            Err(e) => tracing::warn!("ignoring filter clear: {e}"),
        }
    }

    pub fn clear_all_filters(&self) {
        *lock(&self.current) = FilterSet::default();
        tracing::debug!("all filters cleared");
        self.notify();
    }

    pub fn reset_to_defaults(&self) {
        self.clear_all_filters();
    }

    pub fn toggle_flag_filter(&self) {
        let flagged = {
            let mut current = lock(&self.current);
            current.flagged = !current.flagged;
            current.flagged
        };
        tracing::debug!("flag filter toggled to {flagged}");
        self.notify();
    }

    /// Replace the whole predicate, e.g. from a restored view.
    pub fn apply_filter_state(&self, filters: FilterSet) {
        *lock(&self.current) = filters;
        tracing::debug!("external filter state applied");
        self.notify();
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filter_count() > 0
    }

    pub fn active_filter_count(&self) -> usize {
        lock(&self.current).active_count()
    }

    fn notify(&self) {
        let snapshot = self.get_filter();
        let sink = lock(&self.sink).clone();
        match sink {
            Some(sink) => sink.filters_changed(snapshot),
            None => tracing::warn!("no query stage attached, filter change not applied"),
        }
    }
}

impl Default for FilterAggregator {
    fn default() -> Self {
        Self::new()
    }
}
