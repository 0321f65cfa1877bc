use std::sync::{Mutex, MutexGuard, PoisonError, Weak};

use crate::bus::ControlId;

use super::control::FilterControl;
use super::session::ControlHandle;

struct Entry {
    filter_type: String,
    id: ControlId,
    control: Weak<Mutex<FilterControl>>,
}

/// Lookup of live controls by filter type.
///
/// Holds weak references only; the last control registered for a filter
/// type replaces the previous one.
#[derive(Default)]
pub struct ControlRegistry {
    entries: Mutex<Vec<Entry>>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn register(&self, handle: &ControlHandle) {
        let entry = Entry {
            filter_type: handle.filter_type().to_string(),
            id: handle.id(),
            control: handle.downgrade(),
        };
        let mut entries = self.entries();
        match entries.iter_mut().find(|e| e.filter_type == entry.filter_type) {
            Some(existing) => {
                tracing::debug!(
                    "{} replaces {} for filter '{}'",
                    entry.id,
                    existing.id,
                    entry.filter_type
                );
                *existing = entry;
            }
            None => entries.push(entry),
        }
    }

    /// Remove `id`'s entry. An entry already taken over by a newer control
    /// is left alone.
    pub(crate) fn unregister(&self, filter_type: &str, id: ControlId) {
        self.entries()
            .retain(|e| !(e.filter_type == filter_type && e.id == id));
    }

    pub fn get(&self, filter_type: &str) -> Option<ControlHandle> {
        let entries = self.entries();
        let entry = entries.iter().find(|e| e.filter_type == filter_type)?;
        let control = entry.control.upgrade()?;
        Some(ControlHandle::from_parts(
            entry.id,
            entry.filter_type.clone(),
            control,
        ))
    }

    /// Live controls in registration order.
    pub fn all(&self) -> Vec<ControlHandle> {
        self.entries()
            .iter()
            .filter_map(|e| {
                e.control
                    .upgrade()
                    .map(|control| ControlHandle::from_parts(e.id, e.filter_type.clone(), control))
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.control.strong_count() > 0)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn clear(&self) {
        self.entries().clear();
    }
}
