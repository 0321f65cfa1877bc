//! Status line: last user-facing message and the filtered artifact count.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub last_message: String,
    pub level: MessageLevel,
    pub filtered_count: usize,
}

#[derive(Default)]
pub struct StatusLine {
    inner: Mutex<StatusSnapshot>,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> MutexGuard<'_, StatusSnapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn show_message(&self, message: impl Into<String>, level: MessageLevel) {
        let message = message.into();
        tracing::debug!("status line ({level:?}): {message}");
        let mut inner = self.inner();
        inner.last_message = message;
        inner.level = level;
    }

    pub fn show_info(&self, message: impl Into<String>) {
        self.show_message(message, MessageLevel::Info);
    }

    pub fn show_success(&self, message: impl Into<String>) {
        self.show_message(message, MessageLevel::Success);
    }

    pub fn show_warning(&self, message: impl Into<String>) {
        self.show_message(message, MessageLevel::Warning);
    }

    pub fn show_error(&self, message: impl Into<String>) {
        self.show_message(message, MessageLevel::Error);
    }

    pub fn set_filtered_count(&self, count: usize) {
        self.inner().filtered_count = count;
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.inner().clone()
    }
}
