//! Event system for filter controls.
//!
//! The event bus provides:
//! - A FIFO queue of user-originated UI events
//! - Sequential fan-out to every subscriber of an event kind
//! - Per-subscriber failure isolation
//!
//! # Architecture
//!
//! Control → `EventBus::enqueue` → queue → every subscribed `EventHandler`.
//! Delivery is broadcast: each control sees every control's events and
//! checks `BusEvent::source_id` itself.

mod event_bus;
mod event_types;

pub use event_bus::{
    handler_fn, BusError, BusEvent, BusStatus, EventBus, EventHandler, EventRecord, FnHandler,
};
pub use event_types::{ControlId, EventKind};

#[cfg(test)]
mod tests;
