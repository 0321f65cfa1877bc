use std::collections::{BTreeMap, HashMap, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event_types::{ControlId, EventKind};

const RECENT_EVENTS_LIMIT: usize = 10;

#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("handler failed: {0}")]
    Handler(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEvent {
    pub id: String,
    pub seq: i64,
    pub kind: EventKind,
    pub source_id: ControlId,
    pub payload: serde_json::Value,
    pub created_at: String,
}

impl BusEvent {
    /// True when `control` emitted this event.
    pub fn is_from(&self, control: ControlId) -> bool {
        self.source_id == control
    }
}

/// A bus subscriber. Handlers may await; the bus awaits each one before
/// moving on to the next handler or event.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &BusEvent) -> Result<(), BusError>;
}

/// Adapter turning a plain closure into an [`EventHandler`].
pub struct FnHandler<F>(F);

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&BusEvent) -> Result<(), BusError> + Send + Sync,
{
    async fn handle(&self, event: &BusEvent) -> Result<(), BusError> {
        (self.0)(event)
    }
}

pub fn handler_fn<F>(f: F) -> Arc<dyn EventHandler>
where
    F: Fn(&BusEvent) -> Result<(), BusError> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

struct Subscription {
    subscriber_id: String,
    handler: Arc<dyn EventHandler>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub seq: i64,
    pub kind: EventKind,
    pub source_id: ControlId,
    pub created_at: String,
}

#[derive(Debug, Default)]
struct EventStats {
    total_events_processed: u64,
    last_event: Option<EventRecord>,
    recent_events: VecDeque<EventRecord>,
    kind_counts: BTreeMap<EventKind, u64>,
}

/// Diagnostic snapshot of the bus.
#[derive(Debug, Clone, Serialize)]
pub struct BusStatus {
    pub queue_len: usize,
    pub is_draining: bool,
    pub subscriber_count: usize,
    pub total_events_processed: u64,
    pub last_event_kind: Option<EventKind>,
    pub last_event_source: Option<ControlId>,
    /// Newest first.
    pub recent_events: Vec<EventRecord>,
    pub event_kind_counts: BTreeMap<EventKind, u64>,
}

/// FIFO event queue with sequential fan-out.
///
/// Events are delivered one at a time to every handler subscribed to their
/// kind, in subscription order. An `enqueue` issued while the queue is being
/// drained (for example from inside a handler) only appends; the running
/// drain picks it up after the current event has reached every handler.
pub struct EventBus {
    subscribers: Mutex<HashMap<EventKind, Vec<Subscription>>>,
    queue: Mutex<VecDeque<BusEvent>>,
    draining: AtomicBool,
    seq: AtomicI64,
    stats: Mutex<EventStats>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            queue: Mutex::new(VecDeque::new()),
            draining: AtomicBool::new(false),
            seq: AtomicI64::new(0),
            stats: Mutex::new(EventStats::default()),
        }
    }

    /// Register `handler` for `kind` under `subscriber_id`.
    ///
    /// Re-subscribing an existing id replaces its handler in place, keeping
    /// its original delivery position.
    pub fn subscribe(
        &self,
        kind: EventKind,
        handler: Arc<dyn EventHandler>,
        subscriber_id: impl Into<String>,
    ) {
        let subscriber_id = subscriber_id.into();
        let mut subscribers = lock(&self.subscribers);
        let entries = subscribers.entry(kind).or_default();
        match entries.iter_mut().find(|s| s.subscriber_id == subscriber_id) {
            Some(existing) => existing.handler = handler,
            None => entries.push(Subscription {
                subscriber_id: subscriber_id.clone(),
                handler,
            }),
        }
        tracing::debug!("{subscriber_id} subscribed to {kind}");
    }

    pub fn unsubscribe(&self, kind: EventKind, subscriber_id: &str) {
        let mut subscribers = lock(&self.subscribers);
        if let Some(entries) = subscribers.get_mut(&kind) {
            let before = entries.len();
            entries.retain(|s| s.subscriber_id != subscriber_id);
            if entries.len() != before {
                tracing::debug!("{subscriber_id} unsubscribed from {kind}");
            }
        }
    }

    /// Remove `subscriber_id` from every kind.
    pub fn unsubscribe_all(&self, subscriber_id: &str) {
        for kind in EventKind::all() {
            self.unsubscribe(*kind, subscriber_id);
        }
    }

    /// Build an event, append it to the queue and drain unless a drain is
    /// already running.
    pub async fn enqueue(
        &self,
        kind: EventKind,
        source_id: ControlId,
        payload: serde_json::Value,
    ) -> BusEvent {
        let event = BusEvent {
            id: Uuid::new_v4().to_string(),
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            kind,
            source_id,
            payload,
            created_at: Utc::now().to_rfc3339(),
        };

        let queue_len = {
            let mut queue = lock(&self.queue);
            queue.push_back(event.clone());
            queue.len()
        };
        tracing::debug!("queued {kind} from {source_id}, queue length {queue_len}");

        if self.draining.load(Ordering::Acquire) {
            tracing::debug!("drain in progress, {kind} #{} deferred", event.seq);
        } else {
            self.drain().await;
        }
        event
    }

    /// Deliver queued events until the queue is empty. Returns immediately if
    /// another drain is in progress.
    pub async fn drain(&self) {
        loop {
            if self
                .draining
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }

            while let Some(event) = self.pop_next() {
                self.distribute(&event).await;
            }

            self.draining.store(false, Ordering::Release);
            if lock(&self.queue).is_empty() {
                break;
            }
        }
        tracing::debug!("event queue drained");
    }

    fn pop_next(&self) -> Option<BusEvent> {
        lock(&self.queue).pop_front()
    }

    fn handlers_for(&self, kind: EventKind) -> Vec<(String, Arc<dyn EventHandler>)> {
        lock(&self.subscribers)
            .get(&kind)
            .map(|entries| {
                entries
                    .iter()
                    .map(|s| (s.subscriber_id.clone(), s.handler.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    async fn distribute(&self, event: &BusEvent) {
        let handlers = self.handlers_for(event.kind);
        tracing::debug!(
            "distributing {} #{} to {} subscribers",
            event.kind,
            event.seq,
            handlers.len()
        );

        for (subscriber_id, handler) in handlers {
            match AssertUnwindSafe(handler.handle(event)).catch_unwind().await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!("subscriber {subscriber_id} failed on {}: {e}", event.kind);
                }
                Err(_) => {
                    tracing::error!("subscriber {subscriber_id} panicked on {}", event.kind);
                }
            }
        }

        self.record(event);
    }

    fn record(&self, event: &BusEvent) {
        let record = EventRecord {
            seq: event.seq,
            kind: event.kind,
            source_id: event.source_id,
            created_at: event.created_at.clone(),
        };
        let mut stats = lock(&self.stats);
        stats.total_events_processed += 1;
        *stats.kind_counts.entry(event.kind).or_insert(0) += 1;
        stats.recent_events.push_front(record.clone());
        stats.recent_events.truncate(RECENT_EVENTS_LIMIT);
        stats.last_event = Some(record);
    }

    pub fn status(&self) -> BusStatus {
        let queue_len = lock(&self.queue).len();
        let subscriber_count = lock(&self.subscribers).values().map(Vec::len).sum();
        let stats = lock(&self.stats);
        BusStatus {
            queue_len,
            is_draining: self.draining.load(Ordering::Acquire),
            subscriber_count,
            total_events_processed: stats.total_events_processed,
            last_event_kind: stats.last_event.as_ref().map(|e| e.kind),
            last_event_source: stats.last_event.as_ref().map(|e| e.source_id),
            recent_events: stats.recent_events.iter().cloned().collect(),
            event_kind_counts: stats.kind_counts.clone(),
        }
    }

    /// Drop pending events and every subscription.
    pub fn clear(&self) {
        lock(&self.queue).clear();
        lock(&self.subscribers).clear();
        tracing::debug!("event bus cleared");
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
