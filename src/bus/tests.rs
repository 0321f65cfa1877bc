use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::bus::{handler_fn, BusError, BusEvent, ControlId, EventBus, EventHandler, EventKind};

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(log: &Log, name: &'static str) -> Arc<dyn EventHandler> {
    let log = log.clone();
    handler_fn(move |event| {
        log.lock()
            .unwrap()
            .push(format!("{name}:{}:{}", event.kind, event.seq));
        Ok(())
    })
}

/// Enqueues a follow-up event the first time it sees a state-cycle request.
struct Chaining {
    bus: Arc<EventBus>,
    log: Log,
}

#[async_trait]
impl EventHandler for Chaining {
    async fn handle(&self, event: &BusEvent) -> Result<(), BusError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("chain:{}:{}", event.kind, event.seq));
        if event.kind == EventKind::StateCycleRequest {
            let queued = self
                .bus
                .enqueue(EventKind::InputChange, event.source_id, json!({}))
                .await;
            self.log
                .lock()
                .unwrap()
                .push(format!("chain:queued:{}", queued.seq));
        }
        Ok(())
    }
}

#[tokio::test]
async fn two_handlers_receive_one_event_in_subscription_order() {
    let bus = EventBus::new();
    let log: Log = Arc::default();
    bus.subscribe(EventKind::InputChange, recorder(&log, "first"), "first");
    bus.subscribe(EventKind::InputChange, recorder(&log, "second"), "second");

    let source = ControlId::next();
    bus.enqueue(EventKind::InputChange, source, json!({ "value": "a" }))
        .await;
    bus.enqueue(EventKind::InputChange, source, json!({ "value": "b" }))
        .await;

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "first:input-change:0",
            "second:input-change:0",
            "first:input-change:1",
            "second:input-change:1",
        ]
    );
}

#[tokio::test]
async fn enqueue_from_handler_is_deferred_until_current_event_completes() {
    let bus = Arc::new(EventBus::new());
    let log: Log = Arc::default();
    bus.subscribe(
        EventKind::StateCycleRequest,
        Arc::new(Chaining {
            bus: bus.clone(),
            log: log.clone(),
        }),
        "chain",
    );
    bus.subscribe(
        EventKind::StateCycleRequest,
        recorder(&log, "sibling"),
        "sibling",
    );
    bus.subscribe(EventKind::InputChange, recorder(&log, "input"), "input");

    bus.enqueue(EventKind::StateCycleRequest, ControlId::next(), json!({}))
        .await;

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "chain:state-cycle-request:0",
            "chain:queued:1",
            "sibling:state-cycle-request:0",
            "input:input-change:1",
        ]
    );
    assert_eq!(bus.status().queue_len, 0);
    assert!(!bus.status().is_draining);
}

#[tokio::test]
async fn failing_and_panicking_handlers_do_not_stop_delivery() {
    let bus = EventBus::new();
    let log: Log = Arc::default();
    bus.subscribe(
        EventKind::KeyUp,
        handler_fn(|_| Err(BusError::Handler("boom".to_string()))),
        "failing",
    );
    bus.subscribe(
        EventKind::KeyUp,
        handler_fn(|_| panic!("handler panic")),
        "panicking",
    );
    bus.subscribe(EventKind::KeyUp, recorder(&log, "healthy"), "healthy");

    bus.enqueue(EventKind::KeyUp, ControlId::next(), json!({}))
        .await;
    bus.enqueue(EventKind::KeyUp, ControlId::next(), json!({}))
        .await;

    assert_eq!(
        *log.lock().unwrap(),
        vec!["healthy:key-up:0", "healthy:key-up:1"]
    );
    assert_eq!(bus.status().total_events_processed, 2);
}

#[tokio::test]
async fn resubscribing_replaces_handler_in_place() {
    let bus = EventBus::new();
    let log: Log = Arc::default();
    bus.subscribe(EventKind::KeyUp, recorder(&log, "old"), "a");
    bus.subscribe(EventKind::KeyUp, recorder(&log, "b"), "b");
    bus.subscribe(EventKind::KeyUp, recorder(&log, "new"), "a");

    bus.enqueue(EventKind::KeyUp, ControlId::next(), json!({}))
        .await;

    assert_eq!(*log.lock().unwrap(), vec!["new:key-up:0", "b:key-up:0"]);
    assert_eq!(bus.status().subscriber_count, 2);
}

#[tokio::test]
async fn unsubscribe_is_a_no_op_for_unknown_subscribers() {
    let bus = EventBus::new();
    let log: Log = Arc::default();
    bus.subscribe(EventKind::KeyUp, recorder(&log, "a"), "a");

    bus.unsubscribe(EventKind::KeyUp, "missing");
    bus.unsubscribe(EventKind::InputChange, "a");
    assert_eq!(bus.status().subscriber_count, 1);

    bus.unsubscribe(EventKind::KeyUp, "a");
    bus.enqueue(EventKind::KeyUp, ControlId::next(), json!({}))
        .await;
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn handlers_only_see_their_own_kind() {
    let bus = EventBus::new();
    let log: Log = Arc::default();
    bus.subscribe(EventKind::KeyUp, recorder(&log, "keys"), "keys");

    bus.enqueue(EventKind::InputChange, ControlId::next(), json!({}))
        .await;

    assert!(log.lock().unwrap().is_empty());
    let status = bus.status();
    assert_eq!(status.total_events_processed, 1);
    assert_eq!(status.event_kind_counts.get(&EventKind::InputChange), Some(&1));
}

#[test]
fn status_tracks_recent_events_newest_first() {
    let bus = EventBus::new();
    let source = ControlId::next();

    tokio_test::block_on(async {
        for _ in 0..12 {
            bus.enqueue(EventKind::KeyUp, source, json!({})).await;
        }
    });

    let status = bus.status();
    assert_eq!(status.total_events_processed, 12);
    assert_eq!(status.recent_events.len(), 10);
    assert_eq!(status.recent_events[0].seq, 11);
    assert_eq!(status.last_event_kind, Some(EventKind::KeyUp));
    assert_eq!(status.last_event_source, Some(source));
}

#[tokio::test]
async fn clear_drops_subscribers() {
    let bus = EventBus::new();
    let log: Log = Arc::default();
    bus.subscribe(EventKind::KeyUp, recorder(&log, "a"), "a");
    bus.clear();

    bus.enqueue(EventKind::KeyUp, ControlId::next(), json!({}))
        .await;
    assert!(log.lock().unwrap().is_empty());
    assert_eq!(bus.status().subscriber_count, 0);
}

#[test]
fn event_kind_parses_wire_names() {
    assert_eq!(
        "footer-click".parse::<EventKind>(),
        Ok(EventKind::StateCycleRequest)
    );
    assert_eq!("key-up".parse::<EventKind>(), Ok(EventKind::KeyUp));
    assert!("hover".parse::<EventKind>().is_err());
}
