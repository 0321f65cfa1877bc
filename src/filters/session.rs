//! Per-page wiring of bus, registry and aggregator.
//!
//! A [`FilterSession`] is built once per page and passed to every control
//! constructor. Controls subscribe to every event kind under their own id
//! and are reached through [`ControlHandle`]s.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use async_trait::async_trait;
use serde_json::json;

use crate::bus::{BusError, BusEvent, ControlId, EventBus, EventHandler, EventKind};
use crate::model::ProjectConfig;

use super::aggregator::{FilterAggregator, FilterSink, FilterValue};
use super::container::FilterContainer;
use super::control::{ClearTarget, ControlEffect, FilterControl, FilterKind};
use super::options::{ControlOptions, IconConfig};
use super::registry::ControlRegistry;
use super::state::FilterState;

/// Shared, lockable reference to one control.
#[derive(Clone)]
pub struct ControlHandle {
    id: ControlId,
    filter_type: String,
    inner: Arc<Mutex<FilterControl>>,
}

impl ControlHandle {
    pub(crate) fn from_parts(
        id: ControlId,
        filter_type: String,
        inner: Arc<Mutex<FilterControl>>,
    ) -> Self {
        Self {
            id,
            filter_type,
            inner,
        }
    }

    pub fn id(&self) -> ControlId {
        self.id
    }

    pub fn filter_type(&self) -> &str {
        &self.filter_type
    }

    pub(crate) fn downgrade(&self) -> Weak<Mutex<FilterControl>> {
        Arc::downgrade(&self.inner)
    }

    /// Lock the control for direct (programmatic) access.
    pub fn lock(&self) -> MutexGuard<'_, FilterControl> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> FilterState {
        self.lock().state()
    }

    pub fn value(&self) -> FilterValue {
        self.lock().value()
    }

    pub fn effective_value(&self) -> Option<FilterValue> {
        self.lock().effective_value()
    }

    pub fn set_value(&self, value: &str) {
        self.lock().set_value(value);
    }

    // User interactions. Each one is put on the bus with this control as
    // the source and takes effect when the bus delivers it.

    async fn emit(&self, kind: EventKind, payload: serde_json::Value) -> BusEvent {
        let bus = self.lock().bus().clone();
        bus.enqueue(kind, self.id, payload).await
    }

    pub async fn click_footer(&self) -> BusEvent {
        self.emit(
            EventKind::StateCycleRequest,
            json!({ "filter_type": self.filter_type }),
        )
        .await
    }

    pub async fn input(&self, text: &str) -> BusEvent {
        self.emit(
            EventKind::InputChange,
            json!({ "filter_type": self.filter_type, "value": text }),
        )
        .await
    }

    pub async fn key_up(&self, text: &str) -> BusEvent {
        self.emit(
            EventKind::KeyUp,
            json!({ "filter_type": self.filter_type, "value": text }),
        )
        .await
    }

    pub async fn choose(&self, value: &str) -> BusEvent {
        let (previous, state) = {
            let control = self.lock();
            (control.value(), control.state())
        };
        self.emit(
            EventKind::SelectChange,
            json!({
                "filter_type": self.filter_type,
                "selected_value": value,
                "previous_value": previous,
                "current_state": state,
            }),
        )
        .await
    }

    pub async fn click(&self) -> BusEvent {
        self.emit(
            EventKind::ButtonClick,
            json!({ "filter_type": self.filter_type }),
        )
        .await
    }
}

/// Bus subscriber standing in for one control.
///
/// Once the control is dropped the subscriber removes itself from the bus
/// on the next event it receives.
struct ControlSubscriber {
    subscriber_id: String,
    control: Weak<Mutex<FilterControl>>,
    bus: Weak<EventBus>,
    registry: Arc<ControlRegistry>,
    aggregator: Arc<FilterAggregator>,
}

#[async_trait]
impl EventHandler for ControlSubscriber {
    async fn handle(&self, event: &BusEvent) -> Result<(), BusError> {
        let Some(control) = self.control.upgrade() else {
            if let Some(bus) = self.bus.upgrade() {
                bus.unsubscribe_all(&self.subscriber_id);
                tracing::debug!("{} dropped, subscriptions removed", self.subscriber_id);
            }
            return Ok(());
        };
        let effect = control
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply_event(event);

        if let Some(effect) = effect {
            execute_effect(&effect, &self.registry, &self.aggregator);
            control
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .deactivate();
        }
        Ok(())
    }
}

fn execute_effect(effect: &ControlEffect, registry: &ControlRegistry, aggregator: &FilterAggregator) {
    match effect {
        ControlEffect::Clear(ClearTarget::All) => clear_all(registry, aggregator),
        ControlEffect::Clear(ClearTarget::Filter(filter_type)) => {
            match registry.get(filter_type) {
                Some(target) => target.lock().clear(),
                None => aggregator.clear_filter(filter_type),
            }
        }
    }
}

fn clear_all(registry: &ControlRegistry, aggregator: &FilterAggregator) {
    for handle in registry.all() {
        let mut control = handle.lock();
        if !matches!(control.kind(), FilterKind::Clear(_)) {
            control.clear();
        }
    }
    aggregator.clear_all_filters();
    tracing::info!("all filters cleared");
}

#[derive(Clone)]
pub struct FilterSession {
    bus: Arc<EventBus>,
    registry: Arc<ControlRegistry>,
    aggregator: Arc<FilterAggregator>,
}

impl FilterSession {
    pub fn new() -> Self {
        Self {
            bus: Arc::new(EventBus::new()),
            registry: Arc::new(ControlRegistry::new()),
            aggregator: Arc::new(FilterAggregator::new()),
        }
    }

    /// Session whose predicate changes go to `sink`.
    pub fn with_sink(sink: Arc<dyn FilterSink>) -> Self {
        let session = Self::new();
        session.aggregator.attach_sink(sink);
        session
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn registry(&self) -> &Arc<ControlRegistry> {
        &self.registry
    }

    pub fn aggregator(&self) -> &Arc<FilterAggregator> {
        &self.aggregator
    }

    pub fn control(&self, filter_type: &str) -> Option<ControlHandle> {
        self.registry.get(filter_type)
    }

    /// Build, register and subscribe a control.
    pub fn create_control(
        &self,
        filter_type: impl Into<String>,
        kind: FilterKind,
        container: &FilterContainer,
        options: ControlOptions,
    ) -> ControlHandle {
        let control = FilterControl::new(filter_type, kind, container, options, self);
        let handle = ControlHandle::from_parts(
            control.id(),
            control.filter_type().to_string(),
            Arc::new(Mutex::new(control)),
        );

        self.registry.register(&handle);
        let subscriber_id = handle.id().to_string();
        let subscriber: Arc<dyn EventHandler> = Arc::new(ControlSubscriber {
            subscriber_id: subscriber_id.clone(),
            control: handle.downgrade(),
            bus: Arc::downgrade(&self.bus),
            registry: self.registry.clone(),
            aggregator: self.aggregator.clone(),
        });
        for kind in EventKind::all() {
            self.bus
                .subscribe(*kind, subscriber.clone(), subscriber_id.clone());
        }

        tracing::debug!(
            "created {} control {} for '{}'",
            handle.lock().kind().name(),
            handle.id(),
            handle.filter_type()
        );
        handle
    }

    pub fn text_input(&self, filter_type: &str, container: &FilterContainer) -> ControlHandle {
        self.create_control(
            filter_type,
            FilterKind::text(container),
            container,
            ControlOptions::default(),
        )
    }

    pub fn select(&self, filter_type: &str, container: &FilterContainer) -> ControlHandle {
        self.create_control(
            filter_type,
            FilterKind::select(container),
            container,
            ControlOptions::default(),
        )
    }

    pub fn icon(
        &self,
        filter_type: &str,
        container: &FilterContainer,
        config: IconConfig,
    ) -> ControlHandle {
        self.create_control(
            filter_type,
            FilterKind::icon(container, config),
            container,
            ControlOptions::default(),
        )
    }

    pub fn clear_control(&self, target: ClearTarget, container: &FilterContainer) -> ControlHandle {
        self.create_control(
            target.filter_type(),
            FilterKind::clear(container, target),
            container,
            ControlOptions::default(),
        )
    }

    /// Create a control for each recognizable container.
    ///
    /// Containers without a footer or a resolvable filter type are skipped.
    /// Select option lists come from `project` when it covers the filter.
    pub fn discover(
        &self,
        containers: &[FilterContainer],
        project: Option<&ProjectConfig>,
    ) -> Vec<ControlHandle> {
        let mut handles = Vec::new();
        for container in containers {
            if container.footer.is_none() {
                tracing::warn!("container without footer skipped: {container:?}");
                continue;
            }
            let Some(filter_type) = container.resolve_filter_type() else {
                tracing::warn!("container without filter type skipped: {container:?}");
                continue;
            };

            let handle = if let Some(target) = ClearTarget::from_filter_type(&filter_type) {
                self.clear_control(target, container)
            } else if container.text_input {
                self.text_input(&filter_type, container)
            } else if container.has_select() {
                let handle = self.select(&filter_type, container);
                if let Some(options) = project.and_then(|p| p.options_for(&filter_type)) {
                    handle.lock().set_options(options);
                }
                handle
            } else if container.button {
                self.icon(
                    &filter_type,
                    container,
                    IconConfig::for_filter_type(&filter_type),
                )
            } else {
                tracing::warn!("container for '{filter_type}' has no recognizable control");
                continue;
            };
            handles.push(handle);
        }
        tracing::info!(
            "discovered {} filter controls, {} registered",
            handles.len(),
            self.registry.len()
        );
        handles
    }

    /// Clear every registered control, then restore the predicate defaults.
    pub fn clear_all(&self) {
        clear_all(&self.registry, &self.aggregator);
    }

    /// Unsubscribe and unregister one control.
    pub fn destroy(&self, handle: &ControlHandle) {
        self.bus.unsubscribe_all(&handle.id().to_string());
        self.registry.unregister(handle.filter_type(), handle.id());
        tracing::debug!("destroyed control {} for '{}'", handle.id(), handle.filter_type());
    }

    /// Tear down every control of the session.
    pub fn teardown(&self) {
        for handle in self.registry.all() {
            self.destroy(&handle);
        }
        self.registry.clear();
        // Controls shadowed by a later registration are not in the registry.
        self.bus.clear();
        tracing::info!("filter session torn down");
    }
}

impl Default for FilterSession {
    fn default() -> Self {
        Self::new()
    }
}
