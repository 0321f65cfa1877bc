use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::filters::{FilterSet, FilterSink};
use crate::model::Artifact;
use crate::query::error::QueryError;
use crate::query::predicate::apply_client_filters;
use crate::query::provider::ArtifactProvider;
use crate::status::StatusLine;

/// Receives the artifacts that survived the predicate.
pub trait Renderer: Send + Sync {
    fn render(&self, artifacts: &[Artifact]);
}

/// Renderer that writes one log line per artifact.
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn render(&self, artifacts: &[Artifact]) {
        tracing::info!("rendering {} artifacts", artifacts.len());
        for artifact in artifacts {
            let flag = if artifact.flagged { " [flagged]" } else { "" };
            tracing::info!(
                "  {} [{}/{}] {}{flag}",
                artifact.artifact_id,
                artifact.kind,
                artifact.status,
                artifact.summary
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Query stage
// ---------------------------------------------------------------------------

/// Fetches by type, narrows client-side and renders.
///
/// Fetched collections are cached per type filter until [`QueryStage::invalidate`].
pub struct QueryStage {
    provider: Arc<dyn ArtifactProvider>,
    renderer: Arc<dyn Renderer>,
    status: Arc<StatusLine>,
    cache: HashMap<String, Vec<Artifact>>,
}

impl QueryStage {
    pub fn new(
        provider: Arc<dyn ArtifactProvider>,
        renderer: Arc<dyn Renderer>,
        status: Arc<StatusLine>,
    ) -> Self {
        Self {
            provider,
            renderer,
            status,
            cache: HashMap::new(),
        }
    }

    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    pub fn cached_types(&self) -> usize {
        self.cache.len()
    }

    /// Resolve `filters` to the matching artifacts without rendering.
    pub async fn run_query(&mut self, filters: &FilterSet) -> Result<Vec<Artifact>, QueryError> {
        let key = filters.kind.as_str();
        if !self.cache.contains_key(key) {
            let type_filter = (!key.is_empty()).then_some(key);
            let artifacts = self.provider.fetch_artifacts(type_filter).await?;
            self.cache.insert(key.to_string(), artifacts);
        } else {
            tracing::debug!("using cached artifacts for type filter {key:?}");
        }
        let fetched = self.cache.get(key).map(Vec::as_slice).unwrap_or_default();
        Ok(apply_client_filters(fetched, filters))
    }

    /// Run and render one query, returning how many artifacts were shown.
    /// Failures go to the status line; the predicate is never touched from here.
    pub async fn update(&mut self, filters: &FilterSet) -> Option<usize> {
        match self.run_query(filters).await {
            Ok(artifacts) => {
                tracing::debug!("query {filters:?} matched {} artifacts", artifacts.len());
                self.renderer.render(&artifacts);
                self.status.set_filtered_count(artifacts.len());
                Some(artifacts.len())
            }
            Err(e) => {
                tracing::error!("failed to update search results: {e}");
                self.status
                    .show_error(format!("Failed to update search results: {e}"));
                None
            }
        }
    }

    /// Refetch from the provider and re-run `filters`.
    pub async fn reload(&mut self, filters: &FilterSet) -> Option<usize> {
        self.invalidate();
        let shown = self.update(filters).await?;
        self.status.show_success(format!("Refreshed {shown} artifacts"));
        Some(shown)
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

enum QueryCommand {
    Filters(FilterSet),
    Refresh,
    Settle(oneshot::Sender<()>),
}

/// [`FilterSink`] that hands snapshots to a background [`QueryStage`].
///
/// The worker coalesces bursts: only the latest snapshot is queried.
pub struct QueryPipeline {
    tx: mpsc::UnboundedSender<QueryCommand>,
}

impl QueryPipeline {
    /// Start the worker. It stops once every pipeline handle is dropped.
    pub fn spawn(stage: QueryStage) -> (Arc<Self>, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(stage, rx));
        (Arc::new(Self { tx }), handle)
    }

    fn send(&self, command: QueryCommand) {
        if self.tx.send(command).is_err() {
            tracing::warn!("query worker is gone, command dropped");
        }
    }

    /// Drop cached collections and re-run the latest query.
    pub fn refresh(&self) {
        self.send(QueryCommand::Refresh);
    }

    /// Wait until every command sent so far has been processed.
    pub async fn settled(&self) {
        let (tx, rx) = oneshot::channel();
        self.send(QueryCommand::Settle(tx));
        if rx.await.is_err() {
            tracing::warn!("query worker stopped before settling");
        }
    }
}

impl FilterSink for QueryPipeline {
    fn filters_changed(&self, filters: FilterSet) {
        self.send(QueryCommand::Filters(filters));
    }
}

async fn run_worker(mut stage: QueryStage, mut rx: mpsc::UnboundedReceiver<QueryCommand>) {
    let mut latest = FilterSet::default();

    while let Some(first) = rx.recv().await {
        let mut pending = None;
        let mut refresh = false;
        let mut waiters = Vec::new();

        let mut next = Some(first);
        while let Some(command) = next {
            match command {
                QueryCommand::Filters(filters) => pending = Some(filters),
                QueryCommand::Refresh => refresh = true,
                QueryCommand::Settle(waiter) => waiters.push(waiter),
            }
            next = rx.try_recv().ok();
        }

        let changed = pending.is_some();
        if let Some(filters) = pending {
            latest = filters;
        }
        if refresh {
            stage.reload(&latest).await;
        } else if changed {
            stage.update(&latest).await;
        }

        for waiter in waiters {
            let _ = waiter.send(());
        }
    }
    tracing::debug!("query worker stopped");
}
