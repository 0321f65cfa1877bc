//! Filter-state coordination for the artifact tracker.
//!
//! Toolbar controls (text, select, icon and clear filters) share one event
//! bus and feed a single combined predicate. Every predicate change is
//! handed to the query stage, which fetches, narrows and renders artifacts.
//!
//! # Architecture
//!
//! - `bus`: FIFO event bus; every control sees every event
//! - `filters`: controls, registry, aggregator and the per-page session
//! - `query`: artifact provider, client-side predicate and render pipeline
//! - `status`: user-facing status line
//! - `config`: environment-driven settings

pub mod bus;
pub mod config;
pub mod filters;
pub mod model;
pub mod query;
pub mod status;

use std::sync::Arc;

use tokio::task::JoinHandle;

use config::TrackerConfig;
use filters::{ControlHandle, FilterContainer, FilterSession, FilterSink};
use query::{
    HttpArtifactProvider, QueryError, QueryPipeline, QueryStage, Renderer, TracingRenderer,
};
use status::StatusLine;

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Query(#[from] QueryError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Application wiring
// ---------------------------------------------------------------------------

pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("artifact_filters=debug,info"));
    // A second init (tests, embedding hosts) keeps the first subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// The standard artifact-list toolbar.
pub fn default_toolbar() -> Vec<FilterContainer> {
    vec![
        FilterContainer::new("flagged").with_button(),
        FilterContainer::new("search").with_text_input(),
        FilterContainer::new("category").with_text_input(),
        FilterContainer::new("type").with_select(Vec::<String>::new()),
        FilterContainer::new("status").with_select(Vec::<String>::new()),
        FilterContainer::new("all").with_button(),
    ]
}

/// A running tracker page: filter session plus its query worker.
pub struct TrackerApp {
    session: FilterSession,
    pipeline: Arc<QueryPipeline>,
    status: Arc<StatusLine>,
    controls: Vec<ControlHandle>,
    worker: JoinHandle<()>,
}

impl TrackerApp {
    /// Connect to the tracker API and build the default toolbar.
    pub async fn start(config: &TrackerConfig) -> Result<Self, AppError> {
        Self::start_with(config, Arc::new(TracingRenderer), &default_toolbar()).await
    }

    pub async fn start_with(
        config: &TrackerConfig,
        renderer: Arc<dyn Renderer>,
        toolbar: &[FilterContainer],
    ) -> Result<Self, AppError> {
        let provider = Arc::new(HttpArtifactProvider::new(config)?);
        let status = Arc::new(StatusLine::new());

        let project = match provider.fetch_project_config().await {
            Ok(project) => {
                status.show_info(format!(
                    "Loaded {} work-item types and {} statuses",
                    project.work_item_types.len(),
                    project.artifact_statuses.len()
                ));
                Some(project)
            }
            Err(e) => {
                tracing::warn!("project config unavailable, select options stay static: {e}");
                status.show_warning(format!("Failed to load project configuration: {e}"));
                None
            }
        };

        let stage = QueryStage::new(provider, renderer, status.clone());
        let (pipeline, worker) = QueryPipeline::spawn(stage);
        let session = FilterSession::with_sink(pipeline.clone());
        let controls = session.discover(toolbar, project.as_ref());

        pipeline.filters_changed(session.aggregator().get_filter());
        tracing::info!("tracker started against {}", config.api_base_url);

        Ok(Self {
            session,
            pipeline,
            status,
            controls,
            worker,
        })
    }

    pub fn session(&self) -> &FilterSession {
        &self.session
    }

    pub fn pipeline(&self) -> &Arc<QueryPipeline> {
        &self.pipeline
    }

    pub fn status(&self) -> &Arc<StatusLine> {
        &self.status
    }

    pub fn control(&self, filter_type: &str) -> Option<ControlHandle> {
        self.session.control(filter_type)
    }

    pub fn controls(&self) -> &[ControlHandle] {
        &self.controls
    }

    /// Wait for pending queries to finish rendering.
    pub async fn settled(&self) {
        self.pipeline.settled().await;
    }

    /// Tear down the session and wait for the query worker to stop.
    pub async fn shutdown(self) -> Result<(), AppError> {
        let Self {
            session,
            pipeline,
            worker,
            ..
        } = self;
        session.teardown();
        session.aggregator().detach_sink();
        drop(pipeline);
        worker
            .await
            .map_err(|e| AppError::Other(format!("query worker failed: {e}")))
    }
}
