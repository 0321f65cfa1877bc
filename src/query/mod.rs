//! Query and render stage fed by the filter aggregator.
//!
//! # Architecture
//!
//! - `ArtifactProvider`: fetches the collection, filtering `type` server-side
//! - `predicate`: narrows by status, category, search and flagged
//! - `QueryStage`: per-type cache, rendering and status-line reporting
//! - `QueryPipeline`: the aggregator's sink; forwards snapshots to a worker

mod error;
pub mod predicate;
mod pipeline;
mod provider;

pub use error::QueryError;
pub use pipeline::{QueryPipeline, QueryStage, Renderer, TracingRenderer};
pub use provider::{ArtifactProvider, HttpArtifactProvider, StaticArtifactProvider};
