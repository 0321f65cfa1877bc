//! Filter controls and the combined filter predicate.
//!
//! # Architecture
//!
//! - `FilterControl`: one predicate field with an active/inactive/disabled
//!   lifecycle; variant behavior lives in `FilterKind`
//! - `ControlRegistry`: weak lookup of controls by filter type
//! - `FilterAggregator`: the combined predicate, republished to a
//!   `FilterSink` after every change
//! - `FilterSession`: owns bus, registry and aggregator for one page

mod aggregator;
mod container;
mod control;
mod error;
mod options;
mod registry;
mod session;
mod state;

pub use aggregator::{FilterAggregator, FilterKey, FilterSet, FilterSink, FilterValue};
pub use container::FilterContainer;
pub use control::{
    ClearAction, ClearTarget, ControlEffect, FilterControl, FilterKind, IconToggle, SelectInput,
    TextInput, CLEAR_ALL_FILTER_TYPE,
};
pub use error::FilterError;
pub use options::{ControlOptions, IconConfig, StateColors, TextColors};
pub use registry::ControlRegistry;
pub use session::{ControlHandle, FilterSession};
pub use state::FilterState;
