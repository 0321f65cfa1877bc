// tests/common/mod.rs
//! Common test utilities for tracker integration tests.

pub mod mock_tracker;

pub use mock_tracker::{sample_artifacts, MockTracker, RecordingRenderer};
