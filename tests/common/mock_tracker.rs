// tests/common/mock_tracker.rs
//! Mock tracker API and a renderer that records what it was asked to show.

use std::sync::{Arc, Mutex};

use artifact_filters_lib::config::TrackerConfig;
use artifact_filters_lib::filters::FilterContainer;
use artifact_filters_lib::model::Artifact;
use artifact_filters_lib::query::Renderer;
use artifact_filters_lib::{default_toolbar, TrackerApp};
use httpmock::prelude::*;
use httpmock::Mock;
use serde_json::json;

pub fn sample_artifacts() -> Vec<Artifact> {
    let item = |id: &str, kind: &str, status: &str, category: &str, flagged: bool| Artifact {
        artifact_id: id.to_string(),
        kind: kind.to_string(),
        status: status.to_string(),
        category: category.to_string(),
        summary: format!("{kind} in {category}"),
        description: format!("Details for {id}"),
        flagged,
        iteration: None,
    };
    vec![
        item("A-1", "bug", "open", "auth", true),
        item("A-2", "bug", "done", "auth", false),
        item("A-3", "story", "open", "billing", true),
        item("A-4", "task", "open", "auth", true),
        item("A-5", "bug", "open", "search", false),
    ]
}

#[derive(Default)]
pub struct RecordingRenderer {
    renders: Mutex<Vec<Vec<String>>>,
}

impl RecordingRenderer {
    pub fn last_ids(&self) -> Option<Vec<String>> {
        self.renders.lock().unwrap().last().cloned()
    }

    pub fn render_count(&self) -> usize {
        self.renders.lock().unwrap().len()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, artifacts: &[Artifact]) {
        self.renders
            .lock()
            .unwrap()
            .push(artifacts.iter().map(|a| a.artifact_id.clone()).collect());
    }
}

pub struct MockTracker {
    pub server: MockServer,
}

impl MockTracker {
    pub fn start() -> Self {
        Self {
            server: MockServer::start(),
        }
    }

    pub fn config(&self) -> TrackerConfig {
        TrackerConfig {
            api_base_url: self.server.base_url(),
            request_timeout_ms: 2_000,
        }
    }

    pub fn mock_project_config(&self) -> Mock<'_> {
        self.server.mock(|when, then| {
            when.method(GET).path("/config");
            then.status(200).json_body(json!({
                "version": "3",
                "work_item_types": [
                    { "id": "bug", "name": "Bug" },
                    { "id": "story", "name": "Story" },
                    { "id": "task", "name": "Task" }
                ],
                "artifact_statuses": [
                    { "id": "open", "name": "Open" },
                    { "id": "done", "name": "Done" }
                ]
            }));
        })
    }

    /// Serve the whole collection for any `/artifacts` request.
    pub fn mock_all_artifacts(&self) -> Mock<'_> {
        self.server.mock(|when, then| {
            when.method(GET).path("/artifacts");
            then.status(200).json_body(json!(sample_artifacts()));
        })
    }

    /// Serve only `kind` artifacts, and only when asked for that type.
    pub fn mock_artifacts_of_type(&self, kind: &str) -> Mock<'_> {
        let body: Vec<Artifact> = sample_artifacts()
            .into_iter()
            .filter(|a| a.kind == kind)
            .collect();
        self.server.mock(|when, then| {
            when.method(GET).path("/artifacts").query_param("type", kind);
            then.status(200).json_body(json!(body));
        })
    }

    pub async fn start_app(&self, renderer: Arc<RecordingRenderer>) -> TrackerApp {
        self.start_app_with(renderer, &default_toolbar()).await
    }

    pub async fn start_app_with(
        &self,
        renderer: Arc<RecordingRenderer>,
        toolbar: &[FilterContainer],
    ) -> TrackerApp {
        let app = TrackerApp::start_with(&self.config(), renderer, toolbar)
            .await
            .expect("tracker app starts");
        app.settled().await;
        app
    }
}
