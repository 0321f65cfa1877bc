// tests/tracker_integration_test.rs
//! End-to-end tests: toolbar controls driving queries against a mock API.

mod common;

use std::sync::Arc;

use artifact_filters_lib::filters::{FilterContainer, FilterSet, FilterState};
use artifact_filters_lib::status::MessageLevel;
use artifact_filters_lib::TrackerApp;
use common::{MockTracker, RecordingRenderer};
use pretty_assertions::assert_eq;

fn ids(values: &[&str]) -> Option<Vec<String>> {
    Some(values.iter().map(|v| v.to_string()).collect())
}

fn control(app: &TrackerApp, filter_type: &str) -> artifact_filters_lib::filters::ControlHandle {
    app.control(filter_type)
        .unwrap_or_else(|| panic!("no control for {filter_type}"))
}

#[tokio::test]
async fn startup_loads_options_and_renders_everything() {
    let tracker = MockTracker::start();
    let config_mock = tracker.mock_project_config();
    let artifacts_mock = tracker.mock_all_artifacts();
    let renderer = Arc::new(RecordingRenderer::default());

    let app = tracker.start_app(renderer.clone()).await;

    config_mock.assert();
    artifacts_mock.assert();
    assert_eq!(app.controls().len(), 6);
    assert_eq!(
        control(&app, "type").lock().options(),
        ["bug".to_string(), "story".to_string(), "task".to_string()]
    );
    assert_eq!(renderer.last_ids(), ids(&["A-1", "A-2", "A-3", "A-4", "A-5"]));
    let snapshot = app.status().snapshot();
    assert_eq!(snapshot.filtered_count, 5);
    assert_eq!(snapshot.level, MessageLevel::Info);
    assert_eq!(snapshot.last_message, "Loaded 3 work-item types and 2 statuses");

    app.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn toolbar_interactions_narrow_and_clear() {
    let tracker = MockTracker::start();
    tracker.mock_project_config();
    tracker.mock_all_artifacts();
    let renderer = Arc::new(RecordingRenderer::default());
    let app = tracker.start_app(renderer.clone()).await;

    control(&app, "category").input("AUTH").await;
    app.settled().await;
    assert_eq!(renderer.last_ids(), ids(&["A-1", "A-2", "A-4"]));

    let status = control(&app, "status");
    status.choose("done").await;
    app.settled().await;
    assert_eq!(renderer.last_ids(), ids(&["A-2"]));

    status.click_footer().await;
    app.settled().await;
    assert_eq!(status.state(), FilterState::Disabled);
    assert_eq!(renderer.last_ids(), ids(&["A-1", "A-2", "A-4"]));

    control(&app, "flagged").click().await;
    control(&app, "search").input("task").await;
    app.settled().await;
    assert_eq!(renderer.last_ids(), ids(&["A-4"]));
    assert_eq!(app.status().snapshot().filtered_count, 1);

    control(&app, "all").click().await;
    app.settled().await;
    assert_eq!(renderer.last_ids(), ids(&["A-1", "A-2", "A-3", "A-4", "A-5"]));
    assert_eq!(app.session().aggregator().get_filter(), FilterSet::default());
    for handle in app.controls() {
        assert_eq!(handle.state(), FilterState::Inactive, "{}", handle.filter_type());
    }

    app.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn type_filter_is_resolved_by_the_server() {
    let tracker = MockTracker::start();
    tracker.mock_project_config();
    let bugs = tracker.mock_artifacts_of_type("bug");
    let renderer = Arc::new(RecordingRenderer::default());
    let app = tracker.start_app(renderer.clone()).await;

    // No mock serves the untyped collection.
    let snapshot = app.status().snapshot();
    assert_eq!(snapshot.level, MessageLevel::Error);
    assert_eq!(
        snapshot.last_message,
        "Failed to update search results: HTTP error! status: 404"
    );
    assert_eq!(renderer.render_count(), 0);
    assert_eq!(app.session().aggregator().get_filter(), FilterSet::default());

    control(&app, "type").choose("bug").await;
    app.settled().await;
    assert_eq!(renderer.last_ids(), ids(&["A-1", "A-2", "A-5"]));

    control(&app, "flagged").click().await;
    app.settled().await;
    assert_eq!(renderer.last_ids(), ids(&["A-1"]));
    assert_eq!(bugs.hits(), 1);

    app.pipeline().refresh();
    app.settled().await;
    assert_eq!(bugs.hits(), 2);
    let snapshot = app.status().snapshot();
    assert_eq!(snapshot.level, MessageLevel::Success);
    assert_eq!(snapshot.last_message, "Refreshed 1 artifacts");

    app.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn missing_project_config_is_reported_but_not_fatal() {
    let tracker = MockTracker::start();
    tracker.mock_all_artifacts();
    let renderer = Arc::new(RecordingRenderer::default());
    let app = tracker.start_app(renderer.clone()).await;

    let snapshot = app.status().snapshot();
    assert_eq!(snapshot.level, MessageLevel::Warning);
    assert!(snapshot
        .last_message
        .starts_with("Failed to load project configuration"));
    assert_eq!(renderer.render_count(), 1);

    let kind = control(&app, "type");
    assert!(kind.lock().options().is_empty());
    kind.choose("story").await;
    assert_eq!(kind.state(), FilterState::Active);
    assert_eq!(app.session().aggregator().get_filter().kind, "story");

    app.shutdown().await.expect("clean shutdown");
}

#[tokio::test]
async fn per_filter_clear_control_resets_its_target() {
    let tracker = MockTracker::start();
    tracker.mock_project_config();
    tracker.mock_all_artifacts();
    let renderer = Arc::new(RecordingRenderer::default());
    let toolbar = vec![
        FilterContainer::new("search").with_text_input(),
        FilterContainer::new("clear-search").with_button(),
    ];
    let app = tracker.start_app_with(renderer.clone(), &toolbar).await;

    let search = control(&app, "search");
    search.input("billing").await;
    app.settled().await;
    assert_eq!(renderer.last_ids(), ids(&["A-3"]));

    control(&app, "clear-search").click().await;
    app.settled().await;
    assert_eq!(search.state(), FilterState::Inactive);
    assert_eq!(renderer.last_ids(), ids(&["A-1", "A-2", "A-3", "A-4", "A-5"]));

    app.shutdown().await.expect("clean shutdown");
}
