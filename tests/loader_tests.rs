//! Integration tests for the load/switch/error state machine

mod common;

use std::sync::Arc;

use avatar_runtime::{
    LoadState, ManualClock, ModelConfig, SurfaceRecoveryMonitor, Transform, Viewer, ViewerConfig,
    ViewerError, ViewerEvent,
};
use common::{collect_events, model_config, FakeEngine, FakeSurface};

fn viewer_with_manual_clock(config: ViewerConfig) -> (Viewer<FakeEngine>, Arc<FakeEngine>) {
    common::init_logging();
    let engine = FakeEngine::new();
    let clock = Arc::new(ManualClock::new());
    let viewer = Viewer::with_clock(config, Arc::clone(&engine), clock).unwrap();
    (viewer, engine)
}

#[tokio::test]
async fn test_load_success_binds_model() {
    let (viewer, _engine) = viewer_with_manual_clock(ViewerConfig::default());

    assert_eq!(viewer.load_state(), LoadState::Idle);
    viewer.load_model(model_config("haru")).await.unwrap();

    assert_eq!(viewer.load_state(), LoadState::Loaded);
    assert_eq!(viewer.active_model_id().as_deref(), Some("haru"));
    assert_eq!(viewer.pool_stats().loaded_count, 1);
    assert_eq!(viewer.transform("haru"), Some(Transform::default()));
    // The bundle's texture was warmed into the cache
    assert_eq!(viewer.texture_stats().entry_count, 1);
    assert_eq!(viewer.texture_stats().total_bytes, 64);

    // The render loop collaborator gets the bound model and its transform
    let (id, transform) = avatar_runtime::viewer::render_args(viewer.context()).unwrap();
    assert_eq!(id, "haru");
    assert_eq!(transform, Transform::default());
}

#[tokio::test]
async fn test_invalid_config_is_rejected_up_front() {
    let (viewer, _engine) = viewer_with_manual_clock(ViewerConfig::default());

    let result = viewer.load_model(ModelConfig::new("", "models/haru.bundle")).await;
    assert!(matches!(result, Err(ViewerError::InvalidModelConfig { .. })));
    assert_eq!(viewer.load_state(), LoadState::Idle);
}

#[tokio::test]
async fn test_fetch_failure_sets_error_without_touching_residents() {
    let (viewer, engine) = viewer_with_manual_clock(ViewerConfig::default());

    viewer.load_model(model_config("haru")).await.unwrap();

    engine.fail_fetch("models/bad.bundle");
    let result = viewer.load_model(model_config("bad")).await;
    assert!(matches!(result, Err(ViewerError::LoadFailure { .. })));
    assert_eq!(viewer.load_state(), LoadState::Error);
    assert!(viewer.last_error().is_some());

    // The previously loaded session is untouched
    assert_eq!(viewer.pool_stats().loaded_count, 1);
    assert_eq!(viewer.active_model_id().as_deref(), Some("haru"));
}

#[tokio::test]
async fn test_errors_are_not_sticky() {
    let (viewer, engine) = viewer_with_manual_clock(ViewerConfig::default());

    engine.fail_decode("models/bad.bundle");
    assert!(viewer.load_model(model_config("bad")).await.is_err());
    assert_eq!(viewer.load_state(), LoadState::Error);

    viewer.load_model(model_config("haru")).await.unwrap();
    assert_eq!(viewer.load_state(), LoadState::Loaded);
    assert!(viewer.last_error().is_none());
}

#[tokio::test]
async fn test_hot_swap_goes_through_switching() {
    let (viewer, engine) = viewer_with_manual_clock(ViewerConfig::default());
    viewer.load_model(model_config("haru")).await.unwrap();

    let gate = engine.gate_fetch("models/rin.bundle");
    let load = viewer.load_model(model_config("rin"));
    let probe = async {
        // The load task parked at its fetch; the surface must report a hot
        // swap, and the outgoing model must still be bound.
        assert_eq!(viewer.load_state(), LoadState::Switching);
        assert_eq!(viewer.active_model_id().as_deref(), Some("haru"));
        gate.notify_one();
    };
    let (result, _) = tokio::join!(load, probe);
    result.unwrap();

    assert_eq!(viewer.load_state(), LoadState::Loaded);
    assert_eq!(viewer.active_model_id().as_deref(), Some("rin"));
}

#[tokio::test]
async fn test_reloading_the_bound_model_reports_loading() {
    let (viewer, engine) = viewer_with_manual_clock(ViewerConfig::default());
    viewer.load_model(model_config("haru")).await.unwrap();

    let gate = engine.gate_fetch("models/haru.bundle");
    let load = viewer.load_model(model_config("haru"));
    let probe = async {
        assert_eq!(viewer.load_state(), LoadState::Loading);
        gate.notify_one();
    };
    let (result, _) = tokio::join!(load, probe);
    result.unwrap();
    assert_eq!(viewer.load_state(), LoadState::Loaded);
}

#[tokio::test]
async fn test_superseded_load_never_mutates_the_pool() {
    let (viewer, engine) = viewer_with_manual_clock(ViewerConfig::default());

    let gate_a = engine.gate_fetch("models/a.bundle");
    let load_a = viewer.load_model(model_config("a"));
    let driver = async {
        // B arrives while A is parked at its fetch and completes first
        viewer.load_model(model_config("b")).await.unwrap();
        gate_a.notify_one();
    };
    let (result_a, _) = tokio::join!(load_a, driver);

    // The superseded load resolves quietly
    result_a.unwrap();

    assert_eq!(viewer.active_model_id().as_deref(), Some("b"));
    assert_eq!(viewer.pool_stats().loaded_count, 1);
    assert!(viewer.transform("b").is_some());
    // A backed out after its fetch without registering anything
    assert!(viewer.transform("a").is_none());
    assert_eq!(viewer.load_state(), LoadState::Loaded);
}

#[tokio::test]
async fn test_load_events_are_emitted() {
    let (viewer, engine) = viewer_with_manual_clock(ViewerConfig::default());
    let events = collect_events(&viewer);

    viewer.load_model(model_config("haru")).await.unwrap();
    engine.fail_fetch("models/bad.bundle");
    let _ = viewer.load_model(model_config("bad")).await;

    let events = events.lock();
    assert!(events.iter().any(|e| matches!(
        e,
        ViewerEvent::ModelLoaded { model_id } if model_id == "haru"
    )));
    assert!(events.iter().any(|e| matches!(
        e,
        ViewerEvent::LoadFailed { model_id, .. } if model_id == "bad"
    )));
}

#[tokio::test]
async fn test_surface_recovery_rebinds_without_evicting() {
    let (viewer, _engine) = viewer_with_manual_clock(ViewerConfig::default());
    let events = collect_events(&viewer);
    viewer.load_model(model_config("haru")).await.unwrap();

    let stats_before = viewer.pool_stats();
    let texture_stats_before = viewer.texture_stats();

    let surface = Arc::new(FakeSurface::default());
    surface
        .detached
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let monitor = SurfaceRecoveryMonitor::new(
        Arc::clone(&surface),
        viewer.coordinator().clone(),
        std::time::Duration::from_secs(30),
    );
    assert!(monitor.check_once().is_some());

    // Surface was disposed and recreated; residency is untouched
    assert_eq!(
        surface.recreated.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
    assert_eq!(viewer.load_state(), LoadState::Loaded);
    assert_eq!(viewer.active_model_id().as_deref(), Some("haru"));
    assert_eq!(viewer.pool_stats(), stats_before);
    assert_eq!(viewer.texture_stats(), texture_stats_before);
    assert!(events
        .lock()
        .iter()
        .any(|e| matches!(e, ViewerEvent::SurfaceRecovered { .. })));

    // A healthy surface stays alone
    assert!(monitor.check_once().is_none());
    assert_eq!(
        surface.recreated.load(std::sync::atomic::Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn test_recovery_without_a_bound_model_is_a_noop() {
    let (viewer, _engine) = viewer_with_manual_clock(ViewerConfig::default());
    let events = collect_events(&viewer);

    viewer.coordinator().recover();
    assert_eq!(viewer.load_state(), LoadState::Idle);
    assert!(events.lock().is_empty());
}
