use clap::Parser;
use tokio::sync::mpsc;

use super::{AppMode, AppState};
use crate::{
    app::{events::AppEvent, settings::RuntimeSettings},
    cli::Cli,
    domain::weather::samples::{SAMPLE_HOURS, sample_bundle},
    resilience::freshness::FreshnessState,
};

fn cli(args: &[&str]) -> Cli {
    Cli::parse_from(
        ["weather-diorama", "--seed", "7", "--no-settings"]
            .into_iter()
            .chain(args.iter().copied()),
    )
}

fn state(cli: &Cli) -> AppState {
    AppState::new(cli, RuntimeSettings::from_cli_defaults(cli), None).expect("state")
}

#[test]
fn new_state_selects_terrain_without_a_stage() {
    let cli = cli(&["--terrain", "village"]);
    let state = state(&cli);
    assert_eq!(state.mode, AppMode::Loading);
    assert_eq!(state.composer.terrain_index(), Some(1));
    assert!(state.composer.root().is_none());
}

#[tokio::test]
async fn fetch_success_builds_the_stage() {
    let cli = cli(&[]);
    let mut state = state(&cli);
    let (tx, _rx) = mpsc::channel(8);

    state
        .handle_event(AppEvent::FetchSucceeded(sample_bundle()), &tx, &cli)
        .await
        .expect("handle success");

    assert_eq!(state.mode, AppMode::Ready);
    assert_eq!(state.refresh_meta.state, FreshnessState::Fresh);
    assert!(state.composer.is_ticking());
    let summary = state.summary();
    assert_eq!(summary.forecast, Some(SAMPLE_HOURS[0]));
    assert_eq!(summary.precipitation_units, 7);
    assert_eq!(summary.clouds_active, 4);
}

#[tokio::test]
async fn fetch_failure_marks_error_and_backs_off() {
    let cli = cli(&[]);
    let mut state = state(&cli);
    let (tx, _rx) = mpsc::channel(8);

    state
        .handle_event(AppEvent::FetchFailed("boom".to_string()), &tx, &cli)
        .await
        .expect("handle failure");

    assert_eq!(state.mode, AppMode::Error);
    assert_eq!(state.last_error.as_deref(), Some("boom"));
    assert_eq!(state.refresh_meta.consecutive_failures, 1);
    assert_eq!(state.backoff.next_delay().as_secs(), 20);
}

#[tokio::test]
async fn failure_keeps_existing_stage_ready() {
    let cli = cli(&[]);
    let mut state = state(&cli);
    let (tx, _rx) = mpsc::channel(8);
    state
        .handle_event(AppEvent::FetchSucceeded(sample_bundle()), &tx, &cli)
        .await
        .expect("success");
    state
        .handle_event(AppEvent::FetchFailed("timeout".to_string()), &tx, &cli)
        .await
        .expect("failure");

    assert_eq!(state.mode, AppMode::Ready);
    assert!(state.composer.root().is_some());
    assert_eq!(state.refresh_meta.state, FreshnessState::Stale);
}

#[tokio::test]
async fn one_shot_failure_is_fatal() {
    let cli = cli(&["--one-shot"]);
    let mut state = state(&cli);
    let (tx, _rx) = mpsc::channel(8);
    let result = state
        .handle_event(AppEvent::FetchFailed("offline".to_string()), &tx, &cli)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn demo_refresh_steps_through_samples() {
    let cli = cli(&["--demo"]);
    let mut state = state(&cli);
    let (tx, mut rx) = mpsc::channel(8);

    state
        .handle_event(AppEvent::TickRefresh, &tx, &cli)
        .await
        .expect("first refresh");
    let event = rx.recv().await.expect("sample bundle");
    state.handle_event(event, &tx, &cli).await.expect("apply");
    assert_eq!(state.summary().forecast, Some(SAMPLE_HOURS[0]));

    state
        .handle_event(AppEvent::TickRefresh, &tx, &cli)
        .await
        .expect("step");
    assert_eq!(state.hour_offset, 1);
    let summary = state.summary();
    assert_eq!(summary.forecast, Some(SAMPLE_HOURS[1].sanitized()));
    assert_eq!(summary.precipitation_units, 7);
}

#[tokio::test]
async fn frame_limit_quits() {
    let cli = cli(&["--frames", "2"]);
    let mut state = state(&cli);
    let (tx, _rx) = mpsc::channel(8);
    state
        .handle_event(AppEvent::TickFrame, &tx, &cli)
        .await
        .expect("frame 1");
    assert_eq!(state.mode, AppMode::Loading);
    state
        .handle_event(AppEvent::TickFrame, &tx, &cli)
        .await
        .expect("frame 2");
    assert_eq!(state.mode, AppMode::Quit);
}

#[tokio::test]
async fn frame_limit_stops_the_stage_and_saves_settings() {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let path = temp_dir.path().join("settings.json");
    let cli = Cli::parse_from(["weather-diorama", "--seed", "7", "--frames", "1", "--terrain", "town"]);
    let mut state = AppState::new(&cli, RuntimeSettings::from_cli_defaults(&cli), Some(path.clone()))
        .expect("state");
    let (tx, _rx) = mpsc::channel(8);
    state
        .handle_event(AppEvent::FetchSucceeded(sample_bundle()), &tx, &cli)
        .await
        .expect("success");
    assert!(state.composer.is_ticking());

    state
        .handle_event(AppEvent::TickFrame, &tx, &cli)
        .await
        .expect("frame");

    assert_eq!(state.mode, AppMode::Quit);
    assert!(!state.composer.is_ticking());
    let saved: RuntimeSettings =
        serde_json::from_str(&std::fs::read_to_string(&path).expect("settings written"))
            .expect("parse settings");
    assert_eq!(saved.terrain, crate::cli::TerrainArg::Town);
}

#[tokio::test]
async fn reused_forecast_keeps_the_live_stage() {
    let cli = cli(&[]);
    let mut state = state(&cli);
    let (tx, mut rx) = mpsc::channel(8);
    state
        .handle_event(AppEvent::FetchSucceeded(sample_bundle()), &tx, &cli)
        .await
        .expect("success");
    let root = state.composer.root();
    for _ in 0..5 {
        state.handle_event(AppEvent::TickFrame, &tx, &cli).await.expect("frame");
    }
    let drifted = state.composer.clouds().expect("clouds").instances().to_vec();

    state
        .handle_event(AppEvent::TickRefresh, &tx, &cli)
        .await
        .expect("refresh");

    assert!(rx.try_recv().is_err());
    assert_eq!(state.composer.root(), root);
    assert_eq!(state.composer.clouds().expect("clouds").instances(), drifted.as_slice());
}

#[tokio::test]
async fn changed_scale_rebuilds_the_reused_forecast() {
    let cli = cli(&[]);
    let mut state = state(&cli);
    let (tx, _rx) = mpsc::channel(8);
    state
        .handle_event(AppEvent::FetchSucceeded(sample_bundle()), &tx, &cli)
        .await
        .expect("success");
    let root = state.composer.root();

    state.settings.scale = crate::scene::catalog::DisplayScale::Large;
    state
        .handle_event(AppEvent::TickRefresh, &tx, &cli)
        .await
        .expect("refresh");

    assert_ne!(state.composer.root(), root);
    assert_eq!(state.summary().stage_scale, Some(30.0));
}

#[tokio::test]
async fn quit_stops_the_stage() {
    let cli = cli(&[]);
    let mut state = state(&cli);
    let (tx, _rx) = mpsc::channel(8);
    state
        .handle_event(AppEvent::FetchSucceeded(sample_bundle()), &tx, &cli)
        .await
        .expect("success");
    state
        .handle_event(AppEvent::Quit, &tx, &cli)
        .await
        .expect("quit");
    assert_eq!(state.mode, AppMode::Quit);
    assert!(!state.composer.is_ticking());
}
