mod common;

use std::time::{Duration, Instant};

use common::{fixture_analysis, FakeModel, Outcome};
use storyboard_common::activity::{ActivityLog, Severity};
use storyboard_common::cancel::CancelToken;
use storyboard_common::clock::RequestPacer;
use storyboard_genai::{BatchDriver, BatchProgress, BatchState, CredentialState, ImageOptions};
use storyboard_project_model::timeline::Timeline;

fn timeline() -> Timeline {
    Timeline::rebuild(&fixture_analysis())
}

fn no_delay() -> RequestPacer {
    RequestPacer::from_millis(0)
}

#[tokio::test]
async fn batch_sketches_every_pending_shot_in_order() {
    let model = FakeModel::default();
    let mut timeline = timeline();
    let credentials = CredentialState::new("key", "test");
    let mut log = ActivityLog::new(100);
    let mut progress = Vec::new();

    let mut driver = BatchDriver::new(&model, no_delay(), ImageOptions::default());
    assert_eq!(driver.state(), BatchState::Idle);
    let report = driver
        .run(&mut timeline, &credentials, &CancelToken::new(), &mut log, |p| {
            progress.push(p)
        })
        .await;

    assert_eq!(report.state, BatchState::Completed);
    assert_eq!(report.succeeded, 4);
    assert_eq!(timeline.sketched_count(), 4);
    assert_eq!(
        progress,
        (1..=4)
            .map(|completed| BatchProgress { completed, total: 4 })
            .collect::<Vec<_>>()
    );

    let calls = model.image_calls();
    assert!(calls[0].contains("digging"));
    assert!(calls[3].contains("heart shaped"));
    assert_eq!(log.count(Severity::Success), 1);
}

#[tokio::test]
async fn credential_rejection_halts_and_invalidates() {
    let model = FakeModel::default().with_outcome("glowing green sprout", Outcome::Deny);
    let mut timeline = timeline();
    let credentials = CredentialState::new("key", "test");
    let mut log = ActivityLog::new(100);
    let mut last = None;

    let report = BatchDriver::new(&model, no_delay(), ImageOptions::default())
        .run(&mut timeline, &credentials, &CancelToken::new(), &mut log, |p| {
            last = Some(p)
        })
        .await;

    assert_eq!(report.state, BatchState::Stopped);
    assert!(report.halted_by_credentials);
    assert_eq!(report.attempted, 2);
    assert_eq!(last, Some(BatchProgress { completed: 1, total: 4 }));
    assert!(!credentials.is_valid());
    assert_eq!(model.image_calls().len(), 2);
    assert_eq!(timeline.sketched_count(), 1);
    assert_eq!(log.count(Severity::Error), 1);
}

#[tokio::test]
async fn rejection_on_last_shot_never_reports_full_progress() {
    let model = FakeModel::default().with_outcome("heart shaped", Outcome::Deny);
    let mut timeline = timeline();
    let credentials = CredentialState::new("key", "test");
    let mut log = ActivityLog::new(100);
    let mut progress = Vec::new();

    let report = BatchDriver::new(&model, no_delay(), ImageOptions::default())
        .run(&mut timeline, &credentials, &CancelToken::new(), &mut log, |p| {
            progress.push(p)
        })
        .await;

    assert_eq!(report.state, BatchState::Stopped);
    assert!(report.halted_by_credentials);
    assert_eq!(report.attempted, 4);
    assert_eq!(report.succeeded, 3);
    assert_eq!(progress.last(), Some(&BatchProgress { completed: 3, total: 4 }));
    assert!(progress.iter().all(|p| p.completed < p.total));
    assert_eq!(timeline.pending().count(), 1);
}

#[tokio::test]
async fn other_failures_are_logged_and_skipped() {
    let model = FakeModel::default()
        .with_outcome("tin can pot", Outcome::Fail)
        .with_outcome("heart shaped", Outcome::NoImage);
    let mut timeline = timeline();
    let credentials = CredentialState::new("key", "test");
    let mut log = ActivityLog::new(100);

    let report = BatchDriver::new(&model, no_delay(), ImageOptions::default())
        .run(&mut timeline, &credentials, &CancelToken::new(), &mut log, |_| {})
        .await;

    assert_eq!(report.state, BatchState::Completed);
    assert_eq!(report.attempted, 4);
    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, 2);
    assert!(credentials.is_valid());
    assert_eq!(log.count(Severity::Warning), 2);

    let pending: Vec<_> = timeline.pending().map(|i| i.id.clone()).collect();
    assert_eq!(pending, vec!["shot-0-1-0", "shot-0-1-1"]);
}

#[tokio::test]
async fn stop_keeps_finished_sketches_and_rerun_resumes() {
    let cancel = CancelToken::new();
    let model = FakeModel {
        cancel_after: Some((1, cancel.clone())),
        ..Default::default()
    };
    let mut timeline = timeline();
    let credentials = CredentialState::new("key", "test");
    let mut log = ActivityLog::new(100);

    let report = BatchDriver::new(&model, no_delay(), ImageOptions::default())
        .run(&mut timeline, &credentials, &cancel, &mut log, |_| {})
        .await;
    assert_eq!(report.state, BatchState::Stopped);
    assert!(!report.halted_by_credentials);
    assert_eq!(report.attempted, 1);
    assert_eq!(timeline.sketched_count(), 1);

    cancel.reset();
    let resumed = FakeModel::default();
    let report = BatchDriver::new(&resumed, no_delay(), ImageOptions::default())
        .run(&mut timeline, &credentials, &cancel, &mut log, |_| {})
        .await;

    assert_eq!(report.state, BatchState::Completed);
    assert_eq!(report.total, 3);
    assert!(resumed.image_calls().iter().all(|p| !p.contains("digging")));
    assert_eq!(timeline.sketched_count(), 4);
}

#[tokio::test]
async fn invalid_credentials_make_no_requests() {
    let model = FakeModel::default();
    let mut timeline = timeline();
    let credentials = CredentialState::new("key", "test");
    credentials.invalidate();
    let mut log = ActivityLog::new(100);

    let report = BatchDriver::new(&model, no_delay(), ImageOptions::default())
        .run(&mut timeline, &credentials, &CancelToken::new(), &mut log, |_| {})
        .await;

    assert!(report.halted_by_credentials);
    assert_eq!(report.attempted, 0);
    assert!(model.image_calls().is_empty());
}

#[tokio::test]
async fn pacing_waits_between_requests_only() {
    let model = FakeModel::default();
    let mut analysis = fixture_analysis();
    analysis.acts[0].scenes.truncate(1);
    let mut timeline = Timeline::rebuild(&analysis);
    let credentials = CredentialState::new("key", "test");
    let mut log = ActivityLog::new(100);

    let pacer = RequestPacer::from_millis(60);
    let started = Instant::now();
    BatchDriver::new(&model, pacer, ImageOptions::default())
        .run(&mut timeline, &credentials, &CancelToken::new(), &mut log, |_| {})
        .await;

    // Two shots: one pause.
    assert!(started.elapsed() >= Duration::from_millis(60));
    assert_eq!(pacer.total_wait(2), Duration::from_millis(60));
}

#[tokio::test]
async fn nothing_pending_completes_immediately() {
    let model = FakeModel::default();
    let mut timeline = timeline();
    let ids: Vec<String> = timeline.items().iter().map(|i| i.id.clone()).collect();
    for id in &ids {
        timeline.patch_image(id, "data:image/png;base64,AA==");
    }
    let credentials = CredentialState::new("key", "test");
    let mut log = ActivityLog::new(100);

    let report = BatchDriver::new(&model, no_delay(), ImageOptions::default())
        .run(&mut timeline, &credentials, &CancelToken::new(), &mut log, |_| {})
        .await;

    assert_eq!(report.state, BatchState::Completed);
    assert_eq!(report.total, 0);
    assert!(model.image_calls().is_empty());
}
