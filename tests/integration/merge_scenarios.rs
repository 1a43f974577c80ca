use crate::support::{
    done_second_arrow, two_step_canvas, CountingDelivery, FakeMergeService, UnreachableSource,
};
use framemerge::delivery::FileDelivery;
use framemerge::error::MergeError;
use framemerge::graph::{Arrow, ArrowStatus};
use framemerge::merge::{interpret_response, MergeOrchestrator, MergeOutcome, MergeState};
use framemerge::notify::{NotificationLevel, RecordingNotifier};
use framemerge::path::resolve_path;
use framemerge::sequence::extract_videos;
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test]
async fn completed_chain_is_submitted_in_root_first_order() {
    let canvas = Arc::new(two_step_canvas(done_second_arrow()));
    let service = Arc::new(FakeMergeService::returning("https://x/out.mp4"));
    let delivery = Arc::new(CountingDelivery::default());
    let notifier = Arc::new(RecordingNotifier::new());
    let orchestrator =
        MergeOrchestrator::new(canvas, service.clone(), delivery.clone(), notifier.clone());

    let outcome = orchestrator.merge().await;

    let MergeOutcome::Merged(receipt) = outcome else {
        panic!("expected a merged outcome, got {:?}", outcome);
    };
    assert_eq!(receipt.video_url, "https://x/out.mp4");
    assert_eq!(receipt.video_count, 2);
    assert_eq!(service.requests(), vec![vec!["url1", "url2"]]);
    assert_eq!(delivery.calls(), 1);
    assert_eq!(
        notifier.messages(),
        vec!["Successfully merged 2 videos!", "Video downloaded successfully!"]
    );
    assert_eq!(orchestrator.state(), MergeState::Idle);
}

#[tokio::test]
async fn running_arrow_leaves_too_few_videos() {
    let canvas = two_step_canvas(Arrow::new("A2", "F1", "F2").with_status(ArrowStatus::Running));
    let path = resolve_path(&canvas, &"F2".into()).unwrap();
    assert_eq!(extract_videos(&path), vec!["url1"]);

    let service = Arc::new(FakeMergeService::returning("https://x/out.mp4"));
    let notifier = Arc::new(RecordingNotifier::new());
    let orchestrator = MergeOrchestrator::new(
        Arc::new(canvas),
        service.clone(),
        Arc::new(CountingDelivery::default()),
        notifier.clone(),
    );

    let outcome = orchestrator.merge().await;

    assert_eq!(
        outcome,
        MergeOutcome::Rejected(MergeError::InsufficientVideos { found: 1 })
    );
    assert!(service.requests().is_empty());
    assert_eq!(
        notifier.messages(),
        vec!["At least 2 videos are required for merging."]
    );
}

#[tokio::test]
async fn root_target_has_no_videos() {
    let mut canvas = two_step_canvas(done_second_arrow());
    canvas.select(vec!["R".into()]);
    let path = resolve_path(&canvas, &"R".into()).unwrap();
    assert_eq!(path.len(), 1);
    assert!(extract_videos(&path).is_empty());

    let service = Arc::new(FakeMergeService::returning("https://x/out.mp4"));
    let orchestrator = MergeOrchestrator::new(
        Arc::new(canvas),
        service.clone(),
        Arc::new(CountingDelivery::default()),
        Arc::new(RecordingNotifier::new()),
    );

    assert_eq!(
        orchestrator.merge().await,
        MergeOutcome::Rejected(MergeError::NoVideosInPath)
    );
    assert!(service.requests().is_empty());
}

#[tokio::test]
async fn server_error_fails_without_delivery() {
    let error = interpret_response(500, br#"{"detail":"boom"}"#).unwrap_err();
    let service = Arc::new(FakeMergeService::with_response(Err(error)));
    let delivery = Arc::new(CountingDelivery::default());
    let notifier = Arc::new(RecordingNotifier::new());
    let orchestrator = MergeOrchestrator::new(
        Arc::new(two_step_canvas(done_second_arrow())),
        service.clone(),
        delivery.clone(),
        notifier.clone(),
    );
    let mut states = orchestrator.subscribe();

    let outcome = orchestrator.merge().await;

    let expected = MergeError::ServerError("HTTP error! status: 500".to_string());
    assert_eq!(outcome, MergeOutcome::Failed(expected));
    assert_eq!(delivery.calls(), 0);
    assert_eq!(
        notifier.messages(),
        vec!["Failed to merge videos: HTTP error! status: 500"]
    );
    assert!(states.has_changed().unwrap());
    assert_eq!(*states.borrow_and_update(), MergeState::Idle);

    // The session is usable again.
    assert_eq!(service.requests().len(), 1);
    let _ = orchestrator.merge().await;
    assert_eq!(service.requests().len(), 2);
}

#[tokio::test]
async fn failed_download_still_reports_the_merge() {
    let temp = TempDir::new().unwrap();
    let delivery = FileDelivery::new(UnreachableSource, temp.path().to_path_buf());
    let notifier = Arc::new(RecordingNotifier::new());
    let orchestrator = MergeOrchestrator::new(
        Arc::new(two_step_canvas(done_second_arrow())),
        Arc::new(FakeMergeService::returning("https://x/out.mp4")),
        Arc::new(delivery),
        notifier.clone(),
    );

    let outcome = orchestrator.merge().await;

    let MergeOutcome::Merged(receipt) = outcome else {
        panic!("expected a merged outcome, got {:?}", outcome);
    };
    assert_eq!(receipt.video_url, "https://x/out.mp4");
    assert!(matches!(receipt.delivery, Err(MergeError::DownloadFailed(_))));

    let entries = notifier.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].level, NotificationLevel::Success);
    assert_eq!(entries[0].message, "Successfully merged 2 videos!");
    assert_eq!(entries[1].level, NotificationLevel::Error);
    assert_eq!(
        entries[1].message,
        "Video merged but download failed. You can access it at https://x/out.mp4"
    );

    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
    assert_eq!(orchestrator.state(), MergeState::Idle);
}
