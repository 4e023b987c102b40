//! Finalization scenarios: nothing is left running after the process
//! reports its verdict.

use devctl::testing::{BufferSink, PendingVideo, RecordingReporter, StubTarget};
use devctl::{
    Action, ActionPerformer, Command, Configuration, ProcessDriver, RecordAction, SimulatedDevice,
    TargetUdid, EXIT_SUCCESS,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Scenario: a command that starts a recording produces a pending
/// continuation, and finalization cancels it exactly once before the
/// exit code is returned.
#[tokio::test]
async fn test_recording_continuation_is_cancelled_at_finalization() {
    let video = PendingVideo::new();
    let target = StubTarget::new("STUB-1").with_video(video.clone());
    let reporter = Arc::new(RecordingReporter::new());
    let sink = Arc::new(BufferSink::new());
    let performer = ActionPerformer::new(
        Arc::new(target),
        reporter,
        sink,
        Configuration::default(),
    );
    let driver = ProcessDriver::new(performer);

    let command = Command::new(
        vec![Action::Record(RecordAction::Start(PathBuf::from(
            "/tmp/video.mp4",
        )))],
        Configuration::default(),
    );

    assert_eq!(video.cancellations(), 0);
    let code = driver.run(&command).await;
    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(video.cancellations(), 1);
}

/// A recording stopped within the same command leaves nothing pending,
/// so finalization has nothing to cancel.
#[tokio::test]
async fn test_stopped_recording_leaves_no_pending_work() {
    let device = Arc::new(SimulatedDevice::new(TargetUdid::new("SIM-1")));
    let reporter = Arc::new(RecordingReporter::new());
    let sink = Arc::new(BufferSink::new());
    let performer = ActionPerformer::new(
        device.clone(),
        reporter,
        sink,
        Configuration::default(),
    );
    let driver = ProcessDriver::new(performer);

    let command = Command::new(
        vec![
            Action::Record(RecordAction::Start(PathBuf::from("/tmp/video.mp4"))),
            Action::Record(RecordAction::Stop),
        ],
        Configuration::default(),
    );

    let code = driver.run(&command).await;
    assert_eq!(code, EXIT_SUCCESS);
    assert!(!device.recording_active());
}

/// The simulated device's recording session ends when the driver
/// cancels its continuation, even without an explicit stop.
#[tokio::test]
async fn test_simulated_recording_session_is_torn_down() {
    let device = Arc::new(SimulatedDevice::new(TargetUdid::new("SIM-1")));
    let reporter = Arc::new(RecordingReporter::new());
    let sink = Arc::new(BufferSink::new());
    let performer = ActionPerformer::new(
        device.clone(),
        reporter,
        sink,
        Configuration::default(),
    );
    let driver = ProcessDriver::new(performer);

    let command = Command::new(
        vec![Action::Record(RecordAction::Start(PathBuf::from(
            "/tmp/video.mp4",
        )))],
        Configuration::default(),
    );

    let code = driver.run(&command).await;
    assert_eq!(code, EXIT_SUCCESS);
    assert!(!device.recording_active());
}
