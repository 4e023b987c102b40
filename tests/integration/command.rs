//! End-to-end command execution scenarios.

use devctl::testing::{BufferSink, RecordingReporter, ScriptedApplications, StubTarget};
use devctl::{
    Action, ActionPerformer, BundleId, Command, CommandOutcome, Configuration, EventName,
    EventPhase, ProcessDriver, RecordAction, SimulatedDevice, Target, TargetUdid, EXIT_FAILURE,
    EXIT_SUCCESS,
};
use std::path::PathBuf;
use std::sync::Arc;

fn driver_for(
    target: Arc<dyn Target>,
) -> (ProcessDriver, Arc<RecordingReporter>, Arc<BufferSink>) {
    let reporter = Arc::new(RecordingReporter::new());
    let sink = Arc::new(BufferSink::new());
    let performer = ActionPerformer::new(
        target,
        reporter.clone(),
        sink.clone(),
        Configuration::default(),
    );
    (ProcessDriver::new(performer), reporter, sink)
}

/// Scenario: a single uninstall action that succeeds yields exit code 0
/// and started/ended events for "uninstall".
#[tokio::test]
async fn test_successful_uninstall_reports_events_and_exits_zero() {
    let device = SimulatedDevice::new(TargetUdid::new("SIM-1"));
    device
        .application_commands()
        .unwrap()
        .install(&PathBuf::from("/tmp/com.example.app.ipa"))
        .await
        .unwrap();

    let (driver, reporter, _sink) = driver_for(Arc::new(device));
    let command = Command::new(
        vec![Action::Uninstall {
            bundle_id: BundleId::new("com.example.app"),
        }],
        Configuration::default(),
    );

    let code = driver.run(&command).await;
    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(
        reporter.phases(EventName::Uninstall),
        vec![EventPhase::Started, EventPhase::Ended]
    );
    assert!(reporter.errors().is_empty());
}

/// Scenario: an action the target has no capability for fails with the
/// unimplemented message and exit code 1.
#[tokio::test]
async fn test_unimplemented_action_exits_nonzero_with_message() {
    let target = StubTarget::new("STUB-1");
    let (driver, reporter, _sink) = driver_for(Arc::new(target));

    let command = Command::new(
        vec![Action::Record(RecordAction::Start(PathBuf::from(
            "/tmp/video.mp4",
        )))],
        Configuration::default(),
    );

    let code = driver.run(&command).await;
    assert_eq!(code, EXIT_FAILURE);
    assert_eq!(
        reporter.errors(),
        vec!["Action record start /tmp/video.mp4 is unimplemented for target STUB-1 | stub"]
    );
}

/// A failing action does not abort its siblings: every action in the
/// command runs, and the terminal error enumerates every failure in
/// order.
#[tokio::test]
async fn test_multi_action_command_runs_to_completion_and_reports_all_failures() {
    let device = SimulatedDevice::new(TargetUdid::new("SIM-1"));
    let (driver, reporter, _sink) = driver_for(Arc::new(device));

    // Install succeeds; the two uninstalls of unknown bundles fail;
    // the launch of the installed bundle still runs and succeeds.
    let command = Command::new(
        vec![
            Action::Install {
                path: PathBuf::from("/tmp/com.example.app.ipa"),
            },
            Action::Uninstall {
                bundle_id: BundleId::new("com.example.ghost"),
            },
            Action::Launch {
                bundle_id: BundleId::new("com.example.app"),
            },
            Action::Uninstall {
                bundle_id: BundleId::new("com.example.phantom"),
            },
        ],
        Configuration::default(),
    );

    let code = driver.run(&command).await;
    assert_eq!(code, EXIT_FAILURE);
    assert_eq!(
        reporter.errors(),
        vec![
            "application 'com.example.ghost' is not installed\n\
             application 'com.example.phantom' is not installed"
        ]
    );
    // The launch between the failures ran and reported both phases.
    assert_eq!(
        reporter.phases(EventName::Launch),
        vec![EventPhase::Started, EventPhase::Ended]
    );
}

/// The scripted target records each operation exactly once and in
/// command order.
#[tokio::test]
async fn test_actions_invoke_target_operations_in_order() {
    let applications = ScriptedApplications::succeeding();
    let target =
        StubTarget::new("STUB-1").with_applications(applications.clone());
    let (driver, _reporter, _sink) = driver_for(Arc::new(target));

    let command = Command::new(
        vec![
            Action::Install {
                path: PathBuf::from("/tmp/com.example.app.ipa"),
            },
            Action::Launch {
                bundle_id: BundleId::new("com.example.app"),
            },
            Action::Terminate {
                bundle_id: BundleId::new("com.example.app"),
            },
        ],
        Configuration::default(),
    );

    let code = driver.run(&command).await;
    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(
        applications.invocations(),
        vec![
            "install /tmp/com.example.app.ipa",
            "launch com.example.app",
            "terminate com.example.app",
        ]
    );
}

/// Print-only commands resolve every action to its printable form and
/// never touch the target.
#[tokio::test]
async fn test_print_only_command_prints_actions() {
    let applications = ScriptedApplications::succeeding();
    let target =
        StubTarget::new("STUB-1").with_applications(applications.clone());
    let reporter = Arc::new(RecordingReporter::new());
    let sink = Arc::new(BufferSink::new());
    let configuration = Configuration {
        print_only: true,
        ..Configuration::default()
    };
    let performer = ActionPerformer::new(
        Arc::new(target),
        reporter,
        sink.clone(),
        configuration.clone(),
    );
    let driver = ProcessDriver::new(performer);

    let command = Command::new(
        vec![
            Action::Install {
                path: PathBuf::from("/tmp/com.example.app.ipa"),
            },
            Action::Uninstall {
                bundle_id: BundleId::new("com.example.app"),
            },
        ],
        configuration,
    );

    let code = driver.run(&command).await;
    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(
        sink.lines(),
        vec![
            "install /tmp/com.example.app.ipa",
            "uninstall com.example.app",
        ]
    );
    assert!(applications.invocations().is_empty());
}

/// A command with no actions folds to the identity outcome.
#[tokio::test]
async fn test_empty_command_succeeds() {
    let (driver, reporter, _sink) = driver_for(Arc::new(StubTarget::new("STUB-1")));
    let command = Command::new(Vec::new(), Configuration::default());

    let code = driver.run(&command).await;
    assert_eq!(code, EXIT_SUCCESS);
    assert!(reporter.events().is_empty());
    assert!(reporter.errors().is_empty());
}

/// Outcome check on the runner level: a failing target surfaces its
/// error description as the failure message.
#[tokio::test]
async fn test_target_error_description_becomes_failure_message() {
    let applications = ScriptedApplications::failing("device wedged");
    let target =
        StubTarget::new("STUB-1").with_applications(applications);
    let reporter = Arc::new(RecordingReporter::new());
    let sink = Arc::new(BufferSink::new());
    let performer = ActionPerformer::new(
        Arc::new(target),
        reporter,
        sink,
        Configuration::default(),
    );

    let command = Command::new(
        vec![Action::Terminate {
            bundle_id: BundleId::new("com.example.app"),
        }],
        Configuration::default(),
    );

    let result = performer.command_runner(&command).run().await;
    assert_eq!(
        result.outcome,
        CommandOutcome::Failure("device wedged".to_string())
    );
}
