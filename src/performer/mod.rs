//! Action resolution: mapping actions to runners.
//!
//! [`ActionPerformer`] is a total function over the action set: every
//! action resolves to some runner. An action the current target has no
//! capability for resolves to a runner producing an unimplemented
//! failure; resolution itself never fails.

use std::sync::Arc;

use crate::core::action::{Action, Command, Configuration, RecordAction};
use crate::report::{EventName, EventReporter, OutputSink, Subject};
use crate::runner::{
    BatchRunner, CommandResultRunner, FutureRunner, PrintRunner, Runner, SimpleRunner,
};
use crate::target::{OperationFuture, Target, TargetError};

/// Resolves actions into runners for a given target, reporter and
/// output sink.
pub struct ActionPerformer {
    target: Arc<dyn Target>,
    reporter: Arc<dyn EventReporter>,
    sink: Arc<dyn OutputSink>,
    configuration: Configuration,
}

impl ActionPerformer {
    pub fn new(
        target: Arc<dyn Target>,
        reporter: Arc<dyn EventReporter>,
        sink: Arc<dyn OutputSink>,
        configuration: Configuration,
    ) -> Self {
        Self {
            target,
            reporter,
            sink,
            configuration,
        }
    }

    /// The reporter this performer resolves runners against.
    pub fn reporter(&self) -> Arc<dyn EventReporter> {
        self.reporter.clone()
    }

    /// Resolve a whole command into a single batch runner over its
    /// actions, in order.
    pub fn command_runner(&self, command: &Command) -> Runner {
        let runners = command
            .actions()
            .iter()
            .map(|action| self.runner(action))
            .collect();
        Runner::Batch(BatchRunner::new(runners))
    }

    /// Resolve one action to its runner.
    pub fn runner(&self, action: &Action) -> Runner {
        if self.configuration.print_only {
            return Runner::Print(PrintRunner::new(self.sink.clone(), action.clone()));
        }

        match action {
            Action::Install { path } => match self.target.application_commands() {
                Some(commands) => {
                    let path = path.clone();
                    self.future_runner(
                        Some(EventName::Install),
                        action.subject(),
                        Box::pin(async move { commands.install(&path).await }),
                    )
                }
                None => self.unimplemented(action),
            },
            Action::Uninstall { bundle_id } => match self.target.application_commands() {
                Some(commands) => {
                    let bundle_id = bundle_id.clone();
                    self.future_runner(
                        Some(EventName::Uninstall),
                        action.subject(),
                        Box::pin(async move { commands.uninstall(&bundle_id).await }),
                    )
                }
                None => self.unimplemented(action),
            },
            Action::Launch { bundle_id } => match self.target.application_commands() {
                Some(commands) => {
                    let bundle_id = bundle_id.clone();
                    self.future_runner(
                        Some(EventName::Launch),
                        action.subject(),
                        Box::pin(async move { commands.launch(&bundle_id).await }),
                    )
                }
                None => self.unimplemented(action),
            },
            Action::Terminate { bundle_id } => match self.target.application_commands() {
                Some(commands) => {
                    let bundle_id = bundle_id.clone();
                    self.future_runner(
                        Some(EventName::Terminate),
                        action.subject(),
                        Box::pin(async move { commands.terminate(&bundle_id).await }),
                    )
                }
                None => self.unimplemented(action),
            },
            Action::Record(RecordAction::Start(path)) => match self.target.video_commands() {
                Some(commands) => {
                    let path = path.clone();
                    self.future_runner(
                        None,
                        action.subject(),
                        Box::pin(async move { commands.start_recording(&path).await }),
                    )
                }
                None => self.unimplemented(action),
            },
            Action::Record(RecordAction::Stop) => match self.target.video_commands() {
                Some(commands) => self.future_runner(
                    None,
                    action.subject(),
                    Box::pin(async move { commands.stop_recording().await }),
                ),
                None => self.unimplemented(action),
            },
            Action::Stream(config) => match self.target.stream_commands() {
                Some(commands) => {
                    let config = config.clone();
                    let sink = self.sink.clone();
                    self.future_runner(
                        Some(EventName::Stream),
                        action.subject(),
                        Box::pin(async move { commands.start_streaming(&config, sink).await }),
                    )
                }
                None => self.unimplemented(action),
            },
            Action::Describe => {
                let target = self.target.clone();
                let sink = self.sink.clone();
                Runner::Simple(SimpleRunner::new(
                    self.reporter.clone(),
                    Some(EventName::Describe),
                    Subject::from(target.name()),
                    Box::new(move || {
                        let description = serde_json::to_string(&target.describe())
                            .map_err(|err| TargetError::Other(err.to_string()))?;
                        sink.write_line(&description);
                        Ok(())
                    }),
                ))
            }
            Action::Custom(custom) => self.future_runner(
                Some(custom.event_name()),
                custom.subject(),
                custom.run(self.target.clone()),
            ),
        }
    }

    fn future_runner(
        &self,
        name: Option<EventName>,
        subject: Subject,
        future: OperationFuture,
    ) -> Runner {
        Runner::Future(FutureRunner::new(
            self.reporter.clone(),
            name,
            subject,
            future,
        ))
    }

    fn unimplemented(&self, action: &Action) -> Runner {
        Runner::Fixed(CommandResultRunner::unimplemented(action, &*self.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::action::CustomAction;
    use crate::core::outcome::CommandOutcome;
    use crate::core::types::{BundleId, TargetUdid};
    use crate::report::EventPhase;
    use crate::target::simulated::SimulatedDevice;
    use crate::target::Completion;
    use crate::testing::{BufferSink, RecordingReporter, StubTarget};
    use std::path::PathBuf;

    /// A custom operation that only reads the target's description.
    #[derive(Debug)]
    struct Diagnose;

    impl CustomAction for Diagnose {
        fn event_name(&self) -> EventName {
            EventName::Describe
        }

        fn subject(&self) -> Subject {
            Subject::from("diagnose")
        }

        fn run(&self, target: Arc<dyn Target>) -> OperationFuture {
            Box::pin(async move {
                let _ = target.describe();
                Ok(Completion::Done)
            })
        }
    }

    fn performer_for(target: Arc<dyn Target>) -> (ActionPerformer, Arc<RecordingReporter>, Arc<BufferSink>) {
        let reporter = Arc::new(RecordingReporter::new());
        let sink = Arc::new(BufferSink::new());
        let performer = ActionPerformer::new(
            target,
            reporter.clone(),
            sink.clone(),
            Configuration::default(),
        );
        (performer, reporter, sink)
    }

    #[tokio::test]
    async fn test_uninstall_resolves_and_reports() {
        let device = SimulatedDevice::new(TargetUdid::new("SIM-1"));
        device
            .application_commands()
            .unwrap()
            .install(&PathBuf::from("/tmp/com.example.app.ipa"))
            .await
            .unwrap();

        let (performer, reporter, _sink) = performer_for(Arc::new(device));
        let action = Action::Uninstall {
            bundle_id: BundleId::new("com.example.app"),
        };

        let result = performer.runner(&action).run().await;
        assert!(result.outcome.is_success());
        assert_eq!(
            reporter.phases(EventName::Uninstall),
            vec![EventPhase::Started, EventPhase::Ended]
        );
    }

    #[tokio::test]
    async fn test_missing_capability_resolves_to_unimplemented_failure() {
        // A stub with no video capability cannot record.
        let target = StubTarget::new("STUB-1");
        let (performer, _reporter, _sink) = performer_for(Arc::new(target));

        let action = Action::Record(RecordAction::Start(PathBuf::from("/tmp/video.mp4")));
        let result = performer.runner(&action).run().await;

        assert_eq!(
            result.outcome,
            CommandOutcome::Failure(
                "Action record start /tmp/video.mp4 is unimplemented for target STUB-1 | stub"
                    .to_string()
            )
        );
    }

    #[tokio::test]
    async fn test_print_only_configuration_prints_instead_of_executing() {
        let device = Arc::new(SimulatedDevice::new(TargetUdid::new("SIM-1")));
        let reporter = Arc::new(RecordingReporter::new());
        let sink = Arc::new(BufferSink::new());
        let configuration = Configuration {
            print_only: true,
            ..Configuration::default()
        };
        let performer = ActionPerformer::new(device.clone(), reporter, sink.clone(), configuration);

        let action = Action::Terminate {
            bundle_id: BundleId::new("com.example.app"),
        };
        let result = performer.runner(&action).run().await;

        assert!(result.outcome.is_success());
        assert_eq!(sink.lines(), vec!["terminate com.example.app"]);
        // Nothing was executed against the device.
        assert!(device.installed_applications().is_empty());
    }

    #[tokio::test]
    async fn test_describe_writes_target_description() {
        let device = SimulatedDevice::new(TargetUdid::new("SIM-1"));
        let (performer, reporter, sink) = performer_for(Arc::new(device));

        let result = performer.runner(&Action::Describe).run().await;
        assert!(result.outcome.is_success());
        assert_eq!(
            reporter.phases(EventName::Describe),
            vec![EventPhase::Started, EventPhase::Ended]
        );

        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        let description: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(description["udid"], "SIM-1");
    }

    #[tokio::test]
    async fn test_custom_action_resolves_to_named_runner() {
        let device = SimulatedDevice::new(TargetUdid::new("SIM-1"));
        let (performer, reporter, _sink) = performer_for(Arc::new(device));

        let action = Action::Custom(Arc::new(Diagnose));
        let result = performer.runner(&action).run().await;

        assert!(result.outcome.is_success());
        assert_eq!(
            reporter.phases(EventName::Describe),
            vec![EventPhase::Started, EventPhase::Ended]
        );
    }

    #[tokio::test]
    async fn test_print_only_custom_action_is_not_printable() {
        let device = Arc::new(SimulatedDevice::new(TargetUdid::new("SIM-1")));
        let reporter = Arc::new(RecordingReporter::new());
        let sink = Arc::new(BufferSink::new());
        let configuration = Configuration {
            print_only: true,
            ..Configuration::default()
        };
        let performer = ActionPerformer::new(device, reporter, sink.clone(), configuration);

        let result = performer
            .runner(&Action::Custom(Arc::new(Diagnose)))
            .run()
            .await;

        assert_eq!(
            result.outcome,
            CommandOutcome::Failure("Action describe not printable".to_string())
        );
        assert!(sink.lines().is_empty());
    }

    #[tokio::test]
    async fn test_command_runner_executes_actions_in_order() {
        let device = SimulatedDevice::new(TargetUdid::new("SIM-1"));
        let (performer, reporter, _sink) = performer_for(Arc::new(device));

        let command = Command::new(
            vec![
                Action::Install {
                    path: PathBuf::from("/tmp/com.example.app.ipa"),
                },
                Action::Launch {
                    bundle_id: BundleId::new("com.example.app"),
                },
            ],
            Configuration::default(),
        );

        let result = performer.command_runner(&command).run().await;
        assert!(result.outcome.is_success());

        let names: Vec<EventName> = reporter.events().iter().map(|e| e.name).collect();
        assert_eq!(
            names,
            vec![
                EventName::Install,
                EventName::Install,
                EventName::Launch,
                EventName::Launch,
            ]
        );
    }
}
