//! Top-level process driver.
//!
//! Executes a resolved runner and finalizes the process: every
//! continuation still pending after execution is cancelled before the
//! exit status is returned, so the CLI never hands control back to its
//! caller with orphaned background work.

use tracing::debug;

use crate::core::action::Command;
use crate::core::outcome::{CommandOutcome, CommandResult};
use crate::performer::ActionPerformer;
use crate::report::{EventName, EventPhase};

/// Exit status of a successful invocation.
pub const EXIT_SUCCESS: i32 = 0;
/// Exit status of a failed invocation.
pub const EXIT_FAILURE: i32 = 1;

/// Drives one command from execution through finalization.
pub struct ProcessDriver {
    performer: ActionPerformer,
}

impl ProcessDriver {
    pub fn new(performer: ActionPerformer) -> Self {
        Self { performer }
    }

    /// Execute the command and finalize, returning the process exit
    /// status.
    pub async fn run(&self, command: &Command) -> i32 {
        let runner = self.performer.command_runner(command);
        let result = runner.run().await;
        self.finalize(result).await
    }

    /// Cancel leftover continuations and report the terminal outcome.
    ///
    /// Cancellation is best-effort: a continuation that fails while
    /// stopping is ignored, the process is exiting regardless.
    pub async fn finalize(&self, result: CommandResult) -> i32 {
        for continuation in result.continuations {
            if continuation.is_pending() {
                debug!(operation = %continuation.name(), "cancelling pending continuation");
                continuation.cancel().await;
            }
        }

        let reporter = self.performer.reporter();
        match result.outcome {
            CommandOutcome::Success(subject) => {
                if let Some(subject) = subject {
                    reporter.report(EventName::Success, EventPhase::Discrete, &subject);
                }
                EXIT_SUCCESS
            }
            CommandOutcome::Failure(message) => {
                reporter.report_error(&message);
                EXIT_FAILURE
            }
        }
    }
}
