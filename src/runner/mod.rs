//! Polymorphic executable units.
//!
//! A [`Runner`] is anything that can run and produce a
//! [`CommandResult`]. The set of variants is closed and matched
//! exhaustively at resolution time, so a new action kind forces a
//! compile-time decision here.
//!
//! Nothing escapes `run()` as an error: every failure inside a runner
//! is converted to [`CommandOutcome::Failure`] locally.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::core::action::Action;
use crate::core::outcome::{CommandOutcome, CommandResult, Monoid};
use crate::report::{EventName, EventPhase, EventReporter, OutputSink, Subject};
use crate::target::{Completion, OperationFuture, Target, TargetError};

/// A synchronous, fallible, no-result operation.
pub type SimpleAction = Box<dyn FnOnce() -> Result<(), TargetError> + Send>;

/// An executable unit resolved from an action.
pub enum Runner {
    /// A synchronous action with start/end reporting.
    Simple(SimpleRunner),
    /// An awaitable operation with start/end reporting.
    Future(FutureRunner),
    /// Prints an action instead of executing it.
    Print(PrintRunner),
    /// Prints help text.
    Help(HelpRunner),
    /// Returns a precomputed result.
    Fixed(CommandResultRunner),
    /// Runs a sequence of runners, aggregating their results.
    Batch(BatchRunner),
}

impl Runner {
    /// Execute the runner, yielding a result.
    ///
    /// Boxed so that a batch can contain further batches.
    pub fn run(self) -> Pin<Box<dyn Future<Output = CommandResult> + Send>> {
        Box::pin(async move {
            match self {
                Runner::Simple(runner) => runner.run(),
                Runner::Future(runner) => runner.run().await,
                Runner::Print(runner) => runner.run(),
                Runner::Help(runner) => runner.run(),
                Runner::Fixed(runner) => runner.run(),
                Runner::Batch(runner) => runner.run().await,
            }
        })
    }
}

/// Runs a synchronous operation that may fail.
///
/// Reports a started event before invocation and an ended event after
/// successful completion; on failure nothing further is reported and
/// the error description becomes the outcome. Never produces
/// continuations.
pub struct SimpleRunner {
    reporter: Arc<dyn EventReporter>,
    name: Option<EventName>,
    subject: Subject,
    action: SimpleAction,
}

impl SimpleRunner {
    pub fn new(
        reporter: Arc<dyn EventReporter>,
        name: Option<EventName>,
        subject: Subject,
        action: SimpleAction,
    ) -> Self {
        Self {
            reporter,
            name,
            subject,
            action,
        }
    }

    fn run(self) -> CommandResult {
        if let Some(name) = self.name {
            self.reporter
                .report(name, EventPhase::Started, &self.subject);
        }
        match (self.action)() {
            Ok(()) => {
                if let Some(name) = self.name {
                    self.reporter.report(name, EventPhase::Ended, &self.subject);
                }
                CommandResult::success(None)
            }
            Err(err) => CommandResult::failure(err.to_string()),
        }
    }
}

/// Runs an awaitable target operation, blocking the sequence until it
/// resolves.
///
/// Identical reporting contract to [`SimpleRunner`]. If the resolved
/// value declares that the operation continues running, its handle is
/// captured into the result's continuation list; a handle that already
/// finished is discarded.
pub struct FutureRunner {
    reporter: Arc<dyn EventReporter>,
    name: Option<EventName>,
    subject: Subject,
    future: OperationFuture,
}

impl FutureRunner {
    pub fn new(
        reporter: Arc<dyn EventReporter>,
        name: Option<EventName>,
        subject: Subject,
        future: OperationFuture,
    ) -> Self {
        Self {
            reporter,
            name,
            subject,
            future,
        }
    }

    async fn run(self) -> CommandResult {
        if let Some(name) = self.name {
            self.reporter
                .report(name, EventPhase::Started, &self.subject);
        }
        match self.future.await {
            Ok(completion) => {
                if let Some(name) = self.name {
                    self.reporter.report(name, EventPhase::Ended, &self.subject);
                }
                let continuations = match completion {
                    Completion::Continues(continuation) if continuation.is_pending() => {
                        vec![continuation]
                    }
                    _ => Vec::new(),
                };
                CommandResult {
                    outcome: CommandOutcome::Success(None),
                    continuations,
                }
            }
            Err(err) => CommandResult::failure(err.to_string()),
        }
    }
}

/// Writes a printable representation of an action to the output sink.
pub struct PrintRunner {
    sink: Arc<dyn OutputSink>,
    action: Action,
}

impl PrintRunner {
    pub fn new(sink: Arc<dyn OutputSink>, action: Action) -> Self {
        Self { sink, action }
    }

    fn run(self) -> CommandResult {
        match self.action.printable() {
            Some(line) => {
                self.sink.write_line(&line);
                CommandResult::success(None)
            }
            None => CommandResult::failure(format!(
                "Action {} not printable",
                self.action.event_name()
            )),
        }
    }
}

/// Writes help text to the output sink.
pub struct HelpRunner {
    sink: Arc<dyn OutputSink>,
    text: String,
}

impl HelpRunner {
    pub fn new(sink: Arc<dyn OutputSink>, text: impl Into<String>) -> Self {
        Self {
            sink,
            text: text.into(),
        }
    }

    fn run(self) -> CommandResult {
        self.sink.write_line(&self.text);
        CommandResult::success(None)
    }
}

/// Wraps a precomputed result; `run()` is a pure return.
pub struct CommandResultRunner {
    result: CommandResult,
}

impl CommandResultRunner {
    pub fn new(result: CommandResult) -> Self {
        Self { result }
    }

    /// The short-circuit runner for an action the target cannot
    /// perform.
    pub fn unimplemented(action: &Action, target: &dyn Target) -> Self {
        let message = format!(
            "Action {} {} is unimplemented for target {}",
            action.event_name(),
            action.subject(),
            target.name()
        );
        Self::new(CommandResult::failure(message))
    }

    fn run(self) -> CommandResult {
        self.result
    }
}

/// Runs a sequence of runners strictly in order.
///
/// There is no short-circuiting: every runner in the batch executes
/// regardless of prior failures, so a multi-action command reports
/// every failure, and the final result is the left-to-right fold of
/// the individual results. An empty batch folds to the identity.
pub struct BatchRunner {
    runners: Vec<Runner>,
}

impl BatchRunner {
    pub fn new(runners: Vec<Runner>) -> Self {
        Self { runners }
    }

    async fn run(self) -> CommandResult {
        let mut result = CommandResult::identity();
        for runner in self.runners {
            result = result.combine(runner.run().await);
        }
        result
    }
}
