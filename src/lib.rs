//! devctl - a command-line tool for driving simulated devices.
//!
//! The library is the command-execution core: it resolves parsed
//! actions into runners, executes them in order with lifecycle event
//! reporting, composes their outcomes into a single process result,
//! and cancels any still-running operations before the process exits.

pub mod core;
pub mod driver;
pub mod performer;
pub mod report;
pub mod runner;
pub mod target;
pub mod testing;

pub use crate::core::action::{
    Action, Command, Configuration, CustomAction, OutputFormat, OutputOptions, RecordAction,
    StreamConfig, StreamFormat,
};
pub use crate::core::outcome::{CommandOutcome, CommandResult, Monoid};
pub use crate::core::types::{BundleId, TargetUdid};
pub use crate::driver::{ProcessDriver, EXIT_FAILURE, EXIT_SUCCESS};
pub use crate::performer::ActionPerformer;
pub use crate::report::{
    EventName, EventPhase, EventReporter, HumanReporter, JsonReporter, OutputSink, StderrSink,
    StdoutSink, Subject,
};
pub use crate::runner::{
    BatchRunner, CommandResultRunner, FutureRunner, HelpRunner, PrintRunner, Runner, SimpleRunner,
};
pub use crate::target::simulated::SimulatedDevice;
pub use crate::target::{
    ApplicationCommands, Completion, Continuation, OperationFuture, StreamCommands, Target,
    TargetError, VideoCommands,
};
