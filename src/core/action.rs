//! Actions and commands: the immutable input to one CLI invocation.
//!
//! A [`Command`] is an ordered sequence of [`Action`]s plus a
//! [`Configuration`]. Both are built once from the parsed command line
//! and are read-only during execution.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::core::types::{BundleId, TargetUdid};
use crate::report::{EventName, Subject};
use crate::target::{OperationFuture, Target};

/// One requested unit of work within a command.
#[derive(Debug, Clone)]
pub enum Action {
    /// Install the application bundle at a path.
    Install { path: PathBuf },
    /// Remove an installed application.
    Uninstall { bundle_id: BundleId },
    /// Launch an installed application.
    Launch { bundle_id: BundleId },
    /// Terminate a running application.
    Terminate { bundle_id: BundleId },
    /// Start or stop screen recording.
    Record(RecordAction),
    /// Start streaming frames.
    Stream(StreamConfig),
    /// Report a description of the target.
    Describe,
    /// An arbitrary asynchronous operation against the target.
    Custom(Arc<dyn CustomAction>),
}

/// The two halves of the recording lifecycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordAction {
    /// Begin recording to the given file.
    Start(PathBuf),
    /// End the active recording.
    Stop,
}

/// Pixel format of a frame stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    Bgra,
    H264,
    Mjpeg,
}

impl FromStr for StreamFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bgra" => Ok(StreamFormat::Bgra),
            "h264" => Ok(StreamFormat::H264),
            "mjpeg" => Ok(StreamFormat::Mjpeg),
            other => Err(format!("unknown stream format '{}'", other)),
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StreamFormat::Bgra => "bgra",
            StreamFormat::H264 => "h264",
            StreamFormat::Mjpeg => "mjpeg",
        };
        write!(f, "{}", s)
    }
}

/// Configuration of a frame stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreamConfig {
    pub format: StreamFormat,
    /// Frames per second; `None` streams every frame the target produces.
    pub fps: Option<u32>,
}

impl StreamConfig {
    /// The reportable subject describing this stream.
    pub fn subject(&self) -> Subject {
        Subject::json(self)
    }
}

/// A user-supplied asynchronous operation against the target.
///
/// This is the extension point for operations the closed [`Action`]
/// set does not name: the action carries its own event name, subject
/// and future.
pub trait CustomAction: fmt::Debug + Send + Sync {
    /// Event name reported around the operation.
    fn event_name(&self) -> EventName;

    /// Subject reported around the operation.
    fn subject(&self) -> Subject;

    /// Start the operation against the target.
    fn run(&self, target: Arc<dyn Target>) -> OperationFuture;
}

impl Action {
    /// The event name this action reports under.
    pub fn event_name(&self) -> EventName {
        match self {
            Action::Install { .. } => EventName::Install,
            Action::Uninstall { .. } => EventName::Uninstall,
            Action::Launch { .. } => EventName::Launch,
            Action::Terminate { .. } => EventName::Terminate,
            Action::Record(_) => EventName::Record,
            Action::Stream(_) => EventName::Stream,
            Action::Describe => EventName::Describe,
            Action::Custom(custom) => custom.event_name(),
        }
    }

    /// The subject this action reports with.
    pub fn subject(&self) -> Subject {
        match self {
            Action::Install { path } => Subject::from(path.display().to_string()),
            Action::Uninstall { bundle_id }
            | Action::Launch { bundle_id }
            | Action::Terminate { bundle_id } => Subject::from(bundle_id.to_string()),
            Action::Record(RecordAction::Start(path)) => {
                Subject::from(format!("start {}", path.display()))
            }
            Action::Record(RecordAction::Stop) => Subject::from("stop"),
            Action::Stream(config) => config.subject(),
            Action::Describe => Subject::from("describe"),
            Action::Custom(custom) => custom.subject(),
        }
    }

    /// A printable form of the action, if it has one.
    ///
    /// Custom actions wrap arbitrary futures and have no stable
    /// printable representation.
    pub fn printable(&self) -> Option<String> {
        match self {
            Action::Install { path } => Some(format!("install {}", path.display())),
            Action::Uninstall { bundle_id } => Some(format!("uninstall {}", bundle_id)),
            Action::Launch { bundle_id } => Some(format!("launch {}", bundle_id)),
            Action::Terminate { bundle_id } => Some(format!("terminate {}", bundle_id)),
            Action::Record(RecordAction::Start(path)) => {
                Some(format!("record start {}", path.display()))
            }
            Action::Record(RecordAction::Stop) => Some("record stop".to_string()),
            Action::Stream(config) => Some(format!("stream {}", config.subject())),
            Action::Describe => Some("describe".to_string()),
            Action::Custom(_) => None,
        }
    }
}

/// Output format selected for the invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Output options for the invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub verbose: bool,
}

/// Configuration of one CLI invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Configuration {
    pub output: OutputOptions,
    /// Target selection; `None` means a freshly created simulated target.
    pub udid: Option<TargetUdid>,
    /// Print resolved actions instead of executing them.
    pub print_only: bool,
}

impl Configuration {
    /// The reportable subject describing this configuration.
    pub fn subject(&self) -> Subject {
        Subject::json(self)
    }
}

/// An ordered sequence of actions plus configuration: the unit of one
/// CLI invocation.
#[derive(Debug, Clone)]
pub struct Command {
    actions: Vec<Action>,
    configuration: Configuration,
}

impl Command {
    /// Create a command from its actions and configuration.
    pub fn new(actions: Vec<Action>, configuration: Configuration) -> Self {
        Self {
            actions,
            configuration,
        }
    }

    /// The actions to execute, in order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// The configuration of the invocation.
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }
}
