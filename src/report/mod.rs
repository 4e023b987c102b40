//! Event reporting for command execution.
//!
//! Every action reports lifecycle events (started/ended) through an
//! [`EventReporter`]. Reporters are infallible by contract: a reporter
//! that cannot write simply drops the event, it never propagates an
//! error back into execution.
//!
//! Two reporters are provided, matching the CLI's two output modes:
//! [`HumanReporter`] for line-oriented human output and
//! [`JsonReporter`] for one JSON object per event.

mod subject;

pub use subject::Subject;

use serde::Serialize;
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Names of reportable events, one per action family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventName {
    Install,
    Uninstall,
    Launch,
    Terminate,
    Record,
    Stream,
    Describe,
    Config,
    Success,
}

impl EventName {
    /// Get the wire/display name of the event.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventName::Install => "install",
            EventName::Uninstall => "uninstall",
            EventName::Launch => "launch",
            EventName::Terminate => "terminate",
            EventName::Record => "record",
            EventName::Stream => "stream",
            EventName::Describe => "describe",
            EventName::Config => "config",
            EventName::Success => "success",
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Phase of a reported event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventPhase {
    /// The action is about to run.
    Started,
    /// The action completed successfully.
    Ended,
    /// A one-shot event with no started/ended pairing.
    Discrete,
}

impl EventPhase {
    /// Get the wire/display name of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventPhase::Started => "started",
            EventPhase::Ended => "ended",
            EventPhase::Discrete => "discrete",
        }
    }
}

impl fmt::Display for EventPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sink for raw output lines.
///
/// Used by the reporters and by print-only runners. Writes are
/// best-effort: a sink that cannot write drops the line.
pub trait OutputSink: Send + Sync {
    /// Write one line of output.
    fn write_line(&self, line: &str);
}

/// Sink writing to the process's standard output.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write_line(&self, line: &str) {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        let _ = writeln!(handle, "{}", line);
    }
}

/// Sink writing to the process's standard error.
pub struct StderrSink;

impl OutputSink for StderrSink {
    fn write_line(&self, line: &str) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        let _ = writeln!(handle, "{}", line);
    }
}

/// Receiver for lifecycle events during command execution.
///
/// Implementations must not fail; logging problems are the reporter's
/// own concern.
pub trait EventReporter: Send + Sync {
    /// Report a lifecycle event with its subject.
    fn report(&self, name: EventName, phase: EventPhase, subject: &Subject);

    /// Report a terminal error message.
    fn report_error(&self, message: &str);
}

/// Reporter producing one human-readable line per event.
///
/// Events and success subjects go to the output sink; errors go to the
/// error sink so a shell caller can separate the two streams.
pub struct HumanReporter {
    out: Arc<dyn OutputSink>,
    err: Arc<dyn OutputSink>,
}

impl HumanReporter {
    /// Create a reporter over the given output and error sinks.
    pub fn new(out: Arc<dyn OutputSink>, err: Arc<dyn OutputSink>) -> Self {
        Self { out, err }
    }

    /// Create a reporter over the process's stdout and stderr.
    pub fn stdio() -> Self {
        Self::new(Arc::new(StdoutSink), Arc::new(StderrSink))
    }
}

impl EventReporter for HumanReporter {
    fn report(&self, name: EventName, phase: EventPhase, subject: &Subject) {
        let line = match phase {
            EventPhase::Discrete => format!("{}: {}", name, subject),
            _ => format!("{} {}: {}", name, phase, subject),
        };
        self.out.write_line(&line);
    }

    fn report_error(&self, message: &str) {
        self.err.write_line(message);
    }
}

/// Reporter producing one JSON object per line, for machine consumers.
///
/// All output, including errors, goes to the single sink so that a
/// consumer can parse a uniform stream.
pub struct JsonReporter {
    sink: Arc<dyn OutputSink>,
}

impl JsonReporter {
    /// Create a reporter over the given sink.
    pub fn new(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }

    fn emit(&self, value: serde_json::Value) {
        self.sink.write_line(&value.to_string());
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

impl EventReporter for JsonReporter {
    fn report(&self, name: EventName, phase: EventPhase, subject: &Subject) {
        self.emit(serde_json::json!({
            "event_name": name,
            "event_phase": phase,
            "subject": subject,
            "timestamp": Self::timestamp(),
        }));
    }

    fn report_error(&self, message: &str) {
        self.emit(serde_json::json!({
            "event_name": "failure",
            "event_phase": "discrete",
            "subject": message,
            "timestamp": Self::timestamp(),
        }));
    }
}
