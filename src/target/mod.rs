//! Target abstraction: the device or simulator a command operates on.
//!
//! A [`Target`] exposes its operations through explicit capability
//! accessors. A capability the target does not support is `None`, which
//! lets action resolution decide up front that an action is
//! unimplemented instead of probing at execution time.
//!
//! Operations are async and resolve to a [`Completion`]: either the
//! operation is fully done, or it continues running past its
//! synchronous completion and hands back a [`Continuation`] that the
//! process driver owns until cancelled or naturally finished.

pub mod simulated;

use async_trait::async_trait;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::core::action::StreamConfig;
use crate::core::types::{BundleId, TargetUdid};
use crate::report::{EventName, OutputSink, Subject};

/// Errors surfaced by target operations.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The application is not installed on the target.
    #[error("application '{0}' is not installed")]
    NotInstalled(BundleId),

    /// The application is not currently running.
    #[error("application '{0}' is not running")]
    NotRunning(BundleId),

    /// A recording was requested but none is active.
    #[error("no recording session is active")]
    NoActiveRecording,

    /// A recording was started while one is already active.
    #[error("a recording session is already active")]
    RecordingInProgress,

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other target-side failure.
    #[error("{0}")]
    Other(String),
}

/// The not-yet-awaited future of a target operation.
pub type OperationFuture =
    Pin<Box<dyn Future<Output = Result<Completion, TargetError>> + Send + 'static>>;

/// Resolved value of a target operation.
///
/// Declares up front whether the operation may outlive its synchronous
/// completion; there is no dynamic probing of resolved values.
#[derive(Debug)]
pub enum Completion {
    /// The operation finished entirely.
    Done,
    /// The operation continues running; the handle tracks it.
    Continues(Continuation),
}

/// Handle to a target-side operation that may still be running after
/// the action that spawned it returned.
///
/// Cancellation is push-only: signalling the operation to stop is all
/// a caller can do, and it is best-effort.
#[derive(Debug)]
pub struct Continuation {
    name: EventName,
    completed: Option<JoinHandle<()>>,
    canceller: Option<oneshot::Sender<()>>,
}

impl Continuation {
    /// A continuation for an operation that is still running.
    pub fn pending(name: EventName, completed: JoinHandle<()>, canceller: oneshot::Sender<()>) -> Self {
        Self {
            name,
            completed: Some(completed),
            canceller: Some(canceller),
        }
    }

    /// A continuation for an operation that already finished; there is
    /// nothing left to cancel.
    pub fn finished(name: EventName) -> Self {
        Self {
            name,
            completed: None,
            canceller: None,
        }
    }

    /// The event name of the operation this continuation tracks.
    pub fn name(&self) -> EventName {
        self.name
    }

    /// Whether the underlying operation is still running.
    pub fn is_pending(&self) -> bool {
        self.completed.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Signal the operation to stop and wait for it to wind down.
    ///
    /// Best-effort: an operation that already finished, or that fails
    /// while stopping, is ignored.
    pub async fn cancel(mut self) {
        if let Some(canceller) = self.canceller.take() {
            let _ = canceller.send(());
        }
        if let Some(completed) = self.completed.take() {
            let _ = completed.await;
        }
    }
}

/// Application lifecycle operations.
#[async_trait]
pub trait ApplicationCommands: Send + Sync {
    /// Install the application bundle at the given path.
    async fn install(&self, path: &Path) -> Result<Completion, TargetError>;

    /// Remove an installed application.
    async fn uninstall(&self, bundle_id: &BundleId) -> Result<Completion, TargetError>;

    /// Launch an installed application.
    async fn launch(&self, bundle_id: &BundleId) -> Result<Completion, TargetError>;

    /// Terminate a running application.
    async fn terminate(&self, bundle_id: &BundleId) -> Result<Completion, TargetError>;
}

/// Video recording operations.
#[async_trait]
pub trait VideoCommands: Send + Sync {
    /// Start recording the target's screen to a file.
    ///
    /// Resolves once the session is established; the session itself is
    /// returned as a pending continuation.
    async fn start_recording(&self, path: &Path) -> Result<Completion, TargetError>;

    /// Stop the active recording session.
    async fn stop_recording(&self) -> Result<Completion, TargetError>;
}

/// Frame streaming operations.
#[async_trait]
pub trait StreamCommands: Send + Sync {
    /// Start streaming frames to the given sink.
    ///
    /// Resolves once the stream is established; the stream itself is
    /// returned as a pending continuation.
    async fn start_streaming(
        &self,
        config: &StreamConfig,
        sink: Arc<dyn OutputSink>,
    ) -> Result<Completion, TargetError>;
}

/// A device or simulator under control.
///
/// Capability accessors return `None` when the target cannot perform
/// that family of operations; action resolution turns that into an
/// unimplemented-action failure.
pub trait Target: Send + Sync {
    /// Human-readable name, used in reports and failure messages.
    fn name(&self) -> String;

    /// The target's unique device identifier.
    fn udid(&self) -> &TargetUdid;

    /// A structured description of the target.
    fn describe(&self) -> Subject;

    /// Application lifecycle capability, if supported.
    fn application_commands(&self) -> Option<Arc<dyn ApplicationCommands>> {
        None
    }

    /// Video recording capability, if supported.
    fn video_commands(&self) -> Option<Arc<dyn VideoCommands>> {
        None
    }

    /// Frame streaming capability, if supported.
    fn stream_commands(&self) -> Option<Arc<dyn StreamCommands>> {
        None
    }
}
