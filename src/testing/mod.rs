//! Testing utilities for users of the devctl library.
//!
//! This module provides test doubles for the execution core:
//!
//! - [`RecordingReporter`]: captures reported events and errors
//! - [`BufferSink`]: captures output lines
//! - [`StubTarget`]: a target with scriptable capabilities
//! - [`counting_continuation`]: a pending continuation that counts
//!   cancellations

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use crate::report::{EventName, EventPhase, EventReporter, OutputSink, Subject};
use crate::target::{
    ApplicationCommands, Completion, Continuation, StreamCommands, Target, TargetError,
    VideoCommands,
};
use crate::core::types::{BundleId, TargetUdid};

/// One event captured by a [`RecordingReporter`].
#[derive(Debug, Clone)]
pub struct RecordedEvent {
    pub name: EventName,
    pub phase: EventPhase,
    pub subject: Subject,
}

/// Reporter that records every event and error it receives.
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<RecordedEvent>>,
    errors: Mutex<Vec<String>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, in order.
    pub fn events(&self) -> Vec<RecordedEvent> {
        self.events.lock().expect("lock poisoned").clone()
    }

    /// All recorded error messages, in order.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("lock poisoned").clone()
    }

    /// The phases recorded for a given event name, in order.
    pub fn phases(&self, name: EventName) -> Vec<EventPhase> {
        self.events()
            .iter()
            .filter(|event| event.name == name)
            .map(|event| event.phase)
            .collect()
    }
}

impl EventReporter for RecordingReporter {
    fn report(&self, name: EventName, phase: EventPhase, subject: &Subject) {
        self.events.lock().expect("lock poisoned").push(RecordedEvent {
            name,
            phase,
            subject: subject.clone(),
        });
    }

    fn report_error(&self, message: &str) {
        self.errors
            .lock()
            .expect("lock poisoned")
            .push(message.to_string());
    }
}

/// Sink that captures written lines in memory.
#[derive(Default)]
pub struct BufferSink {
    lines: Mutex<Vec<String>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All captured lines, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("lock poisoned").clone()
    }
}

impl OutputSink for BufferSink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .expect("lock poisoned")
            .push(line.to_string());
    }
}

/// A target whose capabilities are scripted per test.
///
/// Capabilities default to `None`, which makes the stub useful for
/// unimplemented-action scenarios; attach scripted capability
/// implementations for the rest.
pub struct StubTarget {
    udid: TargetUdid,
    applications: Option<Arc<dyn ApplicationCommands>>,
    video: Option<Arc<dyn VideoCommands>>,
    stream: Option<Arc<dyn StreamCommands>>,
}

impl StubTarget {
    pub fn new(udid: impl Into<TargetUdid>) -> Self {
        Self {
            udid: udid.into(),
            applications: None,
            video: None,
            stream: None,
        }
    }

    pub fn with_applications(mut self, commands: Arc<dyn ApplicationCommands>) -> Self {
        self.applications = Some(commands);
        self
    }

    pub fn with_video(mut self, commands: Arc<dyn VideoCommands>) -> Self {
        self.video = Some(commands);
        self
    }

    pub fn with_stream(mut self, commands: Arc<dyn StreamCommands>) -> Self {
        self.stream = Some(commands);
        self
    }
}

impl Target for StubTarget {
    fn name(&self) -> String {
        format!("{} | stub", self.udid)
    }

    fn udid(&self) -> &TargetUdid {
        &self.udid
    }

    fn describe(&self) -> Subject {
        Subject::json(&serde_json::json!({
            "udid": self.udid,
            "name": self.name(),
        }))
    }

    fn application_commands(&self) -> Option<Arc<dyn ApplicationCommands>> {
        self.applications.clone()
    }

    fn video_commands(&self) -> Option<Arc<dyn VideoCommands>> {
        self.video.clone()
    }

    fn stream_commands(&self) -> Option<Arc<dyn StreamCommands>> {
        self.stream.clone()
    }
}

/// Application commands that log invocations and optionally fail.
#[derive(Default)]
pub struct ScriptedApplications {
    fail_with: Option<String>,
    invocations: Mutex<Vec<String>>,
}

impl ScriptedApplications {
    /// Commands where every operation succeeds.
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Commands where every operation fails with the given message.
    pub fn failing(message: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(message.into()),
            invocations: Mutex::new(Vec::new()),
        })
    }

    /// The operations invoked so far, in order.
    pub fn invocations(&self) -> Vec<String> {
        self.invocations.lock().expect("lock poisoned").clone()
    }

    fn record(&self, invocation: String) -> Result<Completion, TargetError> {
        self.invocations
            .lock()
            .expect("lock poisoned")
            .push(invocation);
        match &self.fail_with {
            Some(message) => Err(TargetError::Other(message.clone())),
            None => Ok(Completion::Done),
        }
    }
}

#[async_trait]
impl ApplicationCommands for ScriptedApplications {
    async fn install(&self, path: &Path) -> Result<Completion, TargetError> {
        self.record(format!("install {}", path.display()))
    }

    async fn uninstall(&self, bundle_id: &BundleId) -> Result<Completion, TargetError> {
        self.record(format!("uninstall {}", bundle_id))
    }

    async fn launch(&self, bundle_id: &BundleId) -> Result<Completion, TargetError> {
        self.record(format!("launch {}", bundle_id))
    }

    async fn terminate(&self, bundle_id: &BundleId) -> Result<Completion, TargetError> {
        self.record(format!("terminate {}", bundle_id))
    }
}

/// Build a pending continuation whose cancellations are counted.
///
/// The returned counter increments once when the continuation's cancel
/// signal reaches the backing task.
pub fn counting_continuation(name: EventName) -> (Continuation, Arc<AtomicUsize>) {
    let cancelled = Arc::new(AtomicUsize::new(0));
    let observed = cancelled.clone();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let completed = tokio::spawn(async move {
        if cancel_rx.await.is_ok() {
            observed.fetch_add(1, Ordering::SeqCst);
        }
    });
    (
        Continuation::pending(name, completed, cancel_tx),
        cancelled,
    )
}

/// Video commands whose recording sessions stay pending until
/// cancelled, counting the cancellations.
#[derive(Default)]
pub struct PendingVideo {
    cancelled: Arc<AtomicUsize>,
}

impl PendingVideo {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// How many recording sessions have been cancelled.
    pub fn cancellations(&self) -> usize {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoCommands for PendingVideo {
    async fn start_recording(&self, _path: &Path) -> Result<Completion, TargetError> {
        let observed = self.cancelled.clone();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let completed = tokio::spawn(async move {
            if cancel_rx.await.is_ok() {
                observed.fetch_add(1, Ordering::SeqCst);
            }
        });
        Ok(Completion::Continues(Continuation::pending(
            EventName::Record,
            completed,
            cancel_tx,
        )))
    }

    async fn stop_recording(&self) -> Result<Completion, TargetError> {
        Ok(Completion::Done)
    }
}
