//! An in-memory simulated device.
//!
//! Implements every target capability against in-process state, so the
//! CLI and the end-to-end tests have a concrete target that behaves
//! like the real collaborator at the interface: operations are async,
//! failures surface as [`TargetError`], and recording/streaming come
//! back as pending continuations.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tracing::debug;

use crate::core::action::StreamConfig;
use crate::core::types::{BundleId, TargetUdid};
use crate::report::{EventName, OutputSink, Subject};
use crate::target::{
    ApplicationCommands, Completion, Continuation, StreamCommands, Target, TargetError,
    VideoCommands,
};

/// Frame rate used for streams that do not specify one.
const DEFAULT_STREAM_FPS: u32 = 30;

/// Highest frame rate a stream will tick at; one frame per microsecond.
/// Anything above would truncate the interval period to zero.
const MAX_STREAM_FPS: u32 = 1_000_000;

struct RecordingSession {
    stop: Arc<Notify>,
}

struct DeviceState {
    udid: TargetUdid,
    installed: Mutex<BTreeSet<BundleId>>,
    running: Mutex<BTreeSet<BundleId>>,
    // Shared with the recording task so cancellation can clear it.
    recording: Arc<Mutex<Option<RecordingSession>>>,
}

/// A simulated device holding its application and session state in
/// memory.
pub struct SimulatedDevice {
    state: Arc<DeviceState>,
}

impl SimulatedDevice {
    /// Create a device with the given UDID.
    pub fn new(udid: TargetUdid) -> Self {
        Self {
            state: Arc::new(DeviceState {
                udid,
                installed: Mutex::new(BTreeSet::new()),
                running: Mutex::new(BTreeSet::new()),
                recording: Arc::new(Mutex::new(None)),
            }),
        }
    }

    /// Create a device with a freshly generated UDID.
    pub fn create() -> Self {
        Self::new(TargetUdid::generate())
    }

    /// Whether a recording session is currently active.
    pub fn recording_active(&self) -> bool {
        self.state.recording.lock().expect("lock poisoned").is_some()
    }

    /// The bundle identifiers currently installed, in sorted order.
    pub fn installed_applications(&self) -> Vec<BundleId> {
        self.state
            .installed
            .lock()
            .expect("lock poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

impl Target for SimulatedDevice {
    fn name(&self) -> String {
        format!("{} | simulated", self.state.udid)
    }

    fn udid(&self) -> &TargetUdid {
        &self.state.udid
    }

    fn describe(&self) -> Subject {
        let installed: Vec<String> = self
            .installed_applications()
            .iter()
            .map(|b| b.to_string())
            .collect();
        Subject::json(&serde_json::json!({
            "udid": self.state.udid,
            "name": self.name(),
            "state": "booted",
            "installed_applications": installed,
        }))
    }

    fn application_commands(&self) -> Option<Arc<dyn ApplicationCommands>> {
        Some(self.state.clone())
    }

    fn video_commands(&self) -> Option<Arc<dyn VideoCommands>> {
        Some(self.state.clone())
    }

    fn stream_commands(&self) -> Option<Arc<dyn StreamCommands>> {
        Some(self.state.clone())
    }
}

impl DeviceState {
    fn bundle_id_for(path: &Path) -> Result<BundleId, TargetError> {
        path.file_stem()
            .and_then(|stem| stem.to_str())
            .map(BundleId::from)
            .ok_or_else(|| {
                TargetError::Other(format!(
                    "cannot derive a bundle id from '{}'",
                    path.display()
                ))
            })
    }
}

#[async_trait]
impl ApplicationCommands for DeviceState {
    async fn install(&self, path: &Path) -> Result<Completion, TargetError> {
        let bundle_id = Self::bundle_id_for(path)?;
        debug!(bundle_id = %bundle_id, "installing application");
        self.installed
            .lock()
            .expect("lock poisoned")
            .insert(bundle_id);
        Ok(Completion::Done)
    }

    async fn uninstall(&self, bundle_id: &BundleId) -> Result<Completion, TargetError> {
        let removed = self
            .installed
            .lock()
            .expect("lock poisoned")
            .remove(bundle_id);
        if !removed {
            return Err(TargetError::NotInstalled(bundle_id.clone()));
        }
        self.running.lock().expect("lock poisoned").remove(bundle_id);
        debug!(bundle_id = %bundle_id, "uninstalled application");
        Ok(Completion::Done)
    }

    async fn launch(&self, bundle_id: &BundleId) -> Result<Completion, TargetError> {
        if !self
            .installed
            .lock()
            .expect("lock poisoned")
            .contains(bundle_id)
        {
            return Err(TargetError::NotInstalled(bundle_id.clone()));
        }
        self.running
            .lock()
            .expect("lock poisoned")
            .insert(bundle_id.clone());
        debug!(bundle_id = %bundle_id, "launched application");
        Ok(Completion::Done)
    }

    async fn terminate(&self, bundle_id: &BundleId) -> Result<Completion, TargetError> {
        let removed = self.running.lock().expect("lock poisoned").remove(bundle_id);
        if !removed {
            return Err(TargetError::NotRunning(bundle_id.clone()));
        }
        debug!(bundle_id = %bundle_id, "terminated application");
        Ok(Completion::Done)
    }
}

#[async_trait]
impl VideoCommands for DeviceState {
    async fn start_recording(&self, path: &Path) -> Result<Completion, TargetError> {
        let stop = Arc::new(Notify::new());
        {
            let mut recording = self.recording.lock().expect("lock poisoned");
            if recording.is_some() {
                return Err(TargetError::RecordingInProgress);
            }
            *recording = Some(RecordingSession { stop: stop.clone() });
        }
        debug!(file = %path.display(), "recording session established");

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let recording = self.recording.clone();
        let completed = tokio::spawn(async move {
            tokio::select! {
                _ = cancel_rx => {
                    debug!("recording session cancelled");
                }
                _ = stop.notified() => {
                    debug!("recording session stopped");
                }
            }
            recording.lock().expect("lock poisoned").take();
        });

        Ok(Completion::Continues(Continuation::pending(
            EventName::Record,
            completed,
            cancel_tx,
        )))
    }

    async fn stop_recording(&self) -> Result<Completion, TargetError> {
        let session = self
            .recording
            .lock()
            .expect("lock poisoned")
            .take()
            .ok_or(TargetError::NoActiveRecording)?;
        session.stop.notify_one();
        Ok(Completion::Done)
    }
}

#[async_trait]
impl StreamCommands for DeviceState {
    async fn start_streaming(
        &self,
        config: &StreamConfig,
        sink: Arc<dyn OutputSink>,
    ) -> Result<Completion, TargetError> {
        let fps = config
            .fps
            .unwrap_or(DEFAULT_STREAM_FPS)
            .clamp(1, MAX_STREAM_FPS);
        let format = config.format;
        let frame_interval = Duration::from_micros(1_000_000 / u64::from(fps));
        debug!(%format, fps, "stream established");

        let (cancel_tx, mut cancel_rx) = oneshot::channel();
        let completed = tokio::spawn(async move {
            let mut interval = tokio::time::interval(frame_interval);
            let mut frame: u64 = 0;
            loop {
                tokio::select! {
                    _ = &mut cancel_rx => {
                        debug!(frames = frame, "stream cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        sink.write_line(&format!("frame {} ({})", frame, format));
                        frame += 1;
                    }
                }
            }
        });

        Ok(Completion::Continues(Continuation::pending(
            EventName::Stream,
            completed,
            cancel_tx,
        )))
    }
}
