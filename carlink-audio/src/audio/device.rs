//! Device thread ownership for cpal streams
//!
//! cpal streams are not `Send`, so each one is built, played and dropped on
//! a dedicated thread. Starting and stopping never wait on that thread:
//! `spawn` returns as soon as the thread exists, and `stop` clears the
//! running flag and detaches it. Whether the device actually opened is
//! reported through `DeviceStatus`.

use crate::error::{Error, Result};
use cpal::traits::StreamTrait;
use cpal::Stream;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, error, warn};

/// How often the device thread checks the running flag
const KEEPALIVE_POLL: Duration = Duration::from_millis(50);

/// Lifecycle of one device stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceStatus {
    /// No thread running
    Stopped,
    /// Thread spawned, stream not built yet
    Opening,
    /// Stream built and playing
    Running,
    /// Stream could not be opened; the thread has exited
    Failed,
}

impl DeviceStatus {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => DeviceStatus::Opening,
            2 => DeviceStatus::Running,
            3 => DeviceStatus::Failed,
            _ => DeviceStatus::Stopped,
        }
    }
}

/// Handle to the thread owning one cpal stream
pub struct DeviceThread {
    name: String,
    running: Arc<AtomicBool>,
    status: Arc<AtomicU8>,
    handle: Option<JoinHandle<()>>,
}

impl DeviceThread {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            running: Arc::new(AtomicBool::new(false)),
            status: Arc::new(AtomicU8::new(DeviceStatus::Stopped as u8)),
            handle: None,
        }
    }

    /// Spawn the device thread, which builds its stream with `open`
    ///
    /// Returns once the thread exists. Open failures are logged on the
    /// device thread and show up as `DeviceStatus::Failed`.
    pub fn spawn<F>(&mut self, open: F) -> Result<()>
    where
        F: FnOnce() -> Result<Stream> + Send + 'static,
    {
        // Fresh flags per thread, so a detached predecessor can't be revived
        let running = Arc::new(AtomicBool::new(true));
        let status = Arc::new(AtomicU8::new(DeviceStatus::Opening as u8));

        let thread_running = Arc::clone(&running);
        let thread_status = Arc::clone(&status);
        let name = self.name.clone();

        let handle = std::thread::Builder::new()
            .name(self.name.clone())
            .spawn(move || run_device_thread(&name, open, &thread_running, &thread_status))
            .map_err(|e| Error::Internal(format!("Failed to spawn {} thread: {}", self.name, e)))?;

        self.running = running;
        self.status = status;
        self.handle = Some(handle);
        Ok(())
    }

    /// Ask the device thread to close its stream, without waiting for it
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if self.handle.take().is_some() {
            debug!("{} thread detached", self.name);
        }
    }

    pub fn status(&self) -> DeviceStatus {
        if self.handle.is_none() {
            return DeviceStatus::Stopped;
        }
        DeviceStatus::from_u8(self.status.load(Ordering::SeqCst))
    }

    /// Spawned and not known to have failed
    pub fn is_active(&self) -> bool {
        matches!(self.status(), DeviceStatus::Opening | DeviceStatus::Running)
    }
}

impl Drop for DeviceThread {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_device_thread<F>(name: &str, open: F, running: &AtomicBool, status: &AtomicU8)
where
    F: FnOnce() -> Result<Stream>,
{
    let stream = match open() {
        Ok(stream) => stream,
        Err(e) => {
            error!("{}: failed to open device: {}", name, e);
            status.store(DeviceStatus::Failed as u8, Ordering::SeqCst);
            return;
        }
    };

    status.store(DeviceStatus::Running as u8, Ordering::SeqCst);

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(KEEPALIVE_POLL);
    }

    if let Err(e) = stream.pause() {
        warn!("{}: failed to pause stream: {}", name, e);
    }
    status.store(DeviceStatus::Stopped as u8, Ordering::SeqCst);
    debug!("{} thread exiting", name);
}
