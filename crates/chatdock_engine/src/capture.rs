use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chatdock_core::AudioClip;
use chatdock_logging::dock_debug;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("capture permission denied")]
    PermissionDenied,
    #[error("no capture device available")]
    Unavailable,
    #[error("capture device failed: {0}")]
    Failed(String),
}

/// A microphone-like source.
#[async_trait::async_trait]
pub trait CaptureDevice: Send + Sync {
    async fn open(&self) -> Result<Box<dyn CaptureStream>, DeviceError>;
}

/// An open capture. `next_fragment` must be cancel-safe: it may be dropped
/// mid-await when recording stops.
#[async_trait::async_trait]
pub trait CaptureStream: Send {
    fn mime(&self) -> &str;

    /// Next encoded fragment; `None` once the source has nothing more.
    async fn next_fragment(&mut self) -> Option<Vec<u8>>;

    /// Stops every track and frees the device. Safe to call twice.
    fn release(&mut self);
}

/// Records until `stop` fires, the source ends, or `ceiling` elapses, then
/// releases the device and joins the fragments.
pub async fn record(
    mut stream: Box<dyn CaptureStream>,
    stop: CancellationToken,
    ceiling: Duration,
) -> AudioClip {
    let deadline = tokio::time::sleep(ceiling);
    tokio::pin!(deadline);

    let mut fragments = Vec::new();
    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            _ = &mut deadline => {
                dock_debug!("Recorder hit its {:?} cap", ceiling);
                break;
            }
            fragment = stream.next_fragment() => match fragment {
                Some(fragment) => fragments.push(fragment),
                None => break,
            },
        }
    }

    stream.release();
    AudioClip::from_fragments(fragments, stream.mime())
}

/// Capture device that replays canned fragments at a fixed pace.
///
/// Used by the terminal host, which has no microphone, and by tests.
#[derive(Debug, Clone)]
pub struct ScriptedCaptureDevice {
    fragments: Vec<Vec<u8>>,
    interval: Duration,
    mime: String,
    repeat: bool,
    denial: Option<DeviceError>,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl ScriptedCaptureDevice {
    pub fn new(fragments: Vec<Vec<u8>>, interval: Duration) -> Self {
        Self {
            fragments,
            interval,
            mime: "audio/webm".to_string(),
            repeat: false,
            denial: None,
            opened: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Cycle through the fragments for as long as the recording lasts.
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    pub fn denying(mut self, error: DeviceError) -> Self {
        self.denial = Some(error);
        self
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CaptureDevice for ScriptedCaptureDevice {
    async fn open(&self) -> Result<Box<dyn CaptureStream>, DeviceError> {
        if let Some(error) = &self.denial {
            return Err(error.clone());
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedStream {
            pending: self.fragments.iter().cloned().collect(),
            source: self.fragments.clone(),
            interval: self.interval,
            mime: self.mime.clone(),
            repeat: self.repeat,
            released: self.released.clone(),
            is_released: false,
        }))
    }
}

struct ScriptedStream {
    pending: VecDeque<Vec<u8>>,
    source: Vec<Vec<u8>>,
    interval: Duration,
    mime: String,
    repeat: bool,
    released: Arc<AtomicUsize>,
    is_released: bool,
}

#[async_trait::async_trait]
impl CaptureStream for ScriptedStream {
    fn mime(&self) -> &str {
        &self.mime
    }

    async fn next_fragment(&mut self) -> Option<Vec<u8>> {
        if self.is_released {
            return None;
        }
        if self.pending.is_empty() && self.repeat && !self.source.is_empty() {
            self.pending.extend(self.source.iter().cloned());
        }
        if self.pending.is_empty() {
            // A live microphone keeps the track open until it is stopped.
            std::future::pending::<()>().await;
        }
        tokio::time::sleep(self.interval).await;
        self.pending.pop_front()
    }

    fn release(&mut self) {
        if !self.is_released {
            self.is_released = true;
            self.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.release();
    }
}
