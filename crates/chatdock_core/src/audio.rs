use std::fmt;

pub type CaptureSessionId = u64;

/// Voice pipeline phases. At most one capture session exists at a time,
/// whichever control surface started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioPhase {
    #[default]
    Idle,
    RequestingDevice { session: CaptureSessionId },
    Recording { session: CaptureSessionId },
    Stopping { session: CaptureSessionId },
    Uploading { session: CaptureSessionId },
    Playing,
}

impl AudioPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, AudioPhase::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, AudioPhase::Recording { .. })
    }

    pub fn session(&self) -> Option<CaptureSessionId> {
        match *self {
            AudioPhase::RequestingDevice { session }
            | AudioPhase::Recording { session }
            | AudioPhase::Stopping { session }
            | AudioPhase::Uploading { session } => Some(session),
            AudioPhase::Idle | AudioPhase::Playing => None,
        }
    }
}

impl fmt::Display for AudioPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioPhase::Idle => write!(f, "idle"),
            AudioPhase::RequestingDevice { session } => write!(f, "requesting device (#{session})"),
            AudioPhase::Recording { session } => write!(f, "recording (#{session})"),
            AudioPhase::Stopping { session } => write!(f, "stopping (#{session})"),
            AudioPhase::Uploading { session } => write!(f, "uploading (#{session})"),
            AudioPhase::Playing => write!(f, "playing"),
        }
    }
}

/// Which control surface a voice gesture came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceControl {
    /// Microphone button in the dock header.
    Dock,
    /// Microphone button next to the text input.
    Composer,
}

/// Captured fragments joined into one uploadable object.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    pub fn from_fragments(fragments: Vec<Vec<u8>>, mime: impl Into<String>) -> Self {
        Self {
            bytes: fragments.concat(),
            mime: mime.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioClip")
            .field("bytes", &self.bytes.len())
            .field("mime", &self.mime)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEnd {
    Completed,
    Paused,
    Failed,
}
