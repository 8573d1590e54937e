use std::time::Duration;

use crate::audio::{AudioClip, CaptureSessionId};
use crate::directive::Directive;
use crate::gate::RequestId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Query `/chat/history`.
    FetchHistory,
    /// Post user text to `/chat/send` together with the current page.
    SendMessage { request: RequestId, text: String },
    /// Carry out a directive on the host page.
    Dispatch(Directive),
    /// Open the capture device and start recording.
    AcquireDevice { session: CaptureSessionId },
    /// Schedule the auto-stop for a recording.
    ArmRecordingCeiling {
        session: CaptureSessionId,
        after: Duration,
    },
    /// Clear the ceiling timer, stop recording and release the device.
    StopCapture { session: CaptureSessionId },
    /// Post a clip to `/chat/audio` together with the current page.
    UploadAudio {
        session: CaptureSessionId,
        clip: AudioClip,
    },
    /// Play synthesized speech.
    PlayAudio { audio: Vec<u8> },
}
