use crate::audio::{AudioClip, CaptureSessionId, PlaybackEnd, VoiceControl};
use crate::directive::DispatchReport;
use crate::gate::RequestId;
use crate::message::Snapshot;

/// Assistant reply as carried by both the text and the voice endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reply {
    pub text: Option<String>,
    pub link: bool,
    pub button: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyOutcome {
    Delivered(Reply),
    /// Well-formed response with `ok:false`.
    Rejected,
    /// Network failure, non-2xx status or malformed payload.
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Snapshot(Snapshot),
    Rejected,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceReply {
    pub transcript: Option<String>,
    pub reply: Reply,
    /// Decoded synthesized speech, if the backend produced any.
    pub speech: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    Delivered(VoiceReply),
    Rejected,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User pressed send in the composer.
    TextSubmitted(String),
    /// Fixed-interval poll timer fired.
    PollTick,
    /// History query completed.
    HistoryFetched(PollOutcome),
    /// `/chat/send` completed for the given request.
    ReplyReceived {
        request: RequestId,
        outcome: ReplyOutcome,
    },
    /// User pressed one of the microphone controls.
    VoiceToggled { control: VoiceControl },
    /// Capture device granted and recording started.
    DeviceAcquired { session: CaptureSessionId },
    /// Capture device denied or missing.
    DeviceUnavailable {
        session: CaptureSessionId,
        reason: String,
    },
    /// Recording ceiling timer fired.
    RecordingCeilingReached { session: CaptureSessionId },
    /// Device released and fragments joined.
    CaptureFinished {
        session: CaptureSessionId,
        clip: AudioClip,
    },
    /// Audio upload completed.
    VoiceReplyReceived {
        session: CaptureSessionId,
        outcome: VoiceOutcome,
    },
    /// Synthesized reply stopped playing.
    PlaybackEnded(PlaybackEnd),
    /// A directive finished executing against the host page.
    DirectiveResolved(DispatchReport),
}
