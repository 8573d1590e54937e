use crate::audio::{AudioPhase, CaptureSessionId};
use crate::config::WidgetConfig;
use crate::gate::{RequestId, SubmitGate};
use crate::transcript::TranscriptStore;
use crate::view_model::{ConnectionStatus, VoiceIndicator, WidgetView};

/// Everything one widget instance knows. Owned by a single control loop, so
/// independent widgets never share flags.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetState {
    pub(crate) config: WidgetConfig,
    pub(crate) transcript: TranscriptStore,
    pub(crate) gate: SubmitGate,
    pub(crate) connection: ConnectionStatus,
    pub(crate) audio: AudioPhase,
    /// A history query has been issued and not yet answered.
    pub(crate) history_in_flight: bool,
    last_request: RequestId,
    last_session: CaptureSessionId,
    poll_cycle: u64,
    dirty: bool,
}

impl WidgetState {
    pub fn new(config: WidgetConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn gate(&self) -> SubmitGate {
        self.gate
    }

    pub fn audio(&self) -> AudioPhase {
        self.audio
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    pub fn transcript(&self) -> &TranscriptStore {
        &self.transcript
    }

    pub fn poll_cycle(&self) -> u64 {
        self.poll_cycle
    }

    pub fn view(&self) -> WidgetView {
        WidgetView {
            bubbles: self.transcript.entries().to_vec(),
            connection: self.connection,
            input_enabled: self.gate.accepts_submission(),
            gate: self.gate,
            voice: self.voice_indicator(),
            dock: self.config.dock,
        }
    }

    fn voice_indicator(&self) -> VoiceIndicator {
        if !self.config.voice_enabled {
            return VoiceIndicator::Unavailable;
        }
        match self.audio {
            AudioPhase::Idle => VoiceIndicator::Ready,
            AudioPhase::Recording { .. } => VoiceIndicator::Recording,
            AudioPhase::Playing => VoiceIndicator::Playing,
            AudioPhase::RequestingDevice { .. }
            | AudioPhase::Stopping { .. }
            | AudioPhase::Uploading { .. } => VoiceIndicator::Busy,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a re-render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn next_request(&mut self) -> RequestId {
        self.last_request += 1;
        self.last_request
    }

    pub(crate) fn next_session(&mut self) -> CaptureSessionId {
        self.last_session += 1;
        self.last_session
    }

    pub(crate) fn advance_poll_cycle(&mut self) -> u64 {
        self.poll_cycle += 1;
        self.poll_cycle
    }

    pub(crate) fn set_connection(&mut self, status: ConnectionStatus) {
        if self.connection != status {
            self.connection = status;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_audio(&mut self, phase: AudioPhase) {
        if self.audio != phase {
            self.audio = phase;
            self.mark_dirty();
        }
    }
}
