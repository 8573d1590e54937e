use std::fmt;

use crate::config::DockSide;
use crate::gate::SubmitGate;
use crate::transcript::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No poll has completed yet.
    #[default]
    Connecting,
    Online,
    Offline,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => write!(f, "connecting"),
            ConnectionStatus::Online => write!(f, "online"),
            ConnectionStatus::Offline => write!(f, "offline"),
        }
    }
}

/// Microphone control appearance. Playing is kept distinct from Recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceIndicator {
    Unavailable,
    Ready,
    Busy,
    Recording,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetView {
    pub bubbles: Vec<Entry>,
    pub connection: ConnectionStatus,
    pub input_enabled: bool,
    pub gate: SubmitGate,
    pub voice: VoiceIndicator,
    pub dock: DockSide,
}
