//! Chatdock core: pure widget state machine and view-model helpers.
mod audio;
mod config;
mod directive;
mod effect;
mod gate;
mod message;
mod msg;
mod retry;
mod state;
mod transcript;
mod update;
mod view_model;

pub use audio::{AudioClip, AudioPhase, CaptureSessionId, PlaybackEnd, VoiceControl};
pub use config::{DockSide, WidgetConfig};
pub use directive::{Directive, DispatchFailure, DispatchReport, ReplyContent};
pub use effect::Effect;
pub use gate::{RejectedReplyPolicy, RequestId, SendFailure, SubmitGate};
pub use message::{Message, Role, Snapshot};
pub use msg::{Msg, PollOutcome, Reply, ReplyOutcome, VoiceOutcome, VoiceReply};
pub use retry::{RetryChain, RetryPolicy, RetryStep};
pub use state::WidgetState;
pub use transcript::{Entry, EntryKind, RenderOutcome, Side, TranscriptStore};
pub use update::update;
pub use view_model::{ConnectionStatus, VoiceIndicator, WidgetView};
