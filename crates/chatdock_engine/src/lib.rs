//! Chatdock engine: backend IO, host page access and effect execution.
mod backend;
mod capture;
mod dispatch;
mod page;
mod playback;
mod runtime;
mod types;
mod wire;

pub use backend::{BackendSettings, ChatBackend, ReqwestBackend};
pub use capture::{record, CaptureDevice, CaptureStream, DeviceError, ScriptedCaptureDevice};
pub use dispatch::{ActionDispatcher, Timer, TokioTimer};
pub use page::{resolve_link, validate_selector, ActivationError, ElementTarget, HostPage, HtmlPage};
pub use playback::{AudioPlayer, DiscardPlayer, PlaybackError};
pub use runtime::{ViewSink, WidgetHandle, WidgetRuntime};
pub use types::{FailureKind, TransportError};
pub use wire::{AudioResponse, HistoryResponse, SendRequest, SendResponse};
