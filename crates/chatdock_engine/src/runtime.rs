use std::collections::HashMap;
use std::sync::Arc;

use chatdock_core::{
    update, CaptureSessionId, Effect, Msg, PlaybackEnd, PollOutcome, ReplyOutcome, VoiceControl,
    VoiceOutcome, WidgetConfig, WidgetState, WidgetView,
};
use chatdock_logging::{dock_debug, dock_info, dock_warn, set_poll_cycle};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::capture::{record, CaptureDevice};
use crate::dispatch::{ActionDispatcher, Timer, TokioTimer};
use crate::page::HostPage;
use crate::playback::{play_to_end, AudioPlayer};
use crate::ChatBackend;

/// Receives the view model whenever it changed.
pub trait ViewSink: Send + Sync {
    fn render(&self, view: &WidgetView);
}

/// Cloneable entry point for UI gestures.
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    tx: mpsc::UnboundedSender<Msg>,
    shutdown: CancellationToken,
}

impl WidgetHandle {
    pub fn submit(&self, text: impl Into<String>) {
        let _ = self.tx.send(Msg::TextSubmitted(text.into()));
    }

    pub fn toggle_voice(&self, control: VoiceControl) {
        let _ = self.tx.send(Msg::VoiceToggled { control });
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

struct VoiceIo {
    device: Arc<dyn CaptureDevice>,
    player: Arc<dyn AudioPlayer>,
}

struct ActiveCapture {
    stop: CancellationToken,
    ceiling: Option<JoinHandle<()>>,
}

impl ActiveCapture {
    fn end(self) {
        if let Some(timer) = self.ceiling {
            timer.abort();
        }
        self.stop.cancel();
    }
}

/// Owns one widget's state and executes its effects.
///
/// All state transitions happen on the task running [`WidgetRuntime::run`];
/// spawned IO reports back through the message channel.
pub struct WidgetRuntime {
    state: WidgetState,
    backend: Arc<dyn ChatBackend>,
    page: Arc<dyn HostPage>,
    dispatcher: Arc<ActionDispatcher>,
    voice: Option<VoiceIo>,
    sink: Arc<dyn ViewSink>,
    msg_tx: mpsc::UnboundedSender<Msg>,
    msg_rx: mpsc::UnboundedReceiver<Msg>,
    shutdown: CancellationToken,
    captures: HashMap<CaptureSessionId, ActiveCapture>,
}

impl WidgetRuntime {
    pub fn new(
        config: WidgetConfig,
        backend: Arc<dyn ChatBackend>,
        page: Arc<dyn HostPage>,
        sink: Arc<dyn ViewSink>,
    ) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::new(ActionDispatcher::new(
            page.clone(),
            Arc::new(TokioTimer),
            config.retry,
        ));
        Self {
            state: WidgetState::new(config),
            backend,
            page,
            dispatcher,
            voice: None,
            sink,
            msg_tx,
            msg_rx,
            shutdown: CancellationToken::new(),
            captures: HashMap::new(),
        }
    }

    pub fn with_voice(
        mut self,
        device: Arc<dyn CaptureDevice>,
        player: Arc<dyn AudioPlayer>,
    ) -> Self {
        self.voice = Some(VoiceIo { device, player });
        self
    }

    /// Replaces the clock used between selector retries.
    pub fn with_timer(mut self, timer: Arc<dyn Timer>) -> Self {
        self.dispatcher = Arc::new(ActionDispatcher::new(
            self.page.clone(),
            timer,
            self.state.config().retry,
        ));
        self
    }

    pub fn handle(&self) -> WidgetHandle {
        WidgetHandle {
            tx: self.msg_tx.clone(),
            shutdown: self.shutdown.clone(),
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    /// Runs until [`WidgetHandle::shutdown`] is called.
    pub async fn run(mut self) {
        let mut poll = tokio::time::interval(self.state.config().poll_interval());
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        dock_info!(
            "Widget started against {} (poll every {:?})",
            self.state.config().backend_url,
            self.state.config().poll_interval()
        );
        self.sink.render(&self.state.view());

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                Some(msg) = self.msg_rx.recv() => self.dispatch(msg),
                _ = poll.tick() => self.dispatch(Msg::PollTick),
            }
        }

        for (_, capture) in self.captures.drain() {
            capture.end();
        }
        dock_info!("Widget stopped");
    }

    fn dispatch(&mut self, msg: Msg) {
        if let Msg::DeviceUnavailable { session, .. } = &msg {
            self.captures.remove(session);
        }

        let state = std::mem::take(&mut self.state);
        let (mut next, effects) = update(state, msg);
        set_poll_cycle(next.poll_cycle());
        let dirty = next.consume_dirty();
        self.state = next;

        for effect in effects {
            self.execute(effect);
        }
        if dirty {
            self.sink.render(&self.state.view());
        }
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::FetchHistory => {
                let backend = self.backend.clone();
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let outcome = match backend.history().await {
                        Ok(response) => response.into_outcome(),
                        Err(err) => {
                            dock_warn!("History poll failed: {}", err);
                            PollOutcome::Unreachable
                        }
                    };
                    let _ = tx.send(Msg::HistoryFetched(outcome));
                });
            }
            Effect::SendMessage { request, text } => {
                let backend = self.backend.clone();
                let tx = self.msg_tx.clone();
                let page_url = self.page.location().to_string();
                tokio::spawn(async move {
                    let outcome = match backend.send(&text, &page_url).await {
                        Ok(response) => response.into_outcome(),
                        Err(err) => {
                            dock_warn!("Send #{} failed: {}", request, err);
                            ReplyOutcome::Unreachable
                        }
                    };
                    let _ = tx.send(Msg::ReplyReceived { request, outcome });
                });
            }
            Effect::Dispatch(directive) => {
                let dispatcher = self.dispatcher.clone();
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let report = dispatcher.dispatch(directive).await;
                    let _ = tx.send(Msg::DirectiveResolved(report));
                });
            }
            Effect::AcquireDevice { session } => self.start_capture(session),
            Effect::ArmRecordingCeiling { session, after } => {
                let tx = self.msg_tx.clone();
                let timer = tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Msg::RecordingCeilingReached { session });
                });
                match self.captures.get_mut(&session) {
                    Some(capture) => capture.ceiling = Some(timer),
                    None => timer.abort(),
                }
            }
            Effect::StopCapture { session } => {
                if let Some(capture) = self.captures.remove(&session) {
                    dock_debug!("Stopping capture #{}", session);
                    capture.end();
                }
            }
            Effect::UploadAudio { session, clip } => {
                let backend = self.backend.clone();
                let tx = self.msg_tx.clone();
                let page_url = self.page.location().to_string();
                tokio::spawn(async move {
                    let outcome = match backend.upload_audio(&clip, &page_url).await {
                        Ok(response) => response.into_outcome(),
                        Err(err) => {
                            dock_warn!("Audio upload #{} failed: {}", session, err);
                            VoiceOutcome::Unreachable
                        }
                    };
                    let _ = tx.send(Msg::VoiceReplyReceived { session, outcome });
                });
            }
            Effect::PlayAudio { audio } => {
                let Some(voice) = &self.voice else {
                    let _ = self.msg_tx.send(Msg::PlaybackEnded(PlaybackEnd::Failed));
                    return;
                };
                let player = voice.player.clone();
                let tx = self.msg_tx.clone();
                tokio::spawn(async move {
                    let end = play_to_end(player.as_ref(), audio).await;
                    let _ = tx.send(Msg::PlaybackEnded(end));
                });
            }
        }
    }

    fn start_capture(&mut self, session: CaptureSessionId) {
        let Some(voice) = &self.voice else {
            let _ = self.msg_tx.send(Msg::DeviceUnavailable {
                session,
                reason: "no capture device configured".to_string(),
            });
            return;
        };

        let stop = CancellationToken::new();
        self.captures.insert(
            session,
            ActiveCapture {
                stop: stop.clone(),
                ceiling: None,
            },
        );

        let device = voice.device.clone();
        let ceiling = self.state.config().recording_ceiling();
        let tx = self.msg_tx.clone();
        tokio::spawn(async move {
            let stream = match device.open().await {
                Ok(stream) => stream,
                Err(err) => {
                    let _ = tx.send(Msg::DeviceUnavailable {
                        session,
                        reason: err.to_string(),
                    });
                    return;
                }
            };
            let _ = tx.send(Msg::DeviceAcquired { session });
            let clip = record(stream, stop, ceiling).await;
            dock_debug!("Capture #{} finished with {} bytes", session, clip.bytes.len());
            let _ = tx.send(Msg::CaptureFinished { session, clip });
        });
    }
}
