use chatdock_logging::{dock_debug, dock_info, dock_warn};

use crate::audio::AudioPhase;
use crate::directive::{DispatchReport, ReplyContent};
use crate::message::Message;
use crate::msg::{PollOutcome, Reply, ReplyOutcome, VoiceOutcome};
use crate::transcript::RenderOutcome;
use crate::view_model::ConnectionStatus;
use crate::{Effect, Msg, WidgetState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: WidgetState, msg: Msg) -> (WidgetState, Vec<Effect>) {
    let effects = match msg {
        Msg::TextSubmitted(raw) => {
            let text = raw.trim();
            if text.is_empty() {
                return (state, Vec::new());
            }
            if !state.gate.accepts_submission() {
                dock_debug!("Submission rejected while awaiting a reply");
                return (state, Vec::new());
            }
            let request = state.next_request();
            state.transcript.append(&Message::user(text));
            state.gate.on_submit(request);
            state.mark_dirty();
            vec![Effect::SendMessage {
                request,
                text: text.to_string(),
            }]
        }
        Msg::PollTick => {
            state.advance_poll_cycle();
            if state.history_in_flight {
                dock_debug!("Poll tick skipped; previous history query outstanding");
                return (state, Vec::new());
            }
            state.history_in_flight = true;
            vec![Effect::FetchHistory]
        }
        Msg::HistoryFetched(outcome) => apply_history(&mut state, outcome),
        Msg::ReplyReceived { request, outcome } => match outcome {
            ReplyOutcome::Delivered(reply) => {
                let effects = apply_reply(&mut state, reply);
                state.gate.on_reply(request);
                state.mark_dirty();
                effects
            }
            ReplyOutcome::Rejected => {
                dock_warn!(
                    "Send #{} rejected by backend; gate policy {:?}",
                    request,
                    state.config.rejected_reply
                );
                let before = state.gate;
                state.gate.on_rejected(request, state.config.rejected_reply);
                if state.gate != before {
                    state.mark_dirty();
                }
                Vec::new()
            }
            ReplyOutcome::Unreachable => {
                dock_warn!("Send #{} failed in transport", request);
                state.gate.on_unreachable(request);
                state.set_connection(ConnectionStatus::Offline);
                state.mark_dirty();
                Vec::new()
            }
        },
        Msg::VoiceToggled { control } => {
            if !state.config.voice_enabled {
                dock_debug!("Voice toggle from {:?} ignored; voice disabled", control);
                return (state, Vec::new());
            }
            match state.audio() {
                AudioPhase::Idle => {
                    let session = state.next_session();
                    dock_info!("Voice capture #{} requested from {:?}", session, control);
                    state.set_audio(AudioPhase::RequestingDevice { session });
                    vec![Effect::AcquireDevice { session }]
                }
                AudioPhase::Recording { session } => {
                    state.set_audio(AudioPhase::Stopping { session });
                    vec![Effect::StopCapture { session }]
                }
                AudioPhase::Playing => {
                    dock_debug!("Voice toggle refused during playback");
                    Vec::new()
                }
                phase => {
                    dock_debug!("Voice toggle ignored while {}", phase);
                    Vec::new()
                }
            }
        }
        Msg::DeviceAcquired { session } => {
            if state.audio == (AudioPhase::RequestingDevice { session }) {
                state.set_audio(AudioPhase::Recording { session });
                vec![Effect::ArmRecordingCeiling {
                    session,
                    after: state.config.recording_ceiling(),
                }]
            } else {
                dock_debug!("Device for stale capture #{} stopped", session);
                vec![Effect::StopCapture { session }]
            }
        }
        Msg::DeviceUnavailable { session, reason } => {
            if state.audio == (AudioPhase::RequestingDevice { session }) {
                dock_warn!("Capture device unavailable: {}", reason);
                state.set_audio(AudioPhase::Idle);
            }
            Vec::new()
        }
        Msg::RecordingCeilingReached { session } => {
            if state.audio == (AudioPhase::Recording { session }) {
                dock_info!("Recording #{} reached its ceiling", session);
                state.set_audio(AudioPhase::Stopping { session });
                vec![Effect::StopCapture { session }]
            } else {
                Vec::new()
            }
        }
        Msg::CaptureFinished { session, clip } => match state.audio() {
            AudioPhase::Recording { session: live } | AudioPhase::Stopping { session: live }
                if live == session =>
            {
                // The recorder may stop on its own hard cap before the timer fires.
                let mut effects = Vec::new();
                if state.audio.is_recording() {
                    effects.push(Effect::StopCapture { session });
                }
                if clip.is_empty() {
                    dock_debug!("Capture #{} produced no audio", session);
                    state.set_audio(AudioPhase::Idle);
                } else {
                    state.set_audio(AudioPhase::Uploading { session });
                    effects.push(Effect::UploadAudio { session, clip });
                }
                effects
            }
            _ => Vec::new(),
        },
        Msg::VoiceReplyReceived { session, outcome } => {
            if state.audio != (AudioPhase::Uploading { session }) {
                return (state, Vec::new());
            }
            match outcome {
                VoiceOutcome::Delivered(voice) => {
                    if let Some(transcript) = voice.transcript.filter(|t| !t.trim().is_empty()) {
                        state.transcript.append(&Message::user(transcript));
                        state.mark_dirty();
                    }
                    let mut effects = apply_reply(&mut state, voice.reply);
                    match voice.speech.filter(|audio| !audio.is_empty()) {
                        Some(audio) => {
                            state.set_audio(AudioPhase::Playing);
                            effects.push(Effect::PlayAudio { audio });
                        }
                        None => state.set_audio(AudioPhase::Idle),
                    }
                    effects
                }
                VoiceOutcome::Rejected => {
                    dock_warn!("Voice upload #{} rejected by backend", session);
                    state.set_audio(AudioPhase::Idle);
                    Vec::new()
                }
                VoiceOutcome::Unreachable => {
                    dock_warn!("Voice upload #{} failed in transport", session);
                    state.set_audio(AudioPhase::Idle);
                    state.set_connection(ConnectionStatus::Offline);
                    Vec::new()
                }
            }
        }
        Msg::PlaybackEnded(end) => {
            if state.audio == AudioPhase::Playing {
                dock_debug!("Playback ended: {:?}", end);
                state.set_audio(AudioPhase::Idle);
            }
            Vec::new()
        }
        Msg::DirectiveResolved(report) => {
            match report {
                DispatchReport::Navigated { url } => dock_info!("Navigated to {}", url),
                DispatchReport::AlreadyAtTarget { url } => {
                    dock_debug!("Navigation skipped; already at {}", url)
                }
                DispatchReport::Activated { selector } => {
                    state
                        .transcript
                        .append_diagnostic(format!("[Clicked {selector}]"));
                    state.mark_dirty();
                }
                DispatchReport::Failed(failure) => {
                    dock_warn!("Directive failed: {}", failure);
                    state.transcript.append_diagnostic(failure.to_string());
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
    };

    (state, effects)
}

fn apply_history(state: &mut WidgetState, outcome: PollOutcome) -> Vec<Effect> {
    state.history_in_flight = false;
    match outcome {
        PollOutcome::Unreachable => {
            if state.connection != ConnectionStatus::Offline {
                dock_warn!("History poll failed; marking offline");
            }
            state.set_connection(ConnectionStatus::Offline);
            Vec::new()
        }
        PollOutcome::Rejected => {
            dock_debug!("History poll returned ok:false");
            Vec::new()
        }
        PollOutcome::Snapshot(snapshot) => {
            if state.connection != ConnectionStatus::Online {
                dock_info!("Backend online");
            }
            state.set_connection(ConnectionStatus::Online);
            match state.transcript.render(&snapshot) {
                RenderOutcome::Unchanged => Vec::new(),
                RenderOutcome::Replaced { directives } => {
                    state.gate.on_snapshot_changed();
                    state.mark_dirty();
                    directives.into_iter().map(Effect::Dispatch).collect()
                }
            }
        }
    }
}

fn apply_reply(state: &mut WidgetState, reply: Reply) -> Vec<Effect> {
    match ReplyContent::classify(reply.text.as_deref(), reply.link, reply.button) {
        ReplyContent::Bubble(text) => {
            state.transcript.append(&Message::assistant(text));
            state.mark_dirty();
            Vec::new()
        }
        ReplyContent::Directive(directive) => vec![Effect::Dispatch(directive)],
        ReplyContent::Nothing => Vec::new(),
    }
}
