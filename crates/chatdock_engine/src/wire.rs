//! JSON shapes of the backend chat endpoints.
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use chatdock_core::{Message, PollOutcome, Reply, ReplyOutcome, Snapshot, VoiceOutcome, VoiceReply};
use chatdock_logging::{dock_debug, dock_warn};
use serde::{Deserialize, Serialize};

/// Body of `POST /chat/send`. `link` is the page the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendRequest<'a> {
    pub message: &'a str,
    pub link: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub link: bool,
    #[serde(default)]
    pub button: bool,
    /// Whether the backend has a scanned site to answer from.
    #[serde(default)]
    pub tree_exists: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AudioResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default)]
    pub link: bool,
    #[serde(default)]
    pub button: bool,
    #[serde(default)]
    pub reply_audio_b64: Option<String>,
}

impl SendResponse {
    pub fn into_outcome(self) -> ReplyOutcome {
        if !self.ok {
            return ReplyOutcome::Rejected;
        }
        if self.tree_exists == Some(false) {
            dock_debug!("Backend has no scanned site yet");
        }
        ReplyOutcome::Delivered(Reply {
            text: self.reply,
            link: self.link,
            button: self.button,
        })
    }
}

impl HistoryResponse {
    pub fn into_outcome(self) -> PollOutcome {
        if self.ok {
            PollOutcome::Snapshot(Snapshot::new(self.messages))
        } else {
            PollOutcome::Rejected
        }
    }
}

impl AudioResponse {
    /// Undecodable speech is dropped so the transcript and reply still show.
    pub fn into_outcome(self) -> VoiceOutcome {
        if !self.ok {
            return VoiceOutcome::Rejected;
        }
        let speech = self
            .reply_audio_b64
            .as_deref()
            .filter(|encoded| !encoded.is_empty())
            .and_then(|encoded| match BASE64_STANDARD.decode(encoded) {
                Ok(bytes) => Some(bytes),
                Err(err) => {
                    dock_warn!("Discarding synthesized reply audio: {}", err);
                    None
                }
            });
        VoiceOutcome::Delivered(VoiceReply {
            transcript: self.transcript,
            reply: Reply {
                text: self.reply,
                link: self.link,
                button: self.button,
            },
            speech,
        })
    }
}
