use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gate::RejectedReplyPolicy;
use crate::retry::RetryPolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DockSide {
    Left,
    #[default]
    Right,
}

/// Options resolved once by whoever embeds the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    pub backend_url: String,
    pub api_key: String,
    pub dock: DockSide,
    pub voice_enabled: bool,
    /// Voice name requested for synthesized replies.
    pub voice: String,
    pub poll_interval_ms: u64,
    pub recording_ceiling_ms: u64,
    pub retry: RetryPolicy,
    pub rejected_reply: RejectedReplyPolicy,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            api_key: String::new(),
            dock: DockSide::Right,
            voice_enabled: true,
            voice: "alloy".to_string(),
            poll_interval_ms: 2_000,
            recording_ceiling_ms: 10_000,
            retry: RetryPolicy::default(),
            rejected_reply: RejectedReplyPolicy::Release,
        }
    }
}

impl WidgetConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn recording_ceiling(&self) -> Duration {
        Duration::from_millis(self.recording_ceiling_ms)
    }
}
