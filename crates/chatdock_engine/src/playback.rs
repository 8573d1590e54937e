use chatdock_core::PlaybackEnd;
use chatdock_logging::{dock_info, dock_warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio format not supported")]
    Unsupported,
    #[error("playback failed: {0}")]
    Failed(String),
}

/// Plays synthesized replies. Resolves when playback completes, is paused,
/// or fails.
#[async_trait::async_trait]
pub trait AudioPlayer: Send + Sync {
    async fn play(&self, audio: Vec<u8>) -> Result<PlaybackEnd, PlaybackError>;
}

/// Player for hosts without an audio output: logs the clip and completes.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardPlayer;

#[async_trait::async_trait]
impl AudioPlayer for DiscardPlayer {
    async fn play(&self, audio: Vec<u8>) -> Result<PlaybackEnd, PlaybackError> {
        dock_info!("Discarding {} bytes of synthesized speech", audio.len());
        Ok(PlaybackEnd::Completed)
    }
}

/// Plays to the end; failures are logged and never block the pipeline.
pub(crate) async fn play_to_end(player: &dyn AudioPlayer, audio: Vec<u8>) -> PlaybackEnd {
    match player.play(audio).await {
        Ok(end) => end,
        Err(err) => {
            dock_warn!("Reply playback failed: {}", err);
            PlaybackEnd::Failed
        }
    }
}
