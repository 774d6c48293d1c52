//! Playback of synthesized speech.

use crate::audio::capture::AudioClip;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use std::io::Cursor;
use tracing::debug;

/// Plays one synthesized clip; the future resolves when playback completes.
///
/// The clip is consumed so a player cannot hold on to stale audio.
#[async_trait]
pub trait SpeechPlayer: Send + Sync {
    async fn play(&self, clip: AudioClip) -> ClientResult<()>;
}

/// rodio-backed player.
///
/// The output stream is opened per clip on a blocking worker because rodio
/// stream handles are not `Send`.
pub struct RodioPlayer;

impl RodioPlayer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RodioPlayer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechPlayer for RodioPlayer {
    async fn play(&self, clip: AudioClip) -> ClientResult<()> {
        if clip.is_empty() {
            return Ok(());
        }

        let bytes = clip.into_bytes();
        tokio::task::spawn_blocking(move || -> ClientResult<()> {
            let (_stream, handle) = rodio::OutputStream::try_default()
                .map_err(|e| ClientError::Playback(e.to_string()))?;
            let sink =
                rodio::Sink::try_new(&handle).map_err(|e| ClientError::Playback(e.to_string()))?;
            let source = rodio::Decoder::new(Cursor::new(bytes))
                .map_err(|e| ClientError::Playback(format!("decode failed: {}", e)))?;
            sink.append(source);
            sink.sleep_until_end();
            Ok(())
        })
        .await
        .map_err(|e| ClientError::Playback(e.to_string()))??;

        debug!("playback finished");
        Ok(())
    }
}
