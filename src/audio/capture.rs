use crate::error::ClientResult;
use async_trait::async_trait;

/// Opaque audio payload passed between pipeline stages.
///
/// Deliberately not `Clone`: the stage that produced a clip owns it until it
/// is handed to the next stage by value, so stale audio cannot be reused.
#[derive(Debug)]
pub struct AudioClip {
    bytes: Vec<u8>,
    content_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: content_type.into(),
        }
    }

    pub fn wav(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "audio/wav")
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Microphone capture boundary.
///
/// `arm` acquires the device and starts buffering; `disarm` releases all
/// hardware resources on every exit path and yields the finished clip.
/// Calling `disarm` without a prior `arm` is a caller bug and fails with
/// `ClientError::InvalidState` without touching any state.
#[async_trait]
pub trait CaptureUnit: Send + Sync {
    /// Open the capture device and start buffering audio.
    ///
    /// Fails with `PermissionDenied` if the platform refuses microphone
    /// access, or `DeviceUnavailable` if no capture device exists.
    async fn arm(&mut self) -> ClientResult<()>;

    /// Stop capturing, release the device and return the recorded clip
    async fn disarm(&mut self) -> ClientResult<AudioClip>;

    /// Whether the unit currently owns the capture device
    fn is_armed(&self) -> bool;

    /// Backend name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_hands_off_its_bytes() {
        let clip = AudioClip::wav(vec![1, 2, 3]);
        assert_eq!(clip.content_type(), "audio/wav");
        assert_eq!(clip.len(), 3);
        assert!(!clip.is_empty());
        assert_eq!(clip.into_bytes(), vec![1, 2, 3]);
    }
}
