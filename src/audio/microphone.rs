//! cpal-backed microphone capture.
//!
//! The input stream lives on a dedicated thread because cpal streams are not
//! `Send`; samples are mixed down to mono into a shared buffer and encoded
//! as 16-bit WAV when the unit is disarmed.

use crate::audio::capture::{AudioClip, CaptureUnit};
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{info, warn};

pub struct MicrophoneCapture {
    armed: Arc<AtomicBool>,
    samples: Arc<Mutex<Vec<f32>>>,

    /// Native rate of the device stream, set on arm
    capture_rate: u32,

    /// Signalled by the capture thread once the stream has been dropped
    done_rx: Option<oneshot::Receiver<()>>,
}

impl MicrophoneCapture {
    pub fn new() -> Self {
        Self {
            armed: Arc::new(AtomicBool::new(false)),
            samples: Arc::new(Mutex::new(Vec::new())),
            capture_rate: 0,
            done_rx: None,
        }
    }
}

impl Default for MicrophoneCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureUnit for MicrophoneCapture {
    async fn arm(&mut self) -> ClientResult<()> {
        if self.armed.load(Ordering::SeqCst) {
            return Err(ClientError::InvalidState("arm while already armed"));
        }

        {
            let mut buf = lock_samples(&self.samples);
            buf.clear();
        }

        let (ready_tx, ready_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();

        self.armed.store(true, Ordering::SeqCst);

        let armed = Arc::clone(&self.armed);
        let samples = Arc::clone(&self.samples);
        thread::spawn(move || capture_thread(armed, samples, ready_tx, done_tx));

        match ready_rx.await {
            Ok(Ok(rate)) => {
                self.capture_rate = rate;
                self.done_rx = Some(done_rx);
                info!("microphone armed at {} Hz", rate);
                Ok(())
            }
            Ok(Err(e)) => {
                self.armed.store(false, Ordering::SeqCst);
                Err(e)
            }
            Err(_) => {
                self.armed.store(false, Ordering::SeqCst);
                Err(ClientError::AudioStream(
                    "capture thread exited before the stream was ready".to_string(),
                ))
            }
        }
    }

    async fn disarm(&mut self) -> ClientResult<AudioClip> {
        if !self.armed.load(Ordering::SeqCst) {
            return Err(ClientError::InvalidState("disarm without a prior arm"));
        }

        self.armed.store(false, Ordering::SeqCst);

        // The capture thread drops the stream before signalling, so the
        // device is released before the clip is handed over.
        if let Some(done) = self.done_rx.take() {
            let _ = done.await;
        }

        let recorded = {
            let mut buf = lock_samples(&self.samples);
            std::mem::take(&mut *buf)
        };
        let rate = self.capture_rate;

        let clip = tokio::task::spawn_blocking(move || encode_wav(&recorded, rate))
            .await
            .map_err(|e| ClientError::AudioStream(e.to_string()))??;

        info!("microphone disarmed, clip of {} bytes", clip.len());
        Ok(clip)
    }

    fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

fn capture_thread(
    armed: Arc<AtomicBool>,
    samples: Arc<Mutex<Vec<f32>>>,
    ready_tx: oneshot::Sender<ClientResult<u32>>,
    done_tx: oneshot::Sender<()>,
) {
    let host = cpal::default_host();
    let device = match host.default_input_device() {
        Some(d) => d,
        None => {
            let _ = ready_tx.send(Err(ClientError::DeviceUnavailable));
            return;
        }
    };

    let config = match device.default_input_config() {
        Ok(c) => c,
        Err(e) => {
            let _ = ready_tx.send(Err(map_config_err(e)));
            return;
        }
    };
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    let sink = Arc::clone(&samples);
    let stream = match device.build_input_stream(
        &config.into(),
        move |data: &[f32], _: &cpal::InputCallbackInfo| {
            let mut buf = lock_samples(&sink);
            if channels <= 1 {
                buf.extend_from_slice(data);
            } else {
                for frame in data.chunks(channels) {
                    buf.push(frame.iter().sum::<f32>() / channels as f32);
                }
            }
        },
        |err| warn!("input stream error: {}", err),
        None,
    ) {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(map_build_err(e)));
            return;
        }
    };

    if let Err(e) = stream.play() {
        let _ = ready_tx.send(Err(ClientError::AudioStream(e.to_string())));
        return;
    }

    if ready_tx.send(Ok(sample_rate)).is_err() {
        return;
    }

    while armed.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(50));
    }

    // Release the device before reporting completion.
    drop(stream);
    let _ = done_tx.send(());
}

fn lock_samples(samples: &Mutex<Vec<f32>>) -> std::sync::MutexGuard<'_, Vec<f32>> {
    match samples.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn map_config_err(err: cpal::DefaultStreamConfigError) -> ClientError {
    match err {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => ClientError::DeviceUnavailable,
        cpal::DefaultStreamConfigError::BackendSpecific { err } => backend_specific(err),
        other => ClientError::AudioStream(other.to_string()),
    }
}

fn map_build_err(err: cpal::BuildStreamError) -> ClientError {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => ClientError::DeviceUnavailable,
        cpal::BuildStreamError::BackendSpecific { err } => backend_specific(err),
        other => ClientError::AudioStream(other.to_string()),
    }
}

// cpal surfaces OS permission refusals as backend-specific errors, so the
// message text is the only signal available.
fn backend_specific(err: cpal::BackendSpecificError) -> ClientError {
    let msg = err.to_string();
    if msg.to_lowercase().contains("permission") {
        ClientError::PermissionDenied
    } else {
        ClientError::AudioStream(msg)
    }
}

fn encode_wav(samples: &[f32], sample_rate: u32) -> ClientResult<AudioClip> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| ClientError::AudioStream(e.to_string()))?;
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer
                .write_sample(v)
                .map_err(|e| ClientError::AudioStream(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| ClientError::AudioStream(e.to_string()))?;
    }

    Ok(AudioClip::wav(cursor.into_inner()))
}
