//! Microphone capture and transcription.
//!
//! `voice` questions are captured as a single bounded phrase: we wait a
//! fixed time for speech to start, then record until the speaker goes
//! quiet or the phrase cap is hit. The capture is classified rather than
//! failed — a timeout or unintelligible phrase sends the user back to the
//! prompt, never down.

use crate::audio;
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{AudioInput, CreateTranscriptionRequestArgs},
};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long to wait for speech to start before giving up.
pub const SPEECH_START_TIMEOUT: Duration = Duration::from_secs(5);

/// Hard cap on a single captured phrase.
pub const MAX_PHRASE_DURATION: Duration = Duration::from_secs(10);

/// Silence length that ends a phrase once speech has started.
const SILENCE_HOLD: Duration = Duration::from_millis(1200);

/// RMS level above which a poll interval counts as speech.
const SPEECH_RMS_THRESHOLD: f32 = 0.015;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum ListenError {
    #[error("no input device available")]
    NoInputDevice,
    #[error("audio capture failed: {0}")]
    Capture(String),
    #[error("could not encode captured audio: {0}")]
    Encode(#[from] hound::Error),
    #[error("transcription service error: {0}")]
    Service(#[from] OpenAIError),
}

/// What came out of one listen attempt.
#[derive(Debug)]
pub enum ListenOutcome {
    /// A transcribed, non-empty phrase.
    Heard(String),
    /// No speech was detected before the start timeout.
    Timeout,
    /// Audio was captured but the service produced no text for it.
    Unintelligible,
}

/// Captures one phrase from the default input device and transcribes it.
pub struct Listener {
    client: Client<OpenAIConfig>,
    model: String,
}

impl Listener {
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Whether a default input device exists on this machine.
    pub fn capture_available() -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    /// Records one phrase and asks the transcription service for text.
    ///
    /// Returns `ListenOutcome::Timeout` when nothing was said, and
    /// `Unintelligible` when the service returned empty text; both are
    /// ordinary outcomes, not errors.
    pub async fn listen(&self) -> Result<ListenOutcome, ListenError> {
        let captured = tokio::task::spawn_blocking(capture_phrase)
            .await
            .map_err(|e| ListenError::Capture(e.to_string()))??;

        let Some((samples, sample_rate)) = captured else {
            return Ok(ListenOutcome::Timeout);
        };
        debug!(
            samples = samples.len(),
            sample_rate, "Captured phrase, transcribing"
        );

        let wav = audio::encode_wav_mono16(&samples, sample_rate)?;
        let request = CreateTranscriptionRequestArgs::default()
            .file(AudioInput::from_vec_u8("phrase.wav".to_string(), wav))
            .model(self.model.clone())
            .build()?;

        let response = self.client.audio().transcribe(request).await?;
        let text = response.text.trim().to_string();
        if text.is_empty() {
            Ok(ListenOutcome::Unintelligible)
        } else {
            Ok(ListenOutcome::Heard(text))
        }
    }
}

/// Blocking capture of a single phrase from the default input device.
///
/// Returns `None` when no speech was detected within the start timeout,
/// otherwise the mono samples and their sample rate.
fn capture_phrase() -> Result<Option<(Vec<f32>, u32)>, ListenError> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or(ListenError::NoInputDevice)?;
    let supported = device
        .default_input_config()
        .map_err(|e| ListenError::Capture(e.to_string()))?;
    let sample_rate = supported.sample_rate().0;
    let channels = supported.channels();

    let buffer: Arc<Mutex<Vec<f32>>> = Arc::new(Mutex::new(Vec::new()));
    let err_fn = |err| warn!(error = %err, "Input stream error");

    let stream = match supported.sample_format() {
        cpal::SampleFormat::F32 => {
            let buffer = Arc::clone(&buffer);
            device.build_input_stream(
                &supported.config(),
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                err_fn,
                None,
            )
        }
        cpal::SampleFormat::I16 => {
            let buffer = Arc::clone(&buffer);
            device.build_input_stream(
                &supported.config(),
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(audio::convert_i16_to_f32(data));
                    }
                },
                err_fn,
                None,
            )
        }
        other => {
            return Err(ListenError::Capture(format!(
                "unsupported sample format {other:?}"
            )));
        }
    }
    .map_err(|e| ListenError::Capture(e.to_string()))?;

    stream
        .play()
        .map_err(|e| ListenError::Capture(e.to_string()))?;

    let started_waiting = Instant::now();
    let mut speech_started: Option<Instant> = None;
    let mut last_voice = Instant::now();
    let mut phrase: Vec<f32> = Vec::new();

    loop {
        std::thread::sleep(POLL_INTERVAL);
        let chunk: Vec<f32> = match buffer.lock() {
            Ok(mut buf) => buf.drain(..).collect(),
            Err(_) => return Err(ListenError::Capture("capture buffer poisoned".to_string())),
        };
        let mono = audio::downmix_mono(&chunk, channels);
        let level = audio::rms(&mono);

        match speech_started {
            None => {
                if level >= SPEECH_RMS_THRESHOLD {
                    speech_started = Some(Instant::now());
                    last_voice = Instant::now();
                    phrase.extend(mono);
                } else if started_waiting.elapsed() >= SPEECH_START_TIMEOUT {
                    drop(stream);
                    return Ok(None);
                }
            }
            Some(started) => {
                if level >= SPEECH_RMS_THRESHOLD {
                    last_voice = Instant::now();
                }
                phrase.extend(mono);
                if started.elapsed() >= MAX_PHRASE_DURATION
                    || last_voice.elapsed() >= SILENCE_HOLD
                {
                    drop(stream);
                    return Ok(Some((phrase, sample_rate)));
                }
            }
        }
    }
}
