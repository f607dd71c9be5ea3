//! Environment configuration for the agent binary.
//!
//! Every knob has a default; only values that fail to parse are errors. The
//! API credential is resolved separately (see `curio_core::credential`)
//! because it has file and interactive sources beyond the environment.

use async_openai::types::{SpeechModel, Voice};
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all tuning configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub chat_model: String,
    pub tts_model: SpeechModel,
    pub tts_voice: Voice,
    pub tts_speed: f32,
    pub transcribe_model: String,
    pub log_level: Level,
}

fn parse_voice(value: &str) -> Option<Voice> {
    match value.to_lowercase().as_str() {
        "alloy" => Some(Voice::Alloy),
        "echo" => Some(Voice::Echo),
        "fable" => Some(Voice::Fable),
        "onyx" => Some(Voice::Onyx),
        "nova" => Some(Voice::Nova),
        "shimmer" => Some(Voice::Shimmer),
        _ => None,
    }
}

fn parse_speech_model(value: &str) -> Option<SpeechModel> {
    match value.to_lowercase().as_str() {
        "tts-1" => Some(SpeechModel::Tts1),
        "tts-1-hd" => Some(SpeechModel::Tts1Hd),
        _ => None,
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let chat_model =
            std::env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let tts_model_str = std::env::var("TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string());
        let tts_model = parse_speech_model(&tts_model_str).ok_or_else(|| {
            ConfigError::InvalidValue(
                "TTS_MODEL".to_string(),
                format!("'{}' is not a known speech model", tts_model_str),
            )
        })?;

        let tts_voice_str = std::env::var("TTS_VOICE").unwrap_or_else(|_| "shimmer".to_string());
        let tts_voice = parse_voice(&tts_voice_str).ok_or_else(|| {
            ConfigError::InvalidValue(
                "TTS_VOICE".to_string(),
                format!("'{}' is not a known voice", tts_voice_str),
            )
        })?;

        let tts_speed_str = std::env::var("TTS_SPEED").unwrap_or_else(|_| "1.0".to_string());
        let tts_speed = tts_speed_str
            .parse::<f32>()
            .ok()
            .filter(|speed| (0.25..=4.0).contains(speed))
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "TTS_SPEED".to_string(),
                    format!("'{}' is not a speed between 0.25 and 4.0", tts_speed_str),
                )
            })?;

        let transcribe_model =
            std::env::var("TRANSCRIBE_MODEL").unwrap_or_else(|_| "whisper-1".to_string());

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "WARN".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            chat_model,
            tts_model,
            tts_voice,
            tts_speed,
            transcribe_model,
            log_level,
        })
    }
}
