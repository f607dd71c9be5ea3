//! Speech synthesis and fire-and-forget playback.
//!
//! The synthesis request itself is awaited so its failure can be reported;
//! once the audio bytes are staged in a temp file, playback runs on a
//! detached blocking task that owns the file. The `TempPath` removes the
//! file when the task finishes, whether playback worked or not.

use anyhow::Context;
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice},
};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("speech synthesis request failed: {0}")]
    Request(#[from] OpenAIError),
    #[error("could not stage synthesized audio: {0}")]
    Stage(#[from] std::io::Error),
}

/// Turns answer text into spoken audio.
pub struct Speaker {
    client: Client<OpenAIConfig>,
    model: SpeechModel,
    voice: Voice,
    speed: f32,
}

impl Speaker {
    pub fn new(client: Client<OpenAIConfig>, model: SpeechModel, voice: Voice, speed: f32) -> Self {
        Self {
            client,
            model,
            voice,
            speed,
        }
    }

    /// Synthesizes `text` and starts playback in the background.
    ///
    /// Returns once the audio has been staged; playback runs detached and
    /// its failures are logged, not surfaced. Errors here mean the request
    /// or staging failed before playback could start.
    pub async fn say(&self, text: &str) -> Result<(), SynthesisError> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.model.clone())
            .voice(self.voice.clone())
            .speed(self.speed)
            .response_format(SpeechResponseFormat::Mp3)
            .build()?;

        let response = self.client.audio().speech(request).await?;

        let mut file = tempfile::Builder::new()
            .prefix("curio-")
            .suffix(".mp3")
            .tempfile()?;
        file.write_all(&response.bytes)?;
        file.flush()?;
        let path = file.into_temp_path();

        tokio::task::spawn_blocking(move || {
            if let Err(e) = play_file(&path) {
                debug!(error = %e, "Audio playback failed");
            }
            // Dropping the TempPath deletes the staged file.
            drop(path);
        });

        Ok(())
    }
}

fn play_file(path: &Path) -> anyhow::Result<()> {
    let (_stream, handle) =
        rodio::OutputStream::try_default().context("No audio output device")?;
    let sink = rodio::Sink::try_new(&handle)?;
    let source = rodio::Decoder::new(BufReader::new(File::open(path)?))?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}
