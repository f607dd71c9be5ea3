//! Main entrypoint for the Curio agent.
//!
//! This binary is responsible for:
//! 1. Loading tuning configuration from the environment.
//! 2. Resolving the API credential (record file, environment, or an
//!    interactive prompt that persists the entered key).
//! 3. Building the completion, synthesis, and transcription clients.
//! 4. Running the interactive question loop until the user quits.

mod audio;
mod config;
mod speech;
mod voice;

use anyhow::Context;
use async_openai::{Client, config::OpenAIConfig};
use clap::Parser;
use colored::Colorize;
use curio_core::{
    Command, Session,
    credential::{self, CONFIG_FILE_NAME, CREDENTIAL_ENV_VAR, ConfigRecord, CredentialError},
    llm_client::{LLMClient, OpenAICompatibleClient},
    session::truncate_chars,
};
use rustyline::error::ReadlineError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::speech::Speaker;
use crate::voice::{ListenOutcome, Listener};

const FAREWELL: &str = "👋 Bye! Keep being curious!";

#[derive(Parser, Debug)]
#[command(name = "curio", about = "Curiosity Explorer - ask me anything", version)]
struct Cli {
    /// Path to the credential record (defaults to config.json beside the executable)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Start with spoken answers turned off
    #[arg(long)]
    mute: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --- 1. Load Configuration ---
    let config = Config::from_env().context("Failed to load configuration")?;

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    // --- 3. Resolve the credential ---
    let record_path = cli
        .config
        .clone()
        .unwrap_or_else(ConfigRecord::default_path);
    let record = ConfigRecord::load(&record_path);
    let api_key = match credential::resolve(None, &record, CREDENTIAL_ENV_VAR) {
        Ok(key) => {
            info!(key = %credential::masked(&key), "Credential resolved");
            key
        }
        Err(CredentialError::NoCredential) => prompt_and_store_key(record, &record_path)?,
    };

    // --- 4. Build service clients ---
    let openai_config = OpenAIConfig::new().with_api_key(api_key);
    let llm: Arc<dyn LLMClient> = Arc::new(OpenAICompatibleClient::new(
        openai_config.clone(),
        config.chat_model.clone(),
    ));
    let client = Client::with_config(openai_config);
    let speaker = Arc::new(Speaker::new(
        client.clone(),
        config.tts_model.clone(),
        config.tts_voice.clone(),
        config.tts_speed,
    ));
    let listener = Listener::new(client, config.transcribe_model.clone());

    let mut session = Session::new(llm);
    session.set_muted(cli.mute);

    // --- 5. Run the interactive loop ---
    let capture_available = Listener::capture_available();
    info!(
        model = %config.chat_model,
        capture_available,
        "Session ready"
    );
    print_banner(capture_available);
    run(&mut session, &speaker, &listener, capture_available).await
}

/// Asks the user for a key on stdin and persists it to the record file.
/// An empty entry aborts startup; nothing can work without a credential.
fn prompt_and_store_key(mut record: ConfigRecord, record_path: &Path) -> anyhow::Result<String> {
    println!();
    println!("{}", "⚠️  OpenAI API key not found!".yellow());
    println!(
        "\nTo use this agent, add your API key to: {}",
        record_path.display()
    );
    println!("  {{\"openai_api_key\": \"sk-your-key-here\"}}");
    println!("\nOr set the environment variable:");
    println!("  export {CREDENTIAL_ENV_VAR}='your-key-here'");
    println!("\nOr enter it now (will be saved to {CONFIG_FILE_NAME}):");
    print!("API Key (or press Enter to quit): ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let key = line.trim().trim_matches(['"', '\'']).to_string();
    if key.is_empty() {
        return Err(CredentialError::NoCredential.into());
    }
    if !key.starts_with("sk-") {
        println!("{}", "Warning: OpenAI keys usually start with 'sk-'".yellow());
    }

    record.openai_api_key = Some(key.clone());
    match record.store(record_path) {
        Ok(()) => println!(
            "{}",
            format!("✅ API key saved to {}", record_path.display()).green()
        ),
        Err(e) => println!(
            "{}",
            format!("Warning: could not save {CONFIG_FILE_NAME}: {e}").yellow()
        ),
    }
    Ok(key)
}

fn print_banner(capture_available: bool) {
    println!();
    println!(
        "{}",
        "🌟 Curiosity Explorer - Ask Me Anything! 🌟"
            .bright_magenta()
            .bold()
    );
    println!("{}", "=".repeat(45));
    println!("Hi! I'm here to answer your questions!");
    println!("\nCommands:");
    println!("  Type a question and press Enter");
    if capture_available {
        println!("  Type 'voice' to ask with your voice");
    }
    println!("  Type 'mute' to turn off voice");
    println!("  Type 'unmute' to turn on voice");
    println!("  Type 'clear' to start fresh");
    println!("  Type 'quit' to exit");
    println!("{}", "=".repeat(45));
}

/// The interactive command loop. Ctrl-C and end-of-input end the session
/// the same way `quit` does.
async fn run(
    session: &mut Session,
    speaker: &Arc<Speaker>,
    listener: &Listener,
    capture_available: bool,
) -> anyhow::Result<()> {
    let mut rl = rustyline::DefaultEditor::new()?;

    loop {
        match rl.readline("\n🧒 You: ") {
            Ok(line) => {
                let _ = rl.add_history_entry(&line);
                match Command::parse(&line) {
                    Command::Quit => {
                        println!("\n{}\n", FAREWELL.bright_green());
                        break;
                    }
                    Command::Clear => {
                        session.clear_history();
                        println!(
                            "\n{}\n",
                            "✨ Starting fresh! Ask me anything!".bright_yellow()
                        );
                    }
                    Command::Mute => {
                        session.set_muted(true);
                        println!("{}", "🔇 Voice muted".bright_black());
                    }
                    Command::Unmute => {
                        session.set_muted(false);
                        println!("{}", "🔊 Voice unmuted".bright_black());
                    }
                    Command::Empty => continue,
                    Command::Voice => {
                        if !capture_available {
                            println!(
                                "{}",
                                "Voice input not available. Please type your question.".yellow()
                            );
                            continue;
                        }
                        println!("{}", "🎤 Listening... (speak now)".bright_cyan());
                        match listener.listen().await {
                            Ok(ListenOutcome::Heard(text)) => {
                                println!("You said: {}", text.green());
                                answer(session, speaker, &text).await;
                            }
                            Ok(ListenOutcome::Timeout) => {
                                println!("{}", "No speech detected. Try again!".yellow());
                            }
                            Ok(ListenOutcome::Unintelligible) => {
                                println!("{}", "Couldn't understand. Try again!".yellow());
                            }
                            Err(e) => {
                                println!("{}", format!("Speech service error: {e}").red());
                            }
                        }
                    }
                    Command::Ask(question) => answer(session, speaker, &question).await,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\n{}\n", FAREWELL.bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Input error: {err:?}").red());
                break;
            }
        }
    }
    Ok(())
}

/// Answers one question and, when speech is on, starts saying it without
/// holding up the next prompt.
async fn answer(session: &mut Session, speaker: &Arc<Speaker>, question: &str) {
    println!("\n{}", "🤔 Thinking...".bright_black());
    let reply = session.ask(question).await;
    println!("\n🌟 Answer: {}", reply.bright_blue());

    if let Some(clean) = session.speech_payload(&reply) {
        let speaker = Arc::clone(speaker);
        tokio::spawn(async move {
            if let Err(e) = speaker.say(&clean).await {
                println!(
                    "{}",
                    format!("(Voice unavailable: {})", truncate_chars(&e.to_string(), 30))
                        .bright_black()
                );
            }
        });
    }
}
