//! Session state and the answer pipeline.
//!
//! A [`Session`] owns the dialogue history and the muted flag, and runs each
//! question through the shaping policy: fixed instruction payload, windowed
//! history, bounded response length, fixed temperature. This is the only
//! layer that converts completion failures into benign user-facing text.

use crate::history::{DialogueHistory, Turn};
use crate::llm_client::LLMClient;
use crate::sanitize::sanitize_for_speech;
use std::sync::Arc;
use tracing::{debug, warn};

/// Instruction payload sent with every completion request. Tuned for
/// answers a five-to-seven-year-old can follow.
pub const SYSTEM_PROMPT: &str = "\
You are a friendly helper for a 5-6 year old child.

STRICT RULES:
1. ONLY give the answer. NEVER ask a question back.
2. NO follow-up questions. NO \"Do you know...?\" NO \"Can you...?\" NO \"What do you think...?\"
3. End with a statement, NOT a question.

HOW TO TALK:
- Simple words only (say \"big\" not \"large\")
- Compare to kid things (big as a bus)
- Say \"Wow!\" or \"Cool!\" to be fun
- Short sentences (5-7 words max)

GOOD EXAMPLES:
Kid: \"How many moons does Saturn have?\"
You: \"Wow, Saturn has 146 moons! That is so many!\"

Kid: \"Why is the sky blue?\"
You: \"Light from the sun bounces in the air. Blue bounces the most!\"

BAD (never do this):
\"Can you guess?\"
\"Do you know what else?\"
\"What do you think?\"

REMEMBER: Answer only. No questions. End with a period or exclamation mark.";

/// Number of most-recent turns included in each completion request.
pub const HISTORY_WINDOW: usize = 6;

/// Response length ceiling, in tokens.
pub const MAX_ANSWER_TOKENS: u32 = 150;

/// Sampling temperature for every request.
pub const ANSWER_TEMPERATURE: f32 = 0.7;

/// Reply for an empty or whitespace-only question. No remote call is made.
pub const EMPTY_QUESTION_REPLY: &str = "Please ask me something!";

/// Truncates a diagnostic to at most `max` characters, on a char boundary.
pub fn truncate_chars(message: &str, max: usize) -> &str {
    match message.char_indices().nth(max) {
        Some((idx, _)) => &message[..idx],
        None => message,
    }
}

/// The single mutable session context: dialogue history plus the muted flag.
/// Created once a credential has been resolved and owned by the controller
/// for the process lifetime.
pub struct Session {
    client: Arc<dyn LLMClient>,
    history: DialogueHistory,
    muted: bool,
}

impl Session {
    pub fn new(client: Arc<dyn LLMClient>) -> Self {
        Self {
            client,
            history: DialogueHistory::new(),
            muted: false,
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn history(&self) -> &DialogueHistory {
        &self.history
    }

    /// Forgets the conversation so far.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Runs one question through the answer pipeline and always returns
    /// something printable.
    ///
    /// On success the exchange is recorded in the history. On completion
    /// failure the pending user turn is rolled back and the returned
    /// fallback embeds a truncated diagnostic; the history keeps only
    /// completed exchanges either way.
    pub async fn ask(&mut self, question: &str) -> String {
        let question = question.trim();
        if question.is_empty() {
            return EMPTY_QUESTION_REPLY.to_string();
        }

        self.history.append(Turn::user(question));

        let result = self
            .client
            .complete(
                SYSTEM_PROMPT,
                self.history.windowed(HISTORY_WINDOW),
                MAX_ANSWER_TOKENS,
                ANSWER_TEMPERATURE,
            )
            .await;

        match result {
            Ok(answer) => {
                let answer = answer.trim().to_string();
                debug!(turns = self.history.len(), "Completion succeeded");
                self.history.append(Turn::assistant(answer.clone()));
                answer
            }
            Err(e) => {
                warn!(error = %e, "Completion failed; dropping the pending turn");
                self.history.retract_last();
                format!(
                    "Oops! Something went wrong. Let's try again! ({})",
                    truncate_chars(&e.to_string(), 50)
                )
            }
        }
    }

    /// What should be spoken for `answer`, if anything.
    ///
    /// Returns `None` when the session is muted or when nothing speakable
    /// remains after sanitizing; the caller then skips synthesis entirely.
    pub fn speech_payload(&self, answer: &str) -> Option<String> {
        if self.muted {
            return None;
        }
        let clean = sanitize_for_speech(answer);
        if clean.is_empty() { None } else { Some(clean) }
    }
}
