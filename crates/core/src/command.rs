//! Session command vocabulary.
//!
//! User input is resolved into a closed set of commands exactly once, at
//! parse time; the controller dispatches on the variant rather than
//! re-inspecting strings.

/// A single line of user input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// End the session (`quit`, `exit`, `bye`, `q`).
    Quit,
    /// Forget the conversation so far.
    Clear,
    /// Stop speaking answers aloud.
    Mute,
    /// Resume speaking answers aloud.
    Unmute,
    /// Capture a spoken question from the microphone.
    Voice,
    /// Blank line; the controller re-prompts.
    Empty,
    /// Anything else is a question for the model, original casing preserved.
    Ask(String),
}

impl Command {
    /// Classifies one input line. Keywords match case-insensitively after
    /// trimming; question text keeps its original form.
    pub fn parse(line: &str) -> Command {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Command::Empty;
        }
        match trimmed.to_lowercase().as_str() {
            "quit" | "exit" | "bye" | "q" => Command::Quit,
            "clear" => Command::Clear,
            "mute" => Command::Mute,
            "unmute" => Command::Unmute,
            "voice" => Command::Voice,
            _ => Command::Ask(trimmed.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_aliases() {
        for line in ["quit", "exit", "bye", "q", "QUIT", " Exit ", "Q"] {
            assert_eq!(Command::parse(line), Command::Quit, "line: {line:?}");
        }
    }

    #[test]
    fn test_state_commands_case_insensitive() {
        assert_eq!(Command::parse("clear"), Command::Clear);
        assert_eq!(Command::parse("MUTE"), Command::Mute);
        assert_eq!(Command::parse("Unmute"), Command::Unmute);
        assert_eq!(Command::parse("  voice"), Command::Voice);
    }

    #[test]
    fn test_empty_and_whitespace_lines() {
        assert_eq!(Command::parse(""), Command::Empty);
        assert_eq!(Command::parse("   \t "), Command::Empty);
    }

    #[test]
    fn test_questions_keep_their_casing() {
        assert_eq!(
            Command::parse("  Why is the sky Blue? "),
            Command::Ask("Why is the sky Blue?".to_string())
        );
    }

    #[test]
    fn test_keyword_inside_a_question_is_not_a_command() {
        assert_eq!(
            Command::parse("why do we say bye?"),
            Command::Ask("why do we say bye?".to_string())
        );
    }
}
