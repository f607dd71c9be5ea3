//! Dialogue History Store
//!
//! Keeps the ordered record of everything said in the current session. The
//! full transcript is retained for the process lifetime, but only a sliding
//! window of the most recent turns is ever sent to the model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// One message exchanged in the dialogue. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Ordered, unbounded store of turns with windowed read access.
///
/// Mutation happens on a single control thread, so no interior locking is
/// needed here.
#[derive(Debug, Clone, Default)]
pub struct DialogueHistory {
    turns: Vec<Turn>,
}

impl DialogueHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a turn to the end of the transcript. Storage is unbounded.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Returns the last `n` turns in original order, or all of them when
    /// fewer than `n` exist.
    pub fn windowed(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Removes and returns the most recent turn, if any.
    ///
    /// Used to back out a user turn whose exchange never completed, so the
    /// window only ever contains paired question/answer turns.
    pub fn retract_last(&mut self) -> Option<Turn> {
        self.turns.pop()
    }

    /// Empties the transcript. Idempotent.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(n: usize) -> DialogueHistory {
        let mut history = DialogueHistory::new();
        for i in 0..n {
            if i % 2 == 0 {
                history.append(Turn::user(format!("question {i}")));
            } else {
                history.append(Turn::assistant(format!("answer {i}")));
            }
        }
        history
    }

    #[test]
    fn test_windowed_returns_last_min_n_in_order() {
        for len in 0..10 {
            let history = filled(len);
            let window = history.windowed(6);
            assert_eq!(window.len(), len.min(6));

            // The window must be a suffix of the transcript, in order.
            let expected_start = len.saturating_sub(6);
            for (offset, turn) in window.iter().enumerate() {
                let i = expected_start + offset;
                assert!(turn.content.ends_with(&i.to_string()));
            }
        }
    }

    #[test]
    fn test_windowed_smaller_than_n_returns_all() {
        let history = filled(3);
        assert_eq!(history.windowed(6).len(), 3);
        assert_eq!(history.windowed(6)[0].content, "question 0");
    }

    #[test]
    fn test_clear_then_windowed_is_empty() {
        let mut history = filled(8);
        history.clear();
        for n in [0, 1, 6, 100] {
            assert!(history.windowed(n).is_empty());
        }
        // Clearing again is a no-op.
        history.clear();
        assert!(history.is_empty());
    }

    #[test]
    fn test_retract_last_removes_only_the_tail() {
        let mut history = filled(4);
        let retracted = history.retract_last().unwrap();
        assert_eq!(retracted.role, Role::Assistant);
        assert_eq!(history.len(), 3);
        assert_eq!(history.windowed(6).last().unwrap().content, "question 2");

        history.clear();
        assert!(history.retract_last().is_none());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
    }
}
