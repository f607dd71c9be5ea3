//! Curio session core.
//!
//! Everything stateful about a question-and-answer session lives here:
//! command classification, dialogue history with windowed reads, credential
//! resolution, the answer shaping pipeline, and the sanitizer that prepares
//! answers for speech synthesis. Talking to the network happens behind the
//! [`llm_client::LLMClient`] seam; the binary wires in the real client.

pub mod command;
pub mod credential;
pub mod history;
pub mod llm_client;
pub mod sanitize;
pub mod session;

pub use command::Command;
pub use history::{DialogueHistory, Role, Turn};
pub use session::Session;
