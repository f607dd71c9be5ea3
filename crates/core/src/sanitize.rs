//! Speech-text sanitizer.
//!
//! Answers can contain pictographs, links, and markdown that read fine on
//! screen but sound terrible through a synthesizer. `sanitize_for_speech`
//! strips all of that; if nothing speakable remains, callers skip the
//! synthesis call entirely.

use once_cell::sync::Lazy;
use regex::Regex;

static PICTOGRAPHS: Lazy<Regex> = Lazy::new(|| {
    // Symbols and pictographs, misc symbols, dingbats.
    Regex::new(r"[\u{1F300}-\u{1F9FF}\u{2600}-\u{26FF}\u{2700}-\u{27BF}]+").expect("valid regex")
});

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").expect("valid regex"));

static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid regex"));

static WWW: Lazy<Regex> = Lazy::new(|| Regex::new(r"www\.\S+").expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Strips non-speakable content from `text`.
///
/// Markdown links are reduced to their label before bare URLs are removed,
/// so the label survives while its target does not. Repeated whitespace is
/// collapsed last and the result is trimmed; it may be empty.
pub fn sanitize_for_speech(text: &str) -> String {
    let text = PICTOGRAPHS.replace_all(text, "");
    let text = MARKDOWN_LINK.replace_all(&text, "$1");
    let text = URL.replace_all(&text, "");
    let text = WWW.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}
