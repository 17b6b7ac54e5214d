//! Moderation filter: substring screening and length truncation for comment
//! text.
//!
//! DESIGN
//! ======
//! Both rules are pure functions over borrowed input so the hub can apply them
//! inline on its own task. Matching is exact, case-sensitive substring
//! containment with no normalisation; an empty banned entry never matches.
//!
//! Lengths are counted in UTF-16 code units, the unit browsers measure string
//! length in. A surrogate pair that would straddle the limit is dropped whole.

#[cfg(test)]
#[path = "moderation_test.rs"]
mod moderation_test;

use protocol::MAX_COMMENT_UNITS;

/// Why a submission was not broadcast. Never reported to the sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// `text` was missing or empty.
    EmptyText,
    /// The truncated text contains this banned term.
    Banned(String),
}

/// `true` if any non-empty entry of `banned` occurs in `text`.
#[must_use]
pub fn is_rejected(text: &str, banned: &[String]) -> bool {
    first_match(text, banned).is_some()
}

fn first_match<'a>(text: &str, banned: &'a [String]) -> Option<&'a str> {
    banned
        .iter()
        .map(String::as_str)
        .find(|term| !term.is_empty() && text.contains(term))
}

/// Longest prefix of `text` that is at most `max_units` UTF-16 code units.
#[must_use]
pub fn truncate_utf16(text: &str, max_units: usize) -> &str {
    let mut units = 0;
    for (index, ch) in text.char_indices() {
        units += ch.len_utf16();
        if units > max_units {
            return &text[..index];
        }
    }
    text
}

/// Apply the full submission rule: non-empty, truncated, then screened.
///
/// # Errors
///
/// Returns the [`Rejection`] when the comment must not be broadcast.
pub fn screen(text: Option<&str>, banned: &[String]) -> Result<String, Rejection> {
    let text = text.filter(|t| !t.is_empty()).ok_or(Rejection::EmptyText)?;
    let truncated = truncate_utf16(text, MAX_COMMENT_UNITS);
    if let Some(term) = first_match(truncated, banned) {
        return Err(Rejection::Banned(term.to_owned()));
    }
    Ok(truncated.to_owned())
}
