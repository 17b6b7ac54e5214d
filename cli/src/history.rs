//! Comment history log, one line per broadcast comment.

#[cfg(test)]
#[path = "history_test.rs"]
mod history_test;

use protocol::CommentSubmission;
use time::OffsetDateTime;
use time::macros::format_description;

/// Wall-clock time for a history line. Falls back to UTC where the local
/// offset cannot be determined.
pub fn now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// `HH:MM:SS [fixed] text (color)` for a comment received at `at`.
///
/// Returns `None` for comments without text.
pub fn format_entry(comment: &CommentSubmission, at: OffsetDateTime) -> Option<String> {
    let text = comment.text.as_deref()?;
    let clock = at
        .format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_else(|_| "--:--:--".to_owned());

    let mut line = clock;
    if comment.is_fixed {
        line.push_str(" [fixed]");
    }
    line.push(' ');
    line.push_str(text);
    if let Some(color) = &comment.color {
        line.push_str(" (");
        line.push_str(color);
        line.push(')');
    }
    Some(line)
}
