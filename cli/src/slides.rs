//! Presentation adapter: speaker notes and slide navigation.
//!
//! The console reaches the presentation only through [`SlideDeck`]. Two decks
//! ship: [`UnavailableDeck`] when nothing is configured, and [`NotesFileDeck`]
//! for a plain-text notes file with one section per slide.
//!
//! A notes file separates slides with lines containing only `---`. The current
//! slide index is kept in a sibling `<notes>.cursor` file so `next` and `prev`
//! carry over between console invocations.

#[cfg(test)]
#[path = "slides_test.rs"]
mod slides_test;

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SlideError {
    #[error("no presentation is available")]
    Unavailable,
    #[error("notes file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Capability interface to a running presentation.
pub trait SlideDeck {
    /// Zero-based index and speaker notes of the current slide, or `None`
    /// when no presentation is available.
    fn current_notes(&self) -> Option<(usize, String)>;

    /// Move back one slide. Stays put on the first slide.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError`] if the presentation cannot be driven.
    fn go_previous(&mut self) -> Result<usize, SlideError>;

    /// Move forward one slide. Stays put on the last slide.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError`] if the presentation cannot be driven.
    fn go_next(&mut self) -> Result<usize, SlideError>;
}

/// A deck for hosts with no presentation attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableDeck;

impl SlideDeck for UnavailableDeck {
    fn current_notes(&self) -> Option<(usize, String)> {
        None
    }

    fn go_previous(&mut self) -> Result<usize, SlideError> {
        Err(SlideError::Unavailable)
    }

    fn go_next(&mut self) -> Result<usize, SlideError> {
        Err(SlideError::Unavailable)
    }
}

/// Speaker notes read from a text file.
#[derive(Debug, Clone)]
pub struct NotesFileDeck {
    slides: Vec<String>,
    index: usize,
    cursor_path: PathBuf,
}

impl NotesFileDeck {
    /// Load notes from `path` and restore the saved position.
    ///
    /// # Errors
    ///
    /// Returns [`SlideError::Io`] if the notes file cannot be read.
    pub fn open(path: &Path) -> Result<Self, SlideError> {
        let text = std::fs::read_to_string(path).map_err(|source| SlideError::Io { path: path.to_path_buf(), source })?;
        let slides = split_notes(&text);
        let cursor_path = cursor_path(path);
        let index = read_cursor(&cursor_path).min(slides.len().saturating_sub(1));
        Ok(Self { slides, index, cursor_path })
    }

    fn move_to(&mut self, index: usize) -> Result<usize, SlideError> {
        self.index = index;
        std::fs::write(&self.cursor_path, index.to_string())
            .map_err(|source| SlideError::Io { path: self.cursor_path.clone(), source })?;
        Ok(index)
    }
}

impl SlideDeck for NotesFileDeck {
    fn current_notes(&self) -> Option<(usize, String)> {
        self.slides.get(self.index).map(|notes| (self.index, notes.clone()))
    }

    fn go_previous(&mut self) -> Result<usize, SlideError> {
        self.move_to(self.index.saturating_sub(1))
    }

    fn go_next(&mut self) -> Result<usize, SlideError> {
        let last = self.slides.len().saturating_sub(1);
        self.move_to((self.index + 1).min(last))
    }
}

/// Split a notes file into per-slide sections, trimming each.
fn split_notes(text: &str) -> Vec<String> {
    let mut slides = vec![String::new()];
    for line in text.lines() {
        if line.trim() == "---" {
            slides.push(String::new());
            continue;
        }
        if let Some(current) = slides.last_mut() {
            if !current.is_empty() {
                current.push('\n');
            }
            current.push_str(line);
        }
    }
    slides.into_iter().map(|s| s.trim().to_owned()).collect()
}

fn cursor_path(notes: &Path) -> PathBuf {
    let mut name = notes.file_name().map(std::ffi::OsStr::to_os_string).unwrap_or_default();
    name.push(".cursor");
    notes.with_file_name(name)
}

fn read_cursor(path: &Path) -> usize {
    match std::fs::read_to_string(path) {
        Ok(text) => text.trim().parse().unwrap_or(0),
        Err(e) if e.kind() == ErrorKind::NotFound => 0,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "slide cursor unreadable, starting at first slide");
            0
        }
    }
}
