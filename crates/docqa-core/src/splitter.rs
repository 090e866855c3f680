//! Recursive character text splitter.
//!
//! Splits text into windows of at most `chunk_size` characters, preferring
//! the most structural separator that occurs in the text and recursing into
//! finer separators only for pieces that are still too large. Consecutive
//! windows share up to `chunk_overlap` characters of context.
//!
//! # Algorithm
//!
//! 1. Pick the first separator that occurs in the text. The empty separator
//!    always matches and splits into single characters.
//! 2. Split on it, keeping each separator at the start of the piece that
//!    follows it. Empty pieces are dropped.
//! 3. Pieces shorter than `chunk_size` are buffered. A piece that is not
//!    flushes the buffer through the merge step and is then split again with
//!    the remaining separators, or emitted as-is when none remain.
//! 4. Merging concatenates buffered pieces while the window fits. On
//!    overflow the window is emitted (trimmed, dropped if blank) and pieces
//!    are released from the front until at most `chunk_overlap` characters
//!    remain and the next piece fits.
//!
//! Lengths are measured in Unicode scalar values.
//!
//! # Example
//!
//! ```rust
//! use docqa_core::splitter::RecursiveSplitter;
//!
//! let splitter = RecursiveSplitter::plain_text(7, 0).unwrap();
//! assert_eq!(
//!     splitter.split_text("foo bar baz qux"),
//!     vec!["foo bar", "baz", "qux"],
//! );
//! ```

use regex::Regex;
use thiserror::Error;

use crate::language::{Language, TEXT_SEPARATORS};

#[derive(Debug, Error)]
pub enum SplitterError {
    #[error("chunk_size must be > 0")]
    ZeroChunkSize,

    #[error("chunk_overlap ({overlap}) must not exceed chunk_size ({size})")]
    OverlapTooLarge { overlap: usize, size: usize },

    #[error("invalid separator pattern {pattern:?}: {source}")]
    Separator {
        pattern: String,
        source: regex::Error,
    },
}

#[derive(Debug, Clone)]
enum Separator {
    Pattern(Regex),
    /// The empty separator: split into characters.
    Chars,
}

/// Length-bounded recursive splitter built from an ordered separator list.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    separators: Vec<Separator>,
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveSplitter {
    /// Build a splitter from raw separators.
    ///
    /// When `is_regex` is false each separator is matched literally.
    pub fn new(
        separators: &[&str],
        is_regex: bool,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<Self, SplitterError> {
        if chunk_size == 0 {
            return Err(SplitterError::ZeroChunkSize);
        }
        if chunk_overlap > chunk_size {
            return Err(SplitterError::OverlapTooLarge {
                overlap: chunk_overlap,
                size: chunk_size,
            });
        }

        let separators = separators
            .iter()
            .map(|sep| {
                if sep.is_empty() {
                    return Ok(Separator::Chars);
                }
                let pattern = if is_regex {
                    sep.to_string()
                } else {
                    regex::escape(sep)
                };
                Regex::new(&pattern)
                    .map(Separator::Pattern)
                    .map_err(|source| SplitterError::Separator { pattern, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            separators,
            chunk_size,
            chunk_overlap,
        })
    }

    /// Splitter tuned for a language's syntax.
    pub fn for_language(
        language: Language,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<Self, SplitterError> {
        Self::new(
            language.separators(),
            language.separators_are_regex(),
            chunk_size,
            chunk_overlap,
        )
    }

    /// Generic prose splitter: paragraphs, lines, words, characters.
    pub fn plain_text(chunk_size: usize, chunk_overlap: usize) -> Result<Self, SplitterError> {
        Self::new(TEXT_SEPARATORS, false, chunk_size, chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into trimmed, non-empty windows.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        self.split_recursive(text, &self.separators)
    }

    fn split_recursive(&self, text: &str, separators: &[Separator]) -> Vec<String> {
        let mut chosen = separators.last();
        let mut remaining: &[Separator] = &[];

        for (i, sep) in separators.iter().enumerate() {
            match sep {
                Separator::Chars => {
                    chosen = Some(sep);
                    break;
                }
                Separator::Pattern(re) if re.is_match(text) => {
                    chosen = Some(sep);
                    remaining = &separators[i + 1..];
                    break;
                }
                Separator::Pattern(_) => {}
            }
        }

        let splits = match chosen {
            Some(sep) => split_keep_start(text, sep),
            None => vec![text],
        };

        let mut chunks = Vec::new();
        let mut good: Vec<&str> = Vec::new();

        for piece in splits {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }

            if !good.is_empty() {
                chunks.extend(self.merge_splits(&good));
                good.clear();
            }

            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_recursive(piece, remaining));
            }
        }

        if !good.is_empty() {
            chunks.extend(self.merge_splits(&good));
        }

        chunks
    }

    fn merge_splits(&self, splits: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut window: Vec<&str> = Vec::new();
        let mut start = 0usize;
        let mut total = 0usize;

        for piece in splits {
            let len = char_len(piece);

            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    tracing::warn!(
                        "created a chunk of {} characters, longer than the limit of {}",
                        total,
                        self.chunk_size
                    );
                }
                if start < window.len() {
                    if let Some(doc) = join_window(&window[start..]) {
                        docs.push(doc);
                    }
                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        total -= char_len(window[start]);
                        start += 1;
                    }
                }
            }

            window.push(piece);
            total += len;
        }

        if let Some(doc) = join_window(&window[start..]) {
            docs.push(doc);
        }

        docs
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn join_window(pieces: &[&str]) -> Option<String> {
    let joined = pieces.concat();
    let trimmed = joined.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split `text` so that every match of `sep` begins a new piece.
fn split_keep_start<'a>(text: &'a str, sep: &Separator) -> Vec<&'a str> {
    let re = match sep {
        Separator::Chars => {
            return text
                .char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect();
        }
        Separator::Pattern(re) => re,
    };

    let mut pieces = Vec::new();
    let mut last = 0;
    for m in re.find_iter(text) {
        if m.start() == m.end() {
            continue;
        }
        pieces.push(&text[last..m.start()]);
        last = m.start();
    }
    pieces.push(&text[last..]);
    pieces.retain(|p| !p.is_empty());
    pieces
}
