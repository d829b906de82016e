//! In-memory text documents with offset/position conversion

use crate::types::{Language, Position};
use std::path::{Path, PathBuf};

/// A source file as handed over by the document provider.
///
/// Offsets are counted in Unicode scalar values, matching `Position::character`.
#[derive(Debug, Clone)]
pub struct TextDocument {
    path: PathBuf,
    text: String,
    language_id: String,
    /// Character offset at which each line starts
    line_starts: Vec<usize>,
    /// Byte offset of every character; empty for ASCII text
    char_byte_offsets: Vec<usize>,
    char_len: usize,
}

impl TextDocument {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>, language_id: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        let mut char_byte_offsets = Vec::new();
        let ascii = text.is_ascii();
        let mut char_len = 0;
        for (byte_offset, ch) in text.char_indices() {
            if !ascii {
                char_byte_offsets.push(byte_offset);
            }
            char_len += 1;
            if ch == '\n' {
                line_starts.push(char_len);
            }
        }

        Self {
            path: path.into(),
            text,
            language_id: language_id.into(),
            line_starts,
            char_byte_offsets,
            char_len,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language_id(&self) -> &str {
        &self.language_id
    }

    pub fn language(&self) -> Option<Language> {
        Language::from_id(&self.language_id)
    }

    /// Length of the document in characters
    pub fn len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    /// Position of a character offset. Offsets past the end clamp to the end.
    pub fn position_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.char_len);
        let line = self.line_starts.partition_point(|&start| start <= offset) - 1;
        Position {
            line: line as u32,
            character: (offset - self.line_starts[line]) as u32,
        }
    }

    /// Character offset of a position. Lines and columns past the end clamp.
    pub fn offset_at(&self, position: Position) -> usize {
        let line = position.line as usize;
        if line >= self.line_starts.len() {
            return self.char_len;
        }
        let start = self.line_starts[line];
        let max_column = match self.line_starts.get(line + 1) {
            // Up to and including the newline itself
            Some(next) => next - start - 1,
            None => self.char_len - start,
        };
        start + (position.character as usize).min(max_column)
    }

    /// Convert a byte offset (as reported by tree-sitter) into a character offset.
    ///
    /// A byte offset inside a multi-byte character maps to the character after it.
    pub fn char_offset(&self, byte_offset: usize) -> usize {
        let byte_offset = byte_offset.min(self.text.len());
        if self.char_byte_offsets.is_empty() {
            return byte_offset;
        }
        self.char_byte_offsets.partition_point(|&start| start < byte_offset)
    }
}
