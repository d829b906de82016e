use serde::{Deserialize, Serialize};

use super::position::Position;
use crate::document::TextDocument;

/// A region of a document expressed as absolute character offsets.
///
/// This is the canonical form every component works with internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRange {
    pub position_start: usize,
    pub position_end: usize,
}

impl SourceRange {
    /// Range between two offsets, given in either order
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            position_start: a.min(b),
            position_end: a.max(b),
        }
    }

    pub fn len(&self) -> usize {
        self.position_end.saturating_sub(self.position_start)
    }

    pub fn is_empty(&self) -> bool {
        self.position_start == self.position_end
    }

    /// Check if an offset falls inside this range (end inclusive)
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.position_start && offset <= self.position_end
    }
}

/// The two shapes a handler range can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandlerRange {
    Offsets(SourceRange),
    Positions { start: Position, end: Position },
}

impl HandlerRange {
    /// Convert either shape into absolute offsets within `document`.
    pub fn normalize(&self, document: &TextDocument) -> SourceRange {
        match *self {
            HandlerRange::Offsets(range) => {
                SourceRange::new(range.position_start, range.position_end)
            }
            HandlerRange::Positions { start, end } => {
                SourceRange::new(document.offset_at(start), document.offset_at(end))
            }
        }
    }
}

impl From<SourceRange> for HandlerRange {
    fn from(range: SourceRange) -> Self {
        HandlerRange::Offsets(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reversed_positions_are_ordered() {
        let doc = TextDocument::new("app.js", "ab\ncdef\n", "javascript");
        let range = HandlerRange::Positions {
            start: Position::new(1, 3),
            end: Position::new(0, 1),
        };
        assert_eq!(range.normalize(&doc), SourceRange::new(1, 6));
        assert_eq!(range.normalize(&doc).len(), 5);
    }

    #[test]
    fn test_reversed_offsets_from_serde() {
        let range: SourceRange =
            serde_json::from_str(r#"{"position_start": 9, "position_end": 4}"#).unwrap();
        assert_eq!(range.len(), 0);
        assert!(!range.contains(5));

        let doc = TextDocument::new("a.py", "", "python");
        let normalized = HandlerRange::Offsets(range).normalize(&doc);
        assert_eq!(normalized, SourceRange { position_start: 4, position_end: 9 });
        assert_eq!(normalized.len(), 5);
    }
}
