//! Source positions and byte-offset to line mapping.

use std::ops::Range;

/// A point in the source text (1-based line and column).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Line number, starting at 1.
    pub line: usize,
    /// Column number in bytes, starting at 1.
    pub column: usize,
}

/// Span of a node in the source text.
///
/// `end` points just past the last character of the node's content,
/// trailing newlines excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// First character of the node.
    pub start: Point,
    /// One past the last character of the node.
    pub end: Point,
}

impl Position {
    /// Span covering both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

/// Maps byte offsets of a source text to line/column points.
#[derive(Debug)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Build the index for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { line_starts }
    }

    /// Point for a byte offset.
    #[must_use]
    pub fn point(&self, offset: usize) -> Point {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        Point {
            line,
            column: offset - line_start + 1,
        }
    }

    /// Position of a byte range of `text`, ignoring trailing line breaks.
    #[must_use]
    pub fn position(&self, text: &str, range: Range<usize>) -> Position {
        let start = self.point(range.start);
        let content = text
            .get(range.clone())
            .unwrap_or_default()
            .trim_end_matches(['\n', '\r']);
        if content.is_empty() {
            return Position { start, end: start };
        }
        let end_offset = range.start + content.len();
        let last = self.point(end_offset - 1);
        Position {
            start,
            end: Point {
                line: last.line,
                column: last.column + 1,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_first_line() {
        let index = LineIndex::new("abc\ndef\n");
        assert_eq!(index.point(0), Point { line: 1, column: 1 });
        assert_eq!(index.point(2), Point { line: 1, column: 3 });
    }

    #[test]
    fn test_point_after_newline() {
        let index = LineIndex::new("abc\ndef\n");
        assert_eq!(index.point(3), Point { line: 1, column: 4 });
        assert_eq!(index.point(4), Point { line: 2, column: 1 });
    }

    #[test]
    fn test_position_excludes_trailing_newlines() {
        let text = "para one\n\n\nnext\n";
        let index = LineIndex::new(text);
        let position = index.position(text, 0..11);
        assert_eq!(position.start.line, 1);
        assert_eq!(position.end.line, 1);
        assert_eq!(position.end.column, 9);
    }

    #[test]
    fn test_position_multiline() {
        let text = "a\nb\nc\n";
        let index = LineIndex::new(text);
        let position = index.position(text, 0..text.len());
        assert_eq!(position.start.line, 1);
        assert_eq!(position.end.line, 3);
    }

    #[test]
    fn test_position_empty_range() {
        let text = "a\n";
        let index = LineIndex::new(text);
        let position = index.position(text, 1..2);
        assert_eq!(position.start, position.end);
    }
}
