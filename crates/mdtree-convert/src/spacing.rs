//! Blank-line reconstruction between top-level blocks.
//!
//! The editor stores deliberate vertical space as empty paragraphs, and the
//! markdown writer emits each one as two extra blank lines. Reading back,
//! a gap of `d` lines between the end of one block and the start of the next
//! (`d >= 4`) becomes `(d - 2) / 2` empty paragraphs. A normal single blank
//! line (`d == 2`) and small irregular gaps produce none.

use mdtree_ast::Node as SourceNode;

/// Number of empty paragraphs for a line gap.
pub(crate) fn blank_paragraph_count(gap: usize) -> usize {
    if gap >= 4 { (gap - 2) / 2 } else { 0 }
}

/// Empty paragraphs to insert between two adjacent top-level siblings.
///
/// Zero when either node lacks a position.
pub(crate) fn blank_paragraphs_between(previous: &SourceNode, current: &SourceNode) -> usize {
    let (Some(end), Some(start)) = (previous.end_line(), current.start_line()) else {
        return 0;
    };
    let count = blank_paragraph_count(start.saturating_sub(end));
    if count > 0 {
        tracing::trace!(end, start, count, "Reconstructing blank lines");
    }
    count
}
