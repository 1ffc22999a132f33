//! Blank-line segmentation.
//!
//! The boundary is the literal token `"\n\n"`. This is a structural heuristic,
//! not a block parser: a blank line inside a fenced code block or a
//! multi-paragraph list item still splits it.

/// Boundary between two spans.
pub const SPAN_BOUNDARY: &str = "\n\n";

/// Split `text` into spans, left to right, non-overlapping.
///
/// Always returns at least one span; `""` yields `[""]`. Leading, trailing and
/// repeated boundaries produce empty spans, which are kept.
pub(crate) fn split_spans(text: &str) -> Vec<&str> {
    text.split(SPAN_BOUNDARY).collect()
}
