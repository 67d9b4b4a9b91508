//! Lookups over the flat heading list: which headings enclose a line, and what text each owns.
//!
//! The hierarchy is never materialised as a tree. A heading's parent is simply the nearest
//! preceding heading with a strictly smaller level, so `# A` followed by `#### B` makes B a
//! direct child of A.

use crate::section::{Heading, TextPosition};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// The half-open byte span owned by one heading, excluding the heading line itself.
pub struct HeadingRange {
    /// First byte after the heading line's terminator.
    pub content_start: usize,
    /// One byte before the next heading starts, or the end of the document.
    pub content_end: usize,
    /// Editor coordinates of `content_end`, where a reply to this heading would be written.
    pub range_end: TextPosition,
}

impl HeadingRange {
    #[must_use]
    /// Slice of `text` covered by this range.
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.content_start..self.content_end)
            .unwrap_or_default()
    }
}

#[must_use]
/// Indices of the headings enclosing `cursor_line`, outermost first.
///
/// Scans backwards: the last heading starting at or before the cursor is the innermost entry,
/// and each earlier heading is taken only if it is strictly shallower than the one taken
/// before it. An empty result means the cursor sits above the first heading.
pub fn enclosing_path(headings: &[Heading], cursor_line: usize) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current: Option<&Heading> = None;

    for (index, heading) in headings.iter().enumerate().rev() {
        let accept = match current {
            None => heading.line_start <= cursor_line,
            Some(inner) => heading.line_start < inner.line_start && heading.level < inner.level,
        };
        if accept {
            path.push(index);
            current = Some(heading);
        }
    }

    path.reverse();
    path
}

#[must_use]
/// Content span of `headings[index]` within `text`.
///
/// Content begins one byte past the heading line (skipping its newline) and stops one byte
/// short of the next heading (dropping the separator before it). A heading immediately
/// followed by another heading owns an empty range.
///
/// # Panics
///
/// Panics if `index` is out of bounds.
pub fn heading_range(headings: &[Heading], index: usize, text: &str) -> HeadingRange {
    let content_start = (headings[index].byte_end + 1).min(text.len());
    let content_end = headings
        .get(index + 1)
        .map_or(text.len(), |next| next.byte_start.saturating_sub(1))
        .clamp(content_start, text.len());

    HeadingRange {
        content_start,
        content_end,
        range_end: TextPosition::at(text, content_end),
    }
}

#[cfg(test)]
#[path = "tests/heading_index.rs"]
mod tests;
