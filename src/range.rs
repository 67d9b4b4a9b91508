//! Partitioning a byte range into literal text and embeds, in document order.

use crate::section::EmbedRef;

#[derive(Clone, Debug, PartialEq, Eq)]
/// One piece of a partitioned range.
pub enum Span<'a> {
    /// Trimmed, non-empty literal text between embeds.
    Text(&'a str),
    /// An embed lying wholly inside the range.
    Embed(&'a EmbedRef),
}

#[must_use]
/// Splits `text[start..end]` into text spans and the embeds it contains.
///
/// Only embeds entirely inside `[start, end]` are considered; one that straddles either
/// bound, even by a single byte, is not resolved and its markup stays in the neighbouring text
/// span. Embeds are sorted by position first, so callers may pass them in any order.
/// Text between embeds is trimmed and dropped when empty.
pub fn split_range<'a>(
    text: &'a str,
    start: usize,
    end: usize,
    embeds: &'a [EmbedRef],
) -> Vec<Span<'a>> {
    let end = end.min(text.len());
    let mut contained: Vec<&EmbedRef> = embeds
        .iter()
        .filter(|embed| embed.byte_start >= start && embed.byte_end <= end)
        .collect();
    contained.sort_by_key(|embed| embed.byte_start);

    let mut spans = Vec::with_capacity(contained.len() * 2 + 1);
    let mut cursor = start;

    for embed in contained {
        if embed.byte_start > cursor {
            push_text(&mut spans, text, cursor, embed.byte_start);
        }
        spans.push(Span::Embed(embed));
        cursor = cursor.max(embed.byte_end);
    }

    if cursor < end {
        push_text(&mut spans, text, cursor, end);
    }

    spans
}

fn push_text<'a>(spans: &mut Vec<Span<'a>>, text: &'a str, from: usize, to: usize) {
    let trimmed = text.get(from..to).unwrap_or_default().trim();
    if !trimmed.is_empty() {
        spans.push(Span::Text(trimmed));
    }
}

#[cfg(test)]
#[path = "tests/range.rs"]
mod tests;
