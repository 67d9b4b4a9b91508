//! Structural index of a markdown document.
//!
//! A document is described by a flat, document-ordered list of headings (the tree is implicit
//! in their levels), the embeds found in its text, and the named blocks that embeds elsewhere
//! can point at. Offsets are byte offsets into the document text and lines are 0-based.

use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// An ATX heading with precise coordinates of its heading line.
pub struct Heading {
    /// Nesting depth, the number of leading `#` (1 for top-level).
    pub level: usize,
    /// Heading text without markup symbols.
    pub title: String,
    /// Line the heading starts on.
    pub line_start: usize,
    /// Line the heading ends on (ATX headings occupy a single line).
    pub line_end: usize,
    /// Byte offset of the first character of the heading line.
    pub byte_start: usize,
    /// Byte offset just past the heading text, excluding the line terminator.
    pub byte_end: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// An inline reference to another resource, such as `![[note]]` or `![](image.png)`.
pub struct EmbedRef {
    /// Raw link text, possibly carrying a `#subpath` and an `|alias`.
    pub link_target: String,
    /// Byte offset of the leading `!`.
    pub byte_start: usize,
    /// Byte offset just past the closing bracket.
    pub byte_end: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A paragraph tagged with a trailing `^id`, addressable as `#^id`.
pub struct Block {
    /// Identifier without the caret.
    pub id: String,
    /// Byte offset where the paragraph begins.
    pub byte_start: usize,
    /// Byte offset just past the `^id` marker.
    pub byte_end: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Everything the thread builder needs to know about a document's structure.
pub struct DocumentMetadata {
    /// Headings in document order.
    pub headings: Vec<Heading>,
    /// Embeds in document order.
    pub embeds: Vec<EmbedRef>,
    /// Named blocks in document order.
    pub blocks: Vec<Block>,
    /// Length of the text the metadata was extracted from.
    pub text_len: usize,
}

impl DocumentMetadata {
    /// Index of the first heading after `index` that closes its subtree.
    fn subtree_end(&self, index: usize) -> usize {
        let level = self.headings[index].level;
        ((index + 1)..self.headings.len())
            .find(|&i| self.headings[i].level <= level)
            .unwrap_or(self.headings.len())
    }

    #[must_use]
    /// Resolves a `#Heading`, `#Parent#Child` or `#^block` subpath to a byte range.
    ///
    /// A heading resolves to its whole subtree: from the heading line up to the next heading
    /// of the same or a shallower level, or the end of the document. Heading segments are
    /// compared trimmed and case-insensitively, each one searched inside the subtree of the
    /// previous match.
    pub fn resolve_subpath(&self, subpath: &str) -> Option<Range<usize>> {
        let subpath = subpath.trim().trim_start_matches('#');

        if let Some(id) = subpath.strip_prefix('^') {
            return self
                .blocks
                .iter()
                .find(|block| block.id == id.trim())
                .map(|block| block.byte_start..block.byte_end);
        }

        let mut window = 0..self.headings.len();
        let mut matched = None;

        for segment in subpath.split('#').map(str::trim).filter(|s| !s.is_empty()) {
            let index = window
                .clone()
                .find(|&i| self.headings[i].title.trim().eq_ignore_ascii_case(segment))?;
            window = (index + 1)..self.subtree_end(index);
            matched = Some(index);
        }

        let index = matched?;
        let end = self
            .headings
            .get(self.subtree_end(index))
            .map_or(self.text_len, |next| next.byte_start);
        Some(self.headings[index].byte_start..end)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// A link split into the file it names and an optional subpath.
pub struct LinkTarget<'a> {
    /// File part of the link, without subpath or alias.
    pub path: &'a str,
    /// Subpath including its leading `#`, if any.
    pub subpath: Option<&'a str>,
}

impl<'a> LinkTarget<'a> {
    #[must_use]
    /// Splits `Note#Heading|alias` into `Note` and `#Heading`, dropping the alias.
    pub fn parse(link: &'a str) -> Self {
        let link = link.split('|').next().unwrap_or_default().trim();
        match link.find('#') {
            Some(pos) => Self {
                path: link[..pos].trim(),
                subpath: Some(&link[pos..]),
            },
            None => Self {
                path: link,
                subpath: None,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A byte offset together with the editor coordinates it corresponds to.
pub struct TextPosition {
    /// Byte offset into the document text.
    pub offset: usize,
    /// 0-based line.
    pub line: usize,
    /// Byte column within the line.
    pub column: usize,
}

impl TextPosition {
    #[must_use]
    /// Locates `offset` in `text`, clamping it to the text length.
    pub fn at(text: &str, offset: usize) -> Self {
        let offset = offset.min(text.len());
        let before = &text.as_bytes()[..offset];
        let line = before.iter().filter(|&&b| b == b'\n').count();
        let line_start = before
            .iter()
            .rposition(|&b| b == b'\n')
            .map_or(0, |pos| pos + 1);
        Self {
            offset,
            line,
            column: offset - line_start,
        }
    }
}

#[cfg(test)]
#[path = "tests/section.rs"]
mod tests;
