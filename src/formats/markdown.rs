//! Markdown format implementation using tree-sitter-md.
//!
//! This module provides tree-sitter queries for parsing markdown documents and extracting
//! structure from ATX-style headings (# syntax). Setext headings are deliberately absent: a
//! conversation turn is only ever opened by a `#` heading.

use crate::formats::Format;

/// Tree-sitter queries for ATX-style markdown headings (# syntax).
pub struct MarkdownFormat;

impl Format for MarkdownFormat {
    fn language(&self) -> tree_sitter::Language {
        tree_sitter_md::LANGUAGE.into()
    }

    fn heading_query(&self) -> &'static str {
        "(atx_heading) @heading"
    }

    fn block_query(&self) -> &'static str {
        "(paragraph) @block"
    }

    fn code_query(&self) -> &'static str {
        "[(fenced_code_block) (indented_code_block)] @code"
    }

    fn inline_query(&self) -> &'static str {
        "(inline) @inline"
    }

    fn inline_language(&self) -> tree_sitter::Language {
        tree_sitter_md::INLINE_LANGUAGE.into()
    }

    fn inline_code_query(&self) -> &'static str {
        "(code_span) @code"
    }

    fn extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }
}
