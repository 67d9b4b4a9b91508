//! Format trait and implementations for different document types.
//!
//! This module defines the `Format` trait which abstracts over document formats by providing
//! the tree-sitter grammar and the queries that locate headings, taggable blocks and code
//! (where embeds are not recognised) in that grammar.

pub mod markdown;

/// Tree-sitter grammar plus the structural queries run against it.
pub trait Format {
    /// Grammar used to parse documents of this format.
    fn language(&self) -> tree_sitter::Language;
    /// Query capturing every heading node as `@heading`.
    fn heading_query(&self) -> &str;
    /// Query capturing every node that can carry a `^block-id` as `@block`.
    fn block_query(&self) -> &str;
    /// Query capturing literal code regions as `@code`.
    fn code_query(&self) -> &str;
    /// Query capturing the inline-content regions of the block grammar as `@inline`.
    fn inline_query(&self) -> &str;
    /// Grammar for the text inside `@inline` regions.
    fn inline_language(&self) -> tree_sitter::Language;
    /// Query against the inline grammar capturing code spans as `@code`.
    fn inline_code_query(&self) -> &str;
    /// Extensions (without dot) of files in this format.
    fn extensions(&self) -> &[&str];
}
