//! Document discovery and structural extraction.
//!
//! Headings and taggable blocks come from the tree-sitter parse, so `#` lines inside code
//! fences never open a turn. Embeds are not part of the CommonMark grammar and are matched
//! with regular expressions, skipping anything that lies inside a code block or code span.

use crate::error::ThreadError;
use crate::formats::Format;
use crate::section::{Block, DocumentMetadata, EmbedRef, Heading};
use regex::Regex;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::{fs, io};
use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Parser, Query, QueryCursor, Tree};
use walkdir::WalkDir;

static WIKI_EMBED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\[\]\n]+?)\]\]").expect("wiki embed pattern is valid"));

static MARKDOWN_EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"!\[[^\]\n]*\]\(\s*<?([^()\s<>]+)>?(?:\s+"[^"\n]*")?\s*\)"#)
        .expect("markdown embed pattern is valid")
});

static BLOCK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)\^([A-Za-z0-9-]+)$").expect("block id pattern is valid"));

/// Collects files under `paths` whose extension is one of `extensions`.
///
/// Directories are walked recursively; explicitly named files are kept when their extension
/// matches. The result is sorted and free of duplicates.
///
/// # Errors
///
/// Returns an error if a named path does not exist.
pub fn find_documents(paths: Vec<PathBuf>, extensions: &[String]) -> io::Result<Vec<PathBuf>> {
    let matches_ext = |path: &Path| {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
    };

    let mut documents = Vec::new();
    for path in paths {
        if path.is_dir() {
            documents.extend(
                WalkDir::new(&path)
                    .into_iter()
                    .filter_map(Result::ok)
                    .filter(|entry| entry.file_type().is_file() && matches_ext(entry.path()))
                    .map(walkdir::DirEntry::into_path),
            );
        } else if path.is_file() {
            if matches_ext(&path) {
                documents.push(path);
            }
        } else {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} does not exist", path.display()),
            ));
        }
    }

    documents.sort();
    documents.dedup();
    Ok(documents)
}

/// Reads a file and extracts its structure in one go.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_document(
    path: &Path,
    format: &dyn Format,
) -> Result<(String, DocumentMetadata), ThreadError> {
    let text = fs::read_to_string(path)?;
    let metadata = extract_metadata(&text, format)?;
    Ok((text, metadata))
}

/// Parses `text` and returns its headings, embeds and named blocks in document order.
///
/// # Errors
///
/// Returns an error if the grammar cannot be loaded, a query does not compile, or the parser
/// gives up on the input.
pub fn extract_metadata(text: &str, format: &dyn Format) -> Result<DocumentMetadata, ThreadError> {
    let language = format.language();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ThreadError::Parse(e.to_string()))?;
    let tree = parser
        .parse(text, None)
        .ok_or_else(|| ThreadError::Parse("parser returned no tree".to_string()))?;

    let headings = captured_nodes(&tree, &language, format.heading_query(), text)?
        .into_iter()
        .filter_map(|node| heading_from_node(node, text))
        .collect();

    let blocks = captured_nodes(&tree, &language, format.block_query(), text)?
        .into_iter()
        .filter_map(|node| block_from_node(node, text))
        .collect();

    let mut code: Vec<Range<usize>> = captured_nodes(&tree, &language, format.code_query(), text)?
        .into_iter()
        .map(|node| node.start_byte()..node.end_byte())
        .collect();
    let inline: Vec<tree_sitter::Range> =
        captured_nodes(&tree, &language, format.inline_query(), text)?
            .into_iter()
            .map(|node| node.range())
            .collect();
    code.extend(inline_code_ranges(text, format, &inline)?);

    Ok(DocumentMetadata {
        headings,
        embeds: find_embeds(text, &code),
        blocks,
        text_len: text.len(),
    })
}

fn captured_nodes<'t>(
    tree: &'t Tree,
    language: &tree_sitter::Language,
    source: &str,
    text: &str,
) -> Result<Vec<Node<'t>>, ThreadError> {
    let query = Query::new(language, source).map_err(|e| ThreadError::Parse(e.to_string()))?;
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, tree.root_node(), text.as_bytes());

    let mut nodes = Vec::new();
    while let Some(m) = matches.next() {
        nodes.extend(m.captures.iter().map(|capture| capture.node));
    }
    nodes.sort_by_key(Node::start_byte);
    nodes.dedup_by_key(|node| node.start_byte());
    Ok(nodes)
}

/// Byte ranges of code spans, found by running the inline grammar over each `inline` region.
///
/// Regions are parsed one at a time so an unclosed backtick cannot pair with one in a later
/// paragraph.
fn inline_code_ranges(
    text: &str,
    format: &dyn Format,
    inline: &[tree_sitter::Range],
) -> Result<Vec<Range<usize>>, ThreadError> {
    if inline.is_empty() {
        return Ok(Vec::new());
    }

    let language = format.inline_language();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ThreadError::Parse(e.to_string()))?;
    let query = Query::new(&language, format.inline_code_query())
        .map_err(|e| ThreadError::Parse(e.to_string()))?;
    let mut cursor = QueryCursor::new();

    let mut spans = Vec::new();
    for region in inline {
        parser
            .set_included_ranges(std::slice::from_ref(region))
            .map_err(|e| ThreadError::Parse(format!("invalid inline range: {e:?}")))?;
        let tree = parser
            .parse(text, None)
            .ok_or_else(|| ThreadError::Parse("inline parser returned no tree".to_string()))?;

        let mut matches = cursor.matches(&query, tree.root_node(), text.as_bytes());
        while let Some(m) = matches.next() {
            spans.extend(
                m.captures
                    .iter()
                    .map(|capture| capture.node.start_byte()..capture.node.end_byte()),
            );
        }
    }
    Ok(spans)
}

fn heading_from_node(node: Node<'_>, text: &str) -> Option<Heading> {
    let byte_start = node.start_byte();
    let raw = text.get(byte_start..node.end_byte())?;
    let line = raw.lines().next().unwrap_or_default().trim_end_matches('\r');

    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }

    let title = trimmed
        .trim_start_matches('#')
        .trim()
        .trim_end_matches('#')
        .trim()
        .to_string();
    let row = node.start_position().row;

    Some(Heading {
        level,
        title,
        line_start: row,
        line_end: row,
        byte_start,
        byte_end: byte_start + line.len(),
    })
}

fn block_from_node(node: Node<'_>, text: &str) -> Option<Block> {
    let byte_start = node.start_byte();
    let raw = text.get(byte_start..node.end_byte())?.trim_end();
    let last_line = raw.lines().last()?;
    let id = BLOCK_ID.captures(last_line)?.get(1)?.as_str().to_string();

    Some(Block {
        id,
        byte_start,
        byte_end: byte_start + raw.len(),
    })
}

fn find_embeds(text: &str, code: &[Range<usize>]) -> Vec<EmbedRef> {
    let in_code = |offset: usize| code.iter().any(|range| range.contains(&offset));

    let wiki = WIKI_EMBED.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(EmbedRef {
            link_target: caps.get(1)?.as_str().trim().to_string(),
            byte_start: whole.start(),
            byte_end: whole.end(),
        })
    });

    let markdown = MARKDOWN_EMBED.captures_iter(text).filter_map(|caps| {
        let whole = caps.get(0)?;
        let target = caps.get(1)?.as_str();
        let link_target = urlencoding::decode(target)
            .map_or_else(|_| target.to_string(), std::borrow::Cow::into_owned);
        Some(EmbedRef {
            link_target,
            byte_start: whole.start(),
            byte_end: whole.end(),
        })
    });

    let mut embeds: Vec<EmbedRef> = wiki
        .chain(markdown)
        .filter(|embed| !in_code(embed.byte_start))
        .collect();
    embeds.sort_by_key(|embed| embed.byte_start);
    embeds
}

#[cfg(test)]
#[path = "tests/input.rs"]
mod tests;
