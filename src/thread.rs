//! Assembling the conversation that leads up to the cursor.
//!
//! The chain of headings enclosing the cursor is walked outermost first. Each heading becomes
//! one message: assistant headings contribute their raw text, user headings go through the
//! [`PartBuilder`] so their embeds are resolved. The walk is a single forward pass and never
//! mutates the document.

use crate::error::ThreadError;
use crate::formats::markdown::MarkdownFormat;
use crate::formats::Format;
use crate::heading_index::{enclosing_path, heading_range};
use crate::message::{ContentPart, Message, Role};
use crate::parts::{ImageMode, PartBuilder};
use crate::section::{DocumentMetadata, Heading, LinkTarget, TextPosition};
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static PROMPT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^!?\[\[([^\[\]\n]+)\]\]$").expect("prompt link pattern is valid"));

#[derive(Clone, Debug, PartialEq, Eq)]
/// A built conversation plus where to continue writing.
pub struct Thread {
    /// System message followed by one message per enclosing heading.
    pub messages: Vec<Message>,
    /// Innermost enclosing heading.
    pub last_heading: Heading,
    /// End of the innermost heading's content, where a reply belongs.
    pub range_end: TextPosition,
}

/// Builds the conversation for `cursor_line` from an already-parsed document.
///
/// # Errors
///
/// Returns [`ThreadError::NoHeadingsFound`] if no heading starts at or above the cursor.
pub fn build_thread(
    builder: &PartBuilder<'_>,
    doc_path: &Path,
    text: &str,
    metadata: &DocumentMetadata,
    cursor_line: usize,
    system_prompt: &str,
) -> Result<Thread, ThreadError> {
    let headings = &metadata.headings;
    let path = enclosing_path(headings, cursor_line);
    let Some(&last) = path.last() else {
        return Err(ThreadError::NoHeadingsFound { line: cursor_line });
    };

    let mut messages = Vec::with_capacity(path.len() + 1);
    messages.push(Message::system(system_prompt));

    let mut range_end = TextPosition::at(text, text.len());
    for &index in &path {
        let range = heading_range(headings, index, text);
        let message = match Role::for_heading(&headings[index].title) {
            Role::Assistant => Message::assistant(range.slice(text).trim()),
            Role::User | Role::System => Message::user(builder.build_parts(
                doc_path,
                text,
                &metadata.embeds,
                range.content_start,
                range.content_end,
                ImageMode::BoundedEncode,
            )),
        };
        messages.push(message);
        range_end = range.range_end;
    }

    tracing::debug!(
        path = %doc_path.display(),
        turns = messages.len() - 1,
        "built thread"
    );

    Ok(Thread {
        messages,
        last_heading: headings[last].clone(),
        range_end,
    })
}

/// Reads `doc_path` through the vault and builds the conversation for `cursor_line`.
///
/// # Errors
///
/// Returns an error if the document cannot be read, its metadata is unavailable, or no
/// heading encloses the cursor.
pub fn build_thread_for_file(
    builder: &PartBuilder<'_>,
    doc_path: &Path,
    cursor_line: usize,
    system_prompt: &str,
) -> Result<Thread, ThreadError> {
    let (text, metadata) = load(builder, doc_path)?;
    build_thread(builder, doc_path, &text, &metadata, cursor_line, system_prompt)
}

/// Content parts for a byte range of `doc_path`; `None` bounds extend to the whole document.
///
/// # Errors
///
/// Returns an error if the document cannot be read or its metadata is unavailable.
pub fn build_range_content_parts(
    builder: &PartBuilder<'_>,
    doc_path: &Path,
    start: Option<usize>,
    end: Option<usize>,
    mode: ImageMode,
) -> Result<Vec<ContentPart>, ThreadError> {
    let (text, metadata) = load(builder, doc_path)?;
    let start = start.unwrap_or(0).min(text.len());
    let end = end.unwrap_or(text.len()).min(text.len());
    Ok(builder.build_parts(doc_path, &text, &metadata.embeds, start, end, mode))
}

/// Expands a system prompt that is a single `[[link]]` into the linked note's text.
///
/// The note (or the section named by the link's subpath) is converted one level deep and its
/// text parts are joined with blank lines. Any other prompt, or a link that does not resolve
/// to a note, is returned as written.
///
/// # Errors
///
/// Returns an error if the linked note resolves but cannot be read or indexed.
pub fn resolve_system_prompt(
    builder: &PartBuilder<'_>,
    prompt: &str,
    from: &Path,
) -> Result<String, ThreadError> {
    let Some(link) = PROMPT_LINK
        .captures(prompt.trim())
        .and_then(|caps| caps.get(1))
    else {
        return Ok(prompt.to_string());
    };

    let target = LinkTarget::parse(link.as_str());
    let Some(file) = builder
        .vault
        .resolve_link(target.path, from)
        .filter(|file| {
            file.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| MarkdownFormat.extensions().contains(&ext))
        })
    else {
        tracing::warn!(link = link.as_str(), "system prompt link does not resolve to a note");
        return Ok(prompt.to_string());
    };

    let (start, end) = match target.subpath {
        Some(subpath) => {
            let (_, metadata) = load(builder, &file)?;
            metadata
                .resolve_subpath(subpath)
                .map_or((None, None), |range| (Some(range.start), Some(range.end)))
        }
        None => (None, None),
    };

    let parts = build_range_content_parts(builder, &file, start, end, ImageMode::TextOnly)?;
    Ok(parts
        .iter()
        .filter_map(ContentPart::as_text)
        .collect::<Vec<_>>()
        .join("\n\n"))
}

fn load(builder: &PartBuilder<'_>, doc_path: &Path) -> Result<(String, DocumentMetadata), ThreadError> {
    let text = builder.vault.read_text(doc_path)?;
    let metadata = builder
        .vault
        .metadata(doc_path)
        .ok_or_else(|| ThreadError::MetadataUnavailable {
            path: doc_path.to_path_buf(),
        })?;
    Ok((text, metadata))
}

#[cfg(test)]
#[path = "tests/thread.rs"]
mod tests;
