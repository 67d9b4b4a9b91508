//! The edit plan writes a model reply back into the document it answers.
//!
//! A reply is inserted at the end of the innermost heading's content, under a new `AI`
//! heading one level deeper, so the next thread built from inside it sees the reply as an
//! assistant turn. Plans serialise to JSON so a dry run can be inspected or applied later.

use crate::thread::Thread;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;

/// Deepest ATX heading level.
const MAX_LEVEL: usize = 6;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
/// Serialisable collection of reply insertions for batch application.
pub struct ReplyPlan {
    /// Individual insertions, grouped per file when applied.
    pub edits: Vec<ReplyEdit>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
/// Text to insert at one byte offset of a file.
pub struct ReplyEdit {
    /// Target file path for this insertion.
    pub file_name: String,
    /// Byte offset the text is inserted at.
    pub offset: usize,
    /// Line of `offset`, kept for display.
    pub line: usize,
    /// Heading plus reply text to insert.
    pub text: String,
    /// Title of the heading being answered, for tracking and debugging edits.
    pub item_name: String,
}

impl ReplyEdit {
    #[must_use]
    /// Insertion answering `thread` with `reply` in `file_name`.
    pub fn for_thread(file_name: impl Into<String>, thread: &Thread, reply: &str) -> Self {
        let level = (thread.last_heading.level + 1).min(MAX_LEVEL);
        let hashes = "#".repeat(level);
        Self {
            file_name: file_name.into(),
            offset: thread.range_end.offset,
            line: thread.range_end.line,
            text: format!("\n\n{hashes} AI\n{}\n", reply.trim()),
            item_name: thread.last_heading.title.clone(),
        }
    }
}

impl ReplyPlan {
    /// Apply all insertions in the plan.
    ///
    /// Groups edits by file and inserts from the highest offset down so earlier offsets stay
    /// valid. Offsets past the end of the file append.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or written, or an offset splits a character.
    pub fn apply(&self) -> io::Result<()> {
        let mut file_groups: HashMap<&str, Vec<&ReplyEdit>> = HashMap::new();

        for edit in &self.edits {
            file_groups
                .entry(edit.file_name.as_str())
                .or_default()
                .push(edit);
        }

        for (file_name, mut edits) in file_groups {
            let mut content = fs::read_to_string(file_name)?;
            edits.sort_by_key(|edit| std::cmp::Reverse(edit.offset));

            for edit in edits {
                let offset = edit.offset.min(content.len());
                if !content.is_char_boundary(offset) {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("offset {offset} is not a character boundary in {file_name}"),
                    ));
                }
                content.insert_str(offset, &edit.text);
            }

            fs::write(file_name, content)?;
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/edit_plan.rs"]
mod tests;
