//! Failures that abort building a conversation.
//!
//! Only structural problems live here. A single embed that cannot be resolved, read or
//! decoded is skipped where it occurs and never surfaces as an error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a document into messages or content parts.
#[derive(Debug, Error)]
pub enum ThreadError {
    /// The cursor is not inside any heading-delimited section.
    #[error("No headings found at or above line {line}")]
    NoHeadingsFound {
        /// Cursor line the lookup started from.
        line: usize,
    },

    /// The document's structural index could not be obtained.
    #[error("Metadata unavailable for {}", path.display())]
    MetadataUnavailable {
        /// Document whose metadata was requested.
        path: PathBuf,
    },

    /// The markdown parser could not be set up or failed to produce a tree.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Reading the document itself failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
