//! Access to the collection of notes a document lives in.
//!
//! The thread builder never touches the filesystem directly. It asks a [`Vault`] for a
//! document's structure, for file contents, and for the file a link points at, so tests and
//! editor integrations can supply their own.

use crate::formats::markdown::MarkdownFormat;
use crate::formats::Format;
use crate::input;
use crate::parts::BOUNDED_IMAGE_EXTENSIONS;
use crate::section::DocumentMetadata;
use std::path::{Path, PathBuf};
use std::{fs, io};
use walkdir::WalkDir;

/// Metadata provider, content reader and link resolver for a set of notes.
pub trait Vault {
    /// Structural index of `file`, or `None` when it cannot be produced.
    fn metadata(&self, file: &Path) -> Option<DocumentMetadata>;

    /// Full text of `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read as UTF-8.
    fn read_text(&self, file: &Path) -> io::Result<String>;

    /// Raw bytes of `file`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    fn read_bytes(&self, file: &Path) -> io::Result<Vec<u8>>;

    /// File that `link` (without subpath) refers to when written inside `from`.
    fn resolve_link(&self, link: &str, from: &Path) -> Option<PathBuf>;
}

#[derive(Clone, Debug)]
/// A [`Vault`] rooted at a directory on disk.
///
/// Nothing is cached: every call re-reads the filesystem, so two embeds of the same file read
/// it twice.
pub struct FsVault {
    /// Directory that bare links are resolved against.
    pub root: PathBuf,
}

impl FsVault {
    #[must_use]
    /// Vault rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn find_by_name(&self, name: &std::ffi::OsStr) -> Option<PathBuf> {
        let mut found: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file() && entry.file_name() == name)
            .map(walkdir::DirEntry::into_path)
            .collect();
        // Shallowest match wins, ties broken alphabetically.
        found.sort_by_key(|path| (path.components().count(), path.clone()));
        found.into_iter().next()
    }
}

impl Vault for FsVault {
    fn metadata(&self, file: &Path) -> Option<DocumentMetadata> {
        let text = fs::read_to_string(file).ok()?;
        match input::extract_metadata(&text, &MarkdownFormat) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::warn!(path = %file.display(), %e, "metadata extraction failed");
                None
            }
        }
    }

    fn read_text(&self, file: &Path) -> io::Result<String> {
        fs::read_to_string(file)
    }

    fn read_bytes(&self, file: &Path) -> io::Result<Vec<u8>> {
        fs::read(file)
    }

    fn resolve_link(&self, link: &str, from: &Path) -> Option<PathBuf> {
        let link = link.trim();
        if link.is_empty() || link.contains("://") {
            return None;
        }

        let names = candidate_names(link);
        for name in &names {
            let beside = from.parent().map(|dir| dir.join(name));
            for candidate in beside.into_iter().chain(Some(self.root.join(name))) {
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        names
            .iter()
            .find_map(|name| self.find_by_name(name.file_name()?))
    }
}

/// File names a link may refer to, most likely first.
///
/// Only a known note or image extension counts as one: `Meeting 2024.01.05` is tried as
/// `Meeting 2024.01.05.md` before the bare name.
fn candidate_names(link: &str) -> Vec<PathBuf> {
    let has_known_ext = Path::new(link)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| {
            MarkdownFormat.extensions().contains(&ext.as_str())
                || BOUNDED_IMAGE_EXTENSIONS.contains(&ext.as_str())
        });

    if has_known_ext {
        vec![PathBuf::from(link)]
    } else {
        vec![PathBuf::from(format!("{link}.md")), PathBuf::from(link)]
    }
}

#[cfg(test)]
#[path = "tests/vault.rs"]
mod tests;
