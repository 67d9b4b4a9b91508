//! Configuration to acknowledge user preferences as well as set defaults.
//!
//! Specifically, we try to find an mdthread.toml, and if present we load settings from there.
//! This provides the system prompt, model name, inline image bound and file extensions. The
//! values are handed to the thread builder as plain arguments; nothing reads them globally.

use facet::Facet;
use std::fs;
use std::path::Path;

/// System prompt used when none is configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";
/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o";
/// Longest edge of inline images when none is configured.
pub const DEFAULT_MAX_IMAGE_EDGE: u32 = 1024;

#[derive(Facet, Clone, Debug, PartialEq)]
/// User preferences loaded from mdthread.toml or falling back to defaults.
pub struct Config {
    #[facet(default = DEFAULT_SYSTEM_PROMPT.to_string())]
    /// Prompt sent as the system message; a lone `[[link]]` is expanded to that note.
    pub system_prompt: String,
    #[facet(default = DEFAULT_MODEL.to_string())]
    /// Model named in the chat request.
    pub model: String,
    #[facet(default = DEFAULT_MAX_IMAGE_EDGE)]
    /// Longest edge, in pixels, of images sent inline.
    pub max_image_edge: u32,
    #[facet(default = vec!["md".to_string()])]
    /// File suffixes to match when scanning directories.
    pub file_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_image_edge: DEFAULT_MAX_IMAGE_EDGE,
            file_extensions: vec!["md".to_string()],
        }
    }
}

impl Config {
    #[must_use]
    /// Load configuration from mdthread.toml in the working directory if present.
    pub fn load() -> Self {
        Self::load_from(Path::new("mdthread.toml"))
    }

    #[must_use]
    /// Load configuration from `path`, using defaults if it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };
        match Self::parse(&contents) {
            Some(config) => config,
            None => {
                tracing::warn!(path = %path.display(), "ignoring malformed config");
                Self::default()
            }
        }
    }

    #[must_use]
    /// Parse TOML configuration, filling unset keys with defaults.
    pub fn parse(contents: &str) -> Option<Self> {
        facet_toml::from_str::<Self>(contents).ok()
    }
}

#[cfg(test)]
#[path = "tests/config.rs"]
mod tests;
