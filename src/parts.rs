//! Resolution of a document range into the content parts of a user message.
//!
//! Text between embeds is kept verbatim (trimmed). Each embed is resolved once: markdown
//! notes are transcluded one level deep, images become inline or raw image parts (or are
//! dropped in text-only mode), and anything else is dropped. An embed that fails at any step
//! is skipped on its own and the rest of the range is still converted.

use crate::formats::markdown::MarkdownFormat;
use crate::formats::Format;
use crate::message::{ContentPart, ImageUrl};
use crate::range::{split_range, Span};
use crate::raster::Rasterizer;
use crate::section::{EmbedRef, LinkTarget};
use crate::vault::Vault;
use std::path::Path;

/// Extensions treated as images when encoding inline.
pub const BOUNDED_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Extensions accepted when passing image bytes through unmodified.
pub const RAW_IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// How embedded images are carried in content parts.
pub enum ImageMode {
    /// Downsize and re-encode into an inline `image_url` part.
    #[default]
    BoundedEncode,
    /// Pass the file's bytes through untouched as an `image_buffer` part.
    RawBuffer,
    /// Drop image embeds without reading them, for callers that keep only text.
    TextOnly,
}

#[derive(Debug, PartialEq, Eq)]
enum ResourceKind {
    Markdown,
    Image(String),
    Unsupported,
}

fn resource_kind(file: &Path) -> ResourceKind {
    let ext = file
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if MarkdownFormat.extensions().contains(&ext.as_str()) {
        ResourceKind::Markdown
    } else if BOUNDED_IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        ResourceKind::Image(ext)
    } else {
        ResourceKind::Unsupported
    }
}

#[must_use]
/// MIME type for an image extension: `jpg` maps to `image/jpeg`, others to `image/<ext>`.
pub fn image_mime_type(ext: &str) -> String {
    let ext = ext.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        _ => format!("image/{ext}"),
    }
}

/// Turns document ranges into content parts using a vault and a rasterizer.
pub struct PartBuilder<'a> {
    /// Source of linked files and their metadata.
    pub vault: &'a dyn Vault,
    /// Encoder used in [`ImageMode::BoundedEncode`].
    pub rasterizer: &'a dyn Rasterizer,
    /// Longest edge, in pixels, of inline images.
    pub max_image_edge: u32,
}

impl<'a> PartBuilder<'a> {
    #[must_use]
    /// Builder over the given collaborators.
    pub fn new(vault: &'a dyn Vault, rasterizer: &'a dyn Rasterizer, max_image_edge: u32) -> Self {
        Self {
            vault,
            rasterizer,
            max_image_edge,
        }
    }

    #[must_use]
    /// Content parts for `text[start..end]` of the document at `doc_path`, in document order.
    ///
    /// `embeds` are the document's embeds; only those wholly inside the range are resolved.
    pub fn build_parts(
        &self,
        doc_path: &Path,
        text: &str,
        embeds: &[EmbedRef],
        start: usize,
        end: usize,
        mode: ImageMode,
    ) -> Vec<ContentPart> {
        split_range(text, start, end, embeds)
            .into_iter()
            .filter_map(|span| match span {
                Span::Text(text) => Some(ContentPart::text(text)),
                Span::Embed(embed) => self.resolve_embed(embed, doc_path, mode),
            })
            .collect()
    }

    fn resolve_embed(&self, embed: &EmbedRef, from: &Path, mode: ImageMode) -> Option<ContentPart> {
        let target = LinkTarget::parse(&embed.link_target);
        let Some(file) = self.vault.resolve_link(target.path, from) else {
            tracing::debug!(link = %embed.link_target, "embed does not resolve, skipping");
            return None;
        };

        match resource_kind(&file) {
            ResourceKind::Markdown => self.transclude(&file, target.subpath),
            ResourceKind::Image(ext) => match mode {
                ImageMode::BoundedEncode => self.encode_image(&file),
                ImageMode::RawBuffer => self.raw_image(&file, &ext),
                ImageMode::TextOnly => {
                    tracing::debug!(path = %file.display(), "image embed in text-only range, skipping");
                    None
                }
            },
            ResourceKind::Unsupported => {
                tracing::debug!(path = %file.display(), "unsupported embed type, skipping");
                None
            }
        }
    }

    /// Inlines a note, or the part of it named by `subpath`. Embeds inside it stay as text.
    fn transclude(&self, file: &Path, subpath: Option<&str>) -> Option<ContentPart> {
        let text = match self.vault.read_text(file) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path = %file.display(), %e, "could not read embedded note");
                return None;
            }
        };

        let range = subpath.and_then(|subpath| {
            let resolved = self.vault.metadata(file)?.resolve_subpath(subpath);
            if resolved.is_none() {
                tracing::debug!(path = %file.display(), subpath, "subpath not found, embedding whole note");
            }
            resolved
        });
        let slice = range
            .and_then(|range| text.get(range))
            .unwrap_or(text.as_str())
            .trim();

        (!slice.is_empty()).then(|| ContentPart::text(slice))
    }

    fn encode_image(&self, file: &Path) -> Option<ContentPart> {
        match self.rasterizer.rasterize_bounded(file, self.max_image_edge) {
            Ok(encoded) => Some(ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: encoded.data_url,
                },
            }),
            Err(e) => {
                tracing::warn!(path = %file.display(), %e, "could not encode embedded image, skipping");
                None
            }
        }
    }

    fn raw_image(&self, file: &Path, ext: &str) -> Option<ContentPart> {
        if !RAW_IMAGE_EXTENSIONS.contains(&ext) {
            tracing::info!(path = %file.display(), ext, "image type not accepted as raw buffer, skipping");
            return None;
        }

        match self.vault.read_bytes(file) {
            Ok(data) => Some(ContentPart::ImageBuffer {
                mime_type: image_mime_type(ext),
                file_name: file
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                data,
            }),
            Err(e) => {
                tracing::warn!(path = %file.display(), %e, "could not read embedded image, skipping");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/parts.rs"]
mod tests;
