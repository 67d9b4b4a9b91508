use super::{image_mime_type, ImageMode, PartBuilder};
use crate::formats::markdown::MarkdownFormat;
use crate::input::load_document;
use crate::message::{ContentPart, ImageUrl};
use crate::raster::{EncodedImage, RasterizeError, Rasterizer};
use crate::vault::FsVault;
use pretty_assertions::assert_eq;
use std::fs;
use std::io;
use std::path::Path;
use tempfile::TempDir;

/// Names the file and the bound in a fake data URL instead of decoding anything.
struct FakeRasterizer;

impl Rasterizer for FakeRasterizer {
    fn rasterize_bounded(
        &self,
        file: &Path,
        max_edge_pixels: u32,
    ) -> Result<EncodedImage, RasterizeError> {
        let name = file.file_name().unwrap().to_string_lossy();
        Ok(EncodedImage {
            data_url: format!("data:fake;{name};{max_edge_pixels}"),
            width: max_edge_pixels,
            height: max_edge_pixels,
        })
    }
}

struct FailingRasterizer;

impl Rasterizer for FailingRasterizer {
    fn rasterize_bounded(&self, file: &Path, _: u32) -> Result<EncodedImage, RasterizeError> {
        Err(RasterizeError::Decode {
            path: file.display().to_string(),
            source: ::image::ImageError::IoError(io::Error::other("unreadable")),
        })
    }
}

fn vault_with(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

fn parts_of(dir: &TempDir, rasterizer: &dyn Rasterizer, mode: ImageMode) -> Vec<ContentPart> {
    let vault = FsVault::new(dir.path());
    let builder = PartBuilder::new(&vault, rasterizer, 512);
    let doc = dir.path().join("doc.md");
    let (text, metadata) = load_document(&doc, &MarkdownFormat).unwrap();
    builder.build_parts(&doc, &text, &metadata.embeds, 0, text.len(), mode)
}

fn text(t: &str) -> ContentPart {
    ContentPart::text(t)
}

#[test]
fn test_transclusion_is_one_level_deep() {
    let dir = vault_with(&[
        ("doc.md", "Before\n\n![[X]]\n\nAfter"),
        ("X.md", "X body\n\n![[Y]]\n"),
        ("Y.md", "Y body"),
    ]);

    let parts = parts_of(&dir, &FakeRasterizer, ImageMode::BoundedEncode);

    assert_eq!(
        parts,
        vec![text("Before"), text("X body\n\n![[Y]]"), text("After")]
    );
}

#[test]
fn test_dotted_note_name_is_transcluded() {
    let dir = vault_with(&[
        ("doc.md", "Before\n\n![[Meeting 2024.01.05]]\n\nAfter"),
        ("Meeting 2024.01.05.md", "minutes"),
    ]);

    let parts = parts_of(&dir, &FakeRasterizer, ImageMode::BoundedEncode);

    assert_eq!(parts, vec![text("Before"), text("minutes"), text("After")]);
}

#[test]
fn test_text_right_after_embed_is_kept_whole() {
    let dir = vault_with(&[("doc.md", "![[X]]abc"), ("X.md", "X body")]);

    let parts = parts_of(&dir, &FakeRasterizer, ImageMode::BoundedEncode);

    assert_eq!(parts, vec![text("X body"), text("abc")]);
}

#[test]
fn test_broken_embed_is_skipped() {
    let dir = vault_with(&[("doc.md", "Left\n\n![[Nowhere]]\n\nRight")]);

    let parts = parts_of(&dir, &FakeRasterizer, ImageMode::BoundedEncode);

    assert_eq!(parts, vec![text("Left"), text("Right")]);
}

#[test]
fn test_heading_subpath_embeds_subtree() {
    let dir = vault_with(&[
        ("doc.md", "![[Notes#A]]"),
        ("Notes.md", "# A\na text\n## B\nb text\n# C\nc text\n"),
    ]);

    let parts = parts_of(&dir, &FakeRasterizer, ImageMode::BoundedEncode);

    assert_eq!(parts, vec![text("# A\na text\n## B\nb text")]);
}

#[test]
fn test_block_subpath_embeds_block() {
    let dir = vault_with(&[
        ("doc.md", "![[Notes#^fact]]"),
        ("Notes.md", "Intro\n\nKey fact here ^fact\n\nOther\n"),
    ]);

    let parts = parts_of(&dir, &FakeRasterizer, ImageMode::BoundedEncode);

    assert_eq!(parts, vec![text("Key fact here ^fact")]);
}

#[test]
fn test_unknown_subpath_embeds_whole_note() {
    let dir = vault_with(&[
        ("doc.md", "![[Notes#Missing]]"),
        ("Notes.md", "# A\nall of it\n"),
    ]);

    let parts = parts_of(&dir, &FakeRasterizer, ImageMode::BoundedEncode);

    assert_eq!(parts, vec![text("# A\nall of it")]);
}

#[test]
fn test_same_note_embedded_twice() {
    let dir = vault_with(&[("doc.md", "![[X]]\n\n![[X]]"), ("X.md", "X body")]);

    let parts = parts_of(&dir, &FakeRasterizer, ImageMode::BoundedEncode);

    assert_eq!(parts, vec![text("X body"), text("X body")]);
}

#[test]
fn test_bounded_mode_encodes_images() {
    let dir = vault_with(&[
        ("doc.md", "Look:\n\n![[pic.png]]\n\n![](shot.bmp)"),
        ("pic.png", "png bytes"),
        ("shot.bmp", "bmp bytes"),
    ]);

    let parts = parts_of(&dir, &FakeRasterizer, ImageMode::BoundedEncode);

    assert_eq!(
        parts,
        vec![
            text("Look:"),
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:fake;pic.png;512".to_string(),
                },
            },
            ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: "data:fake;shot.bmp;512".to_string(),
                },
            },
        ]
    );
}

#[test]
fn test_failed_image_does_not_abort() {
    let dir = vault_with(&[
        ("doc.md", "One\n\n![[pic.png]]\n\nTwo"),
        ("pic.png", "png bytes"),
    ]);

    let parts = parts_of(&dir, &FailingRasterizer, ImageMode::BoundedEncode);

    assert_eq!(parts, vec![text("One"), text("Two")]);
}

#[test]
fn test_raw_mode_passes_bytes_through() {
    let dir = vault_with(&[
        ("doc.md", "![[photo.JPG]]\n\n![[shot.bmp]]\n\n![[pic.png]]"),
        ("shot.bmp", "bmp bytes"),
    ]);
    fs::write(dir.path().join("photo.JPG"), [0xFF_u8, 0xD8, 0xFF]).unwrap();
    fs::write(dir.path().join("pic.png"), [0x89, b'P', b'N', b'G']).unwrap();

    let parts = parts_of(&dir, &FailingRasterizer, ImageMode::RawBuffer);

    assert_eq!(
        parts,
        vec![
            ContentPart::ImageBuffer {
                mime_type: "image/jpeg".to_string(),
                file_name: "photo.JPG".to_string(),
                data: vec![0xFF, 0xD8, 0xFF],
            },
            ContentPart::ImageBuffer {
                mime_type: "image/png".to_string(),
                file_name: "pic.png".to_string(),
                data: vec![0x89, b'P', b'N', b'G'],
            },
        ]
    );
}

#[test]
fn test_text_only_mode_drops_images() {
    let dir = vault_with(&[("doc.md", "Look\n\n![[pic.png]]\n\nDone")]);
    fs::write(dir.path().join("pic.png"), [1_u8, 2, 3]).unwrap();

    let parts = parts_of(&dir, &FailingRasterizer, ImageMode::TextOnly);

    assert_eq!(parts, vec![text("Look"), text("Done")]);
}

#[test]
fn test_unsupported_resources_are_skipped() {
    let dir = vault_with(&[
        ("doc.md", "Data:\n\n![[table.csv]]\n\n![[clip.mp4]]"),
        ("table.csv", "a,b\n1,2\n"),
        ("clip.mp4", "video"),
    ]);

    let parts = parts_of(&dir, &FakeRasterizer, ImageMode::BoundedEncode);

    assert_eq!(parts, vec![text("Data:")]);
}

#[test]
fn test_partial_range() {
    let dir = vault_with(&[("doc.md", "Skip me\n\n![[X]]\n\nKeep"), ("X.md", "X body")]);
    let vault = FsVault::new(dir.path());
    let builder = PartBuilder::new(&vault, &FakeRasterizer, 512);
    let doc = dir.path().join("doc.md");
    let (text_content, metadata) = load_document(&doc, &MarkdownFormat).unwrap();
    let start = text_content.find("![[X]]").unwrap();

    let parts = builder.build_parts(
        &doc,
        &text_content,
        &metadata.embeds,
        start,
        text_content.len(),
        ImageMode::BoundedEncode,
    );

    assert_eq!(parts, vec![text("X body"), text("Keep")]);
}

#[test]
fn test_image_mime_types() {
    assert_eq!(image_mime_type("jpg"), "image/jpeg");
    assert_eq!(image_mime_type("JPEG"), "image/jpeg");
    assert_eq!(image_mime_type("png"), "image/png");
    assert_eq!(image_mime_type("webp"), "image/webp");
}
