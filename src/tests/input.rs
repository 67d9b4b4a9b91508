use super::{extract_metadata, find_documents, load_document};
use crate::formats::markdown::MarkdownFormat;
use crate::section::Heading;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const CONVERSATION: &str = "# Q\nHello\n\n## AI\nHi there\n\n### Q2\nBye";

#[test]
fn test_extract_headings_with_offsets() {
    let metadata = extract_metadata(CONVERSATION, &MarkdownFormat).unwrap();

    assert_eq!(
        metadata.headings,
        vec![
            Heading {
                level: 1,
                title: "Q".to_string(),
                line_start: 0,
                line_end: 0,
                byte_start: 0,
                byte_end: 3,
            },
            Heading {
                level: 2,
                title: "AI".to_string(),
                line_start: 3,
                line_end: 3,
                byte_start: 11,
                byte_end: 16,
            },
            Heading {
                level: 3,
                title: "Q2".to_string(),
                line_start: 6,
                line_end: 6,
                byte_start: 27,
                byte_end: 33,
            },
        ]
    );
    assert_eq!(metadata.text_len, CONVERSATION.len());
}

#[test]
fn test_heading_titles_drop_closing_hashes() {
    let metadata = extract_metadata("## Title ##\n\ntext\n", &MarkdownFormat).unwrap();
    assert_eq!(metadata.headings[0].title, "Title");
    assert_eq!(metadata.headings[0].level, 2);
}

#[test]
fn test_hash_lines_in_code_are_not_headings() {
    let text = "# Real\n\n```sh\n# not a heading\n![[not-an-embed]]\n```\n";
    let metadata = extract_metadata(text, &MarkdownFormat).unwrap();

    let titles: Vec<&str> = metadata.headings.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["Real"]);
    assert!(metadata.embeds.is_empty(), "embeds in code: {:?}", metadata.embeds);
}

#[test]
fn test_embeds_in_code_spans_are_ignored() {
    let text = "# Help\nUse `![[X]]` syntax, then ![[Y]].\n\n- item with ``![[Z]]``\n";
    let metadata = extract_metadata(text, &MarkdownFormat).unwrap();

    let targets: Vec<&str> = metadata.embeds.iter().map(|e| e.link_target.as_str()).collect();
    assert_eq!(targets, vec!["Y"]);
}

#[test]
fn test_backticks_do_not_pair_across_paragraphs() {
    let text = "Stray ` tick\n\n![[Y]] and ` another\n";
    let metadata = extract_metadata(text, &MarkdownFormat).unwrap();

    assert_eq!(metadata.embeds.len(), 1);
    assert_eq!(metadata.embeds[0].link_target, "Y");
}

#[test]
fn test_extract_embeds_in_document_order() {
    let text = "# Note\n\nSee ![](my%20pic.png \"title\") and ![[Other#Part|alias]].\n";
    let metadata = extract_metadata(text, &MarkdownFormat).unwrap();

    let targets: Vec<&str> = metadata
        .embeds
        .iter()
        .map(|e| e.link_target.as_str())
        .collect();
    assert_eq!(targets, vec!["my pic.png", "Other#Part|alias"]);

    let wiki = &metadata.embeds[1];
    assert_eq!(&text[wiki.byte_start..wiki.byte_end], "![[Other#Part|alias]]");
}

#[test]
fn test_plain_links_are_not_embeds() {
    let text = "[[Linked]] and [label](page.md)\n";
    let metadata = extract_metadata(text, &MarkdownFormat).unwrap();
    assert!(metadata.embeds.is_empty());
}

#[test]
fn test_extract_named_blocks() {
    let text = "# Facts\n\nThe sky is blue.\nMostly. ^sky\n\nUntagged paragraph.\n";
    let metadata = extract_metadata(text, &MarkdownFormat).unwrap();

    assert_eq!(metadata.blocks.len(), 1);
    let block = &metadata.blocks[0];
    assert_eq!(block.id, "sky");
    assert_eq!(
        &text[block.byte_start..block.byte_end],
        "The sky is blue.\nMostly. ^sky"
    );
}

#[test]
fn test_load_document_reads_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{CONVERSATION}").unwrap();
    file.flush().unwrap();

    let (text, metadata) = load_document(file.path(), &MarkdownFormat).unwrap();

    assert_eq!(text, CONVERSATION);
    assert_eq!(metadata.headings.len(), 3);
}

#[test]
fn test_find_documents_filters_extensions() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("a.md"), "# A").unwrap();
    fs::write(dir.path().join("sub/b.md"), "# B").unwrap();
    fs::write(dir.path().join("c.txt"), "C").unwrap();

    let docs = find_documents(
        vec![dir.path().to_path_buf(), dir.path().join("a.md")],
        &["md".to_string()],
    )
    .unwrap();

    assert_eq!(docs, vec![dir.path().join("a.md"), dir.path().join("sub/b.md")]);
    assert!(find_documents(vec![dir.path().join("missing")], &["md".to_string()]).is_err());
}
