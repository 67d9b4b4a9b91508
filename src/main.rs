//! mdthread: turn nested markdown headings into chat-completion conversations.
#![allow(clippy::multiple_crate_versions)]

use anyhow::Context;
use clap::{Parser, Subcommand};
use mdthread::edit_plan::{ReplyEdit, ReplyPlan};
use mdthread::error::ThreadError;
use mdthread::formats::markdown::MarkdownFormat;
use mdthread::message::ChatRequest;
use mdthread::parts::{ImageMode, PartBuilder};
use mdthread::raster::ImageRasterizer;
use mdthread::vault::FsVault;
use mdthread::{config, heading_index, input, thread};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mdthread")]
#[command(about = "Turn nested markdown headings into chat-completion conversations", long_about = None)]
struct Args {
    /// Vault directory that links are resolved against (defaults to the document's directory)
    #[arg(long, global = true, value_name = "DIR")]
    vault: Option<PathBuf>,

    /// Configuration file
    #[arg(long, global = true, default_value = "mdthread.toml")]
    config: PathBuf,

    /// Log resolution details to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the chat request for the conversation enclosing a line
    Thread {
        /// Markdown document
        file: PathBuf,
        /// 0-based cursor line
        #[arg(long)]
        line: usize,
    },
    /// Print the content parts of a byte range (the whole document by default)
    Range {
        /// Markdown document
        file: PathBuf,
        /// First byte of the range
        #[arg(long)]
        start: Option<usize>,
        /// Byte just past the range
        #[arg(long)]
        end: Option<usize>,
        /// Pass image bytes through instead of downsizing them
        #[arg(long)]
        raw_images: bool,
    },
    /// Insert a reply after the conversation enclosing a line
    Reply {
        /// Markdown document
        file: PathBuf,
        /// 0-based cursor line
        #[arg(long)]
        line: usize,
        /// Reply text (read from stdin when omitted)
        #[arg(long)]
        text: Option<String>,
        /// Print the plan as JSON instead of writing it
        #[arg(long)]
        dry_run: bool,
    },
    /// List the headings of every matching document
    Headings {
        /// Files or directories to scan
        #[arg(value_name = "PATH")]
        paths: Vec<PathBuf>,
        /// File extensions to match
        #[arg(long, short = 'e', value_name = "EXT")]
        ext: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose)?;
    let mut cfg = config::Config::load_from(&args.config);

    match args.command {
        Command::Thread { file, line } => {
            let vault = FsVault::new(vault_root(args.vault, &file));
            let builder = PartBuilder::new(&vault, &ImageRasterizer, cfg.max_image_edge);
            let system_prompt = thread::resolve_system_prompt(&builder, &cfg.system_prompt, &file)?;

            match thread::build_thread_for_file(&builder, &file, line, &system_prompt) {
                Ok(built) => {
                    let request = ChatRequest {
                        model: cfg.model,
                        messages: built.messages,
                        stream: true,
                    };
                    println!("{}", serde_json::to_string_pretty(&request)?);
                }
                Err(ThreadError::NoHeadingsFound { line }) => {
                    eprintln!("No headings found at or above line {line}");
                }
                Err(e) => return Err(e).context("building thread"),
            }
        }
        Command::Range {
            file,
            start,
            end,
            raw_images,
        } => {
            let vault = FsVault::new(vault_root(args.vault, &file));
            let builder = PartBuilder::new(&vault, &ImageRasterizer, cfg.max_image_edge);
            let mode = if raw_images {
                ImageMode::RawBuffer
            } else {
                ImageMode::BoundedEncode
            };
            let parts = thread::build_range_content_parts(&builder, &file, start, end, mode)?;
            println!("{}", serde_json::to_string_pretty(&parts)?);
        }
        Command::Reply {
            file,
            line,
            text,
            dry_run,
        } => {
            let vault = FsVault::new(vault_root(args.vault, &file));
            let builder = PartBuilder::new(&vault, &ImageRasterizer, cfg.max_image_edge);
            let built = match thread::build_thread_for_file(&builder, &file, line, &cfg.system_prompt)
            {
                Ok(built) => built,
                Err(ThreadError::NoHeadingsFound { line }) => {
                    eprintln!("No headings found at or above line {line}");
                    return Ok(());
                }
                Err(e) => return Err(e).context("building thread"),
            };

            let reply = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };

            let plan = ReplyPlan {
                edits: vec![ReplyEdit::for_thread(
                    file.to_string_lossy(),
                    &built,
                    &reply,
                )],
            };
            if dry_run {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                plan.apply().context("writing reply")?;
            }
        }
        Command::Headings { paths, ext } => {
            if !ext.is_empty() {
                cfg.file_extensions = ext;
            }
            let documents = input::find_documents(paths, &cfg.file_extensions)?;
            if documents.is_empty() {
                eprintln!("No matching files found");
                return Ok(());
            }

            for doc in &documents {
                let (text, metadata) = match input::load_document(doc, &MarkdownFormat) {
                    Ok(loaded) => loaded,
                    Err(e) => {
                        tracing::warn!(path = %doc.display(), %e, "skipping document");
                        continue;
                    }
                };
                println!("{}", doc.display());
                for (index, heading) in metadata.headings.iter().enumerate() {
                    let range = heading_index::heading_range(&metadata.headings, index, &text);
                    let depth = heading_index::enclosing_path(&metadata.headings, heading.line_start)
                        .len();
                    println!(
                        "{:indent$}{} {} (line {}, content {}..{})",
                        "",
                        "#".repeat(heading.level),
                        heading.title,
                        heading.line_start,
                        range.content_start,
                        range.content_end,
                        indent = depth.saturating_sub(1) * 2,
                    );
                }
            }
        }
    }

    Ok(())
}

fn vault_root(explicit: Option<PathBuf>, file: &Path) -> PathBuf {
    explicit.unwrap_or_else(|| {
        file.parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
    })
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("MDTHREAD_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
