//! docchat-ingest: run the structuring pipeline from the command line.
//!
//! `chunk` turns parser output (markdown text, JSON records, or a JSON section
//! tree) into reconciled chunks; `reconstruct` turns a retrieved chunk set back
//! into ordered sections. JSON goes to stdout, logs to stderr.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use docchat_core::config::{load_dotenv, Config};
use docchat_core::SectionRecord;
use docchat_ingest::document::{
    reconstruct_sections, records_from_markdown, render_context, validate_chunk, Chunk,
    SectionNode,
};
use docchat_ingest::{IngestPipeline, IngestedDocument, WhitespaceTokenizer};

// ── CLI ─────────────────────────────────────────────────────────────

/// Document structuring pipeline: chunk parsed documents and reassemble retrieved chunks.
#[derive(Parser, Debug)]
#[command(name = "docchat-ingest", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chunk a parsed document and print reconciled chunks as JSON.
    Chunk {
        /// Markdown/text file, JSON record array, or JSON section tree.
        path: PathBuf,

        /// Document identifier used for section ids (random when omitted).
        #[arg(long)]
        doc_id: Option<String>,

        /// Override CHUNK_MAX_TOKENS.
        #[arg(long)]
        max_tokens: Option<usize>,

        /// Override CHUNK_OVERLAP_TOKENS.
        #[arg(long)]
        overlap: Option<usize>,

        /// Override CHUNK_MIN_TOKENS.
        #[arg(long)]
        min_tokens: Option<usize>,
    },

    /// Reassemble a JSON array of retrieved chunks into ordered sections.
    Reconstruct {
        path: PathBuf,

        /// Print model-ready context text instead of JSON.
        #[arg(long)]
        render: bool,
    },
}

// ── Commands ────────────────────────────────────────────────────────

fn run_chunk(
    mut config: Config,
    path: &Path,
    doc_id: Option<String>,
    max_tokens: Option<usize>,
    overlap: Option<usize>,
    min_tokens: Option<usize>,
) -> anyhow::Result<()> {
    if let Some(max) = max_tokens {
        config.chunking.max_tokens_per_chunk = max;
        config.reconcile.max_tokens_per_chunk = max;
    }
    if let Some(overlap) = overlap {
        config.chunking.token_overlap = overlap;
    }
    if let Some(min) = min_tokens {
        config.reconcile.min_tokens_per_chunk = min;
    }
    config.log_summary();

    let pipeline = IngestPipeline::from_config(&config, Arc::new(WhitespaceTokenizer))?;
    let doc_id = doc_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let document = ingest_input(&pipeline, &doc_id, path, &raw)?;
    info!(
        document_id = %document.document_id,
        chunks = document.chunks.len(),
        "chunking complete"
    );
    println!("{}", serde_json::to_string_pretty(&document.chunks)?);
    Ok(())
}

fn ingest_input(
    pipeline: &IngestPipeline,
    doc_id: &str,
    path: &Path,
    raw: &str,
) -> anyhow::Result<IngestedDocument> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        return Ok(pipeline.ingest_records(doc_id, &records_from_markdown(raw))?);
    }

    if raw.trim_start().starts_with('[') {
        let records = SectionRecord::list_from_json(raw).with_context(|| {
            format!("expected an array of section records in {}", path.display())
        })?;
        return Ok(pipeline.ingest_records(doc_id, &records)?);
    }
    let tree: SectionNode = serde_json::from_str(raw)
        .with_context(|| format!("expected a section tree object in {}", path.display()))?;
    Ok(pipeline.ingest_tree(doc_id, tree)?)
}

fn run_reconstruct(path: &Path, render: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let chunks: Vec<Chunk> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid chunk array in {}", path.display()))?;
    for (i, chunk) in chunks.iter().enumerate() {
        validate_chunk(chunk).with_context(|| format!("chunk #{i} is malformed"))?;
    }

    let sections = reconstruct_sections(&chunks);
    info!(
        chunks = chunks.len(),
        sections = sections.len(),
        "reconstruction complete"
    );
    if render {
        println!("{}", render_context(&sections));
    } else {
        println!("{}", serde_json::to_string_pretty(&sections)?);
    }
    Ok(())
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();

    match cli.command {
        Command::Chunk {
            path,
            doc_id,
            max_tokens,
            overlap,
            min_tokens,
        } => run_chunk(Config::from_env(), &path, doc_id, max_tokens, overlap, min_tokens),
        Command::Reconstruct { path, render } => run_reconstruct(&path, render),
    }
}
