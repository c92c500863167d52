//! Key index and chunk download handlers.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use tabled::Tabled;

use exposure_core::NetworkManager;
use exposure_core::models::KeysIndex;

use crate::cli::{GlobalOpts, KeysArgs, KeysCommand};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Tabled)]
struct ChunkSummary {
    #[tabled(rename = "Chunk")]
    chunk: u64,
    #[tabled(rename = "Bytes")]
    bytes: usize,
    #[tabled(rename = "File")]
    #[serde(skip_serializing_if = "String::is_empty")]
    file: String,
}

fn index_detail(index: &KeysIndex) -> Vec<(String, String)> {
    let published = index.published();
    vec![
        ("Oldest".into(), index.oldest.to_string()),
        ("Newest".into(), index.newest.to_string()),
        ("Published".into(), published.to_string()),
    ]
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Chunk file name inside the output directory.
fn chunk_path(dir: &Path, chunk: u64) -> PathBuf {
    dir.join(format!("{chunk}.zip"))
}

async fn summarize(
    chunks: Vec<(u64, Bytes)>,
    out: Option<&Path>,
) -> Result<Vec<ChunkSummary>, CliError> {
    if let Some(dir) = out {
        tokio::fs::create_dir_all(dir).await?;
    }

    let mut summaries = Vec::with_capacity(chunks.len());
    for (chunk, data) in chunks {
        let file = match out {
            Some(dir) => {
                let path = chunk_path(dir, chunk);
                tokio::fs::write(&path, &data).await?;
                path.display().to_string()
            }
            None => String::new(),
        };
        summaries.push(ChunkSummary {
            chunk,
            bytes: data.len(),
            file,
        });
    }
    Ok(summaries)
}

fn render_chunks(summaries: &[ChunkSummary], global: &GlobalOpts) {
    let out = output::render_list(&global.output, summaries, Clone::clone, |s| {
        s.chunk.to_string()
    });
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    manager: &NetworkManager,
    args: KeysArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        KeysCommand::Index => {
            let index = manager.get_keys_index().await?;
            let out = output::render_single(&global.output, &index, index_detail, |i| {
                format!("{}..{}", i.oldest, i.newest)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        KeysCommand::Download { chunks, out } => {
            let data = manager.download_chunks(&chunks).await?;
            let pairs = chunks.into_iter().zip(data).collect();
            let summaries = summarize(pairs, out.as_deref()).await?;
            render_chunks(&summaries, global);
            Ok(())
        }

        KeysCommand::Sync { since, out } => {
            let fresh = manager.download_new_chunks(since).await?;
            if fresh.is_empty() {
                output::print_status("Already up to date", global.quiet);
                return Ok(());
            }
            let summaries = summarize(fresh, out.as_deref()).await?;
            render_chunks(&summaries, global);
            Ok(())
        }
    }
}
