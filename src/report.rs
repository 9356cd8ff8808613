/// Range-summarized chunk records and provenance matching.
///
/// The full chunk output is bulky; downstream label attachment and human
/// inspection work off a compact form where `lines_idx` is collapsed into
/// minimal range strings. Labeled sub-chunks come back keyed only by those
/// range lists, so exact range-list equality is the sole basis for
/// re-associating a label record with its source sub-chunk.
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::chunker::ranges::to_consecutive_ranges;
use crate::chunker::{Chunk, ContractChunks, SubChunk};

/// Compact form of a sub-chunk: provenance ranges and token count only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubChunkSummary {
    pub lines_range: Vec<String>,
    pub token_count: usize,
}

/// Compact form of a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSummary {
    pub id: usize,
    pub lines_range: Vec<String>,
    pub token_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_chunks: Vec<SubChunkSummary>,
}

/// One contract's summarized chunk list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSummary {
    pub contract: String,
    pub chunks: Vec<ChunkSummary>,
}

fn summarize_chunk(chunk: &Chunk) -> ChunkSummary {
    ChunkSummary {
        id: chunk.id,
        lines_range: to_consecutive_ranges(&chunk.line_indices),
        token_count: chunk.token_count,
        sub_chunks: chunk
            .sub_chunks
            .iter()
            .map(|sub| SubChunkSummary {
                lines_range: to_consecutive_ranges(&sub.line_indices),
                token_count: sub.token_count,
            })
            .collect(),
    }
}

/// Collapse a full contract record into its summarized form.
#[must_use]
pub fn summarize(contract: &ContractChunks) -> ContractSummary {
    ContractSummary {
        contract: contract.contract.clone(),
        chunks: contract.chunks.iter().map(summarize_chunk).collect(),
    }
}

/// Find the source sub-chunk whose provenance ranges equal `label_ranges`.
///
/// `used` carries the indices already claimed by earlier label records, so
/// each source sub-chunk is matched at most once. Returns the matched index
/// and sub-chunk, or `None` when no unclaimed sub-chunk has equal ranges.
pub fn match_sub_chunk<'a>(
    label_ranges: &[String],
    sub_chunks: &'a [SubChunk],
    used: &mut HashSet<usize>,
) -> Option<(usize, &'a SubChunk)> {
    for (idx, sub) in sub_chunks.iter().enumerate() {
        if used.contains(&idx) {
            continue;
        }
        if to_consecutive_ranges(&sub.line_indices) == label_ranges {
            used.insert(idx);
            return Some((idx, sub));
        }
    }
    None
}

/// Summarize a whole chunk JSONL file into a summary JSONL file.
///
/// Returns the number of contract records written.
pub fn summarize_file(input: &Path, output: &Path) -> Result<usize> {
    let data = fs::read_to_string(input)
        .with_context(|| format!("failed to read chunk file: {}", input.display()))?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create output directory: {}", parent.display()))?;
        }
    }

    let mut out = fs::File::create(output)
        .with_context(|| format!("failed to create summary file: {}", output.display()))?;

    let mut written = 0;
    for (line_no, line) in data.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: ContractChunks = serde_json::from_str(line)
            .with_context(|| format!("invalid chunk record at line {}", line_no + 1))?;
        let summary = summarize(&record);
        serde_json::to_writer(&mut out, &summary).context("failed to serialize summary")?;
        out.write_all(b"\n").context("failed to write summary")?;
        written += 1;
    }

    info!("Summarized {written} contract records to {}", output.display());
    Ok(written)
}
