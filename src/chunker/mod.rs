/// Structural chunking engine.
///
/// Splits a comment-stripped Solidity source into token-budgeted chunks whose
/// boundaries follow structural units (functions, constructors, modifiers and
/// their internal control blocks) instead of arbitrary offsets, while keeping
/// an exact mapping from every chunk back to original line numbers.
pub mod builder;
pub mod elements;
pub mod mini_split;
pub mod ranges;
pub mod scan;

use serde::{Deserialize, Serialize};

/// A token-budget-respecting segment of source lines produced at top level.
///
/// `lines` and `line_indices` always have the same length, with
/// `line_indices` strictly increasing. The two payload forms are mutually
/// exclusive: a normal chunk carries its lines directly and has no
/// sub-chunks; an oversized placeholder carries empty `lines`, the union of
/// its sub-chunks' indices, and the element's full token count, with the
/// content living only in the sub-chunks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: usize,
    pub lines: Vec<String>,
    #[serde(rename = "lines_idx")]
    pub line_indices: Vec<usize>,
    pub token_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_chunks: Vec<SubChunk>,
}

impl Chunk {
    /// Whether this chunk is an oversized placeholder whose content lives in
    /// its sub-chunks.
    #[must_use]
    pub fn is_oversized(&self) -> bool {
        self.lines.is_empty() && !self.line_indices.is_empty()
    }
}

/// A finer-grained segment produced by the mini-splitter for one oversized
/// structural element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubChunk {
    pub lines: Vec<String>,
    #[serde(rename = "lines_idx")]
    pub line_indices: Vec<usize>,
    pub token_count: usize,
    pub parent_chunk_id: usize,
}

/// Ordered output of one file's chunking pass.
///
/// Mini-split output is logically attached to its placeholder chunk but kept
/// physically separate so downstream consumers can iterate sub-chunks without
/// unnesting.
#[derive(Debug, Default)]
pub struct ChunkSet {
    pub chunks: Vec<Chunk>,
    pub orphan_sub_chunks: Vec<SubChunk>,
}

impl ChunkSet {
    /// The id the next flushed chunk will receive (ids are 1-based positions).
    #[must_use]
    pub fn next_id(&self) -> usize {
        self.chunks.len() + 1
    }

    /// Sub-chunks belonging to the placeholder chunk with `parent_id`.
    pub fn sub_chunks_of(&self, parent_id: usize) -> impl Iterator<Item = &SubChunk> {
        self.orphan_sub_chunks
            .iter()
            .filter(move |s| s.parent_chunk_id == parent_id)
    }

    /// Fold the orphan sub-chunks back into their placeholder chunks,
    /// yielding the nested record form written to JSONL.
    #[must_use]
    pub fn into_chunks(mut self) -> Vec<Chunk> {
        for sub in self.orphan_sub_chunks.drain(..) {
            if let Some(parent) = self
                .chunks
                .iter_mut()
                .find(|c| c.id == sub.parent_chunk_id)
            {
                parent.sub_chunks.push(sub);
            }
        }
        self.chunks
    }
}

/// One contract's complete chunking result, as serialized to the output JSONL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractChunks {
    pub contract: String,
    pub chunks: Vec<Chunk>,
}

/// Shared open accumulator for both scan levels: lines, their original
/// indices, and the running token count.
#[derive(Debug, Default, Clone)]
pub(crate) struct Accumulator {
    pub lines: Vec<String>,
    pub line_indices: Vec<usize>,
    pub token_count: usize,
}

impl Accumulator {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Append a line without touching the token count.
    pub fn push_line(&mut self, line: String, index: usize) {
        self.lines.push(line);
        self.line_indices.push(index);
    }

    /// Append a line and add its token contribution.
    pub fn push_counted(&mut self, line: String, index: usize, tokens: usize) {
        self.push_line(line, index);
        self.token_count += tokens;
    }

    /// Merge `other` onto the end of this accumulator.
    pub fn absorb(&mut self, other: Accumulator) {
        self.lines.extend(other.lines);
        self.line_indices.extend(other.line_indices);
        self.token_count += other.token_count;
    }

    /// Take the contents, leaving this accumulator empty.
    pub fn take(&mut self) -> Accumulator {
        std::mem::take(self)
    }

    pub fn joined(&self) -> String {
        self.lines.join("\n")
    }

    pub fn into_chunk(self, id: usize) -> Chunk {
        Chunk {
            id,
            lines: self.lines,
            line_indices: self.line_indices,
            token_count: self.token_count,
            sub_chunks: Vec::new(),
        }
    }

    pub fn into_sub_chunk(self, parent_chunk_id: usize) -> SubChunk {
        SubChunk {
            lines: self.lines,
            line_indices: self.line_indices,
            token_count: self.token_count,
            parent_chunk_id,
        }
    }
}
