//! # solchunk — Structural Chunking Engine for Solidity
//!
//! Splits comment-stripped Solidity sources into contiguous, token-budgeted
//! segments whose boundaries follow syntactic units (functions, modifiers,
//! control blocks), with an exact mapping from every segment back to original
//! line numbers so vulnerability findings keyed by line can be re-attached to
//! the right segment.
//!
//! ## Architecture
//!
//! - **[`config`]** — Configuration loading, validation, and defaults
//! - **[`tokenizer`]** — Token counting (HuggingFace tokenizer.json, mock for tests)
//! - **[`chunker`]** — Chunk builder, mini-splitter, lexical scan, line-range codec
//! - **[`report`]** — Range-summarized records and label re-attachment matching
//! - **[`runner`]** — Dataset pass: walk metadata, chunk each contract, write JSONL

pub mod chunker;
pub mod config;
pub mod report;
pub mod runner;
pub mod tokenizer;
