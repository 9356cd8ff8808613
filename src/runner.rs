/// Dataset-level chunking pass.
///
/// Drives the chunk builder over every contract listed in the analyzer's
/// metadata JSONL: reads each `.sol` source, chunks it, and appends one JSON
/// record per contract to the output file. Each file's run is independent and
/// carries no shared state.
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::chunker::ContractChunks;
use crate::chunker::builder::ChunkBuilder;
use crate::chunker::elements::{ContractRecord, resolve_elements};
use crate::config::Config;
use crate::tokenizer::TokenCounter;

/// Counters for one dataset pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ChunkRunResult {
    /// Contracts chunked and written.
    pub contracts: usize,
    /// Total chunks emitted (placeholders included).
    pub chunks: usize,
    /// Oversized elements that went through the mini-splitter.
    pub oversized: usize,
}

/// Runs the whole chunking pipeline for one configuration.
pub struct ChunkRunner<'a, C: TokenCounter + ?Sized> {
    config: &'a Config,
    counter: &'a C,
}

impl<'a, C: TokenCounter + ?Sized> ChunkRunner<'a, C> {
    pub fn new(config: &'a Config, counter: &'a C) -> Self {
        Self { config, counter }
    }

    /// Process every contract record in the metadata file.
    ///
    /// Aborts on absent inputs: a missing `.sol` source, an unreadable
    /// metadata file, or a contracts directory with no candidate sources at
    /// all. Unresolvable element ranges inside a record are absorbed by the
    /// metadata resolver instead.
    pub fn run(&self) -> Result<ChunkRunResult> {
        let contracts_dir = Path::new(&self.config.contracts_dir);
        anyhow::ensure!(
            sol_file_count(contracts_dir) > 0,
            "no .sol sources found under {}",
            contracts_dir.display()
        );

        let records = self.read_records()?;
        anyhow::ensure!(
            !records.is_empty(),
            "no contract records in {}",
            self.config.elements_file
        );

        if let Some(parent) = Path::new(&self.config.output_file).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory: {}", parent.display())
                })?;
            }
        }
        let mut out = fs::File::create(&self.config.output_file)
            .with_context(|| format!("failed to create output: {}", self.config.output_file))?;

        let pb = ProgressBar::new(records.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
                .expect("valid template")
                .progress_chars("█▓░"),
        );

        let builder = ChunkBuilder::new(self.counter, self.config.max_tokens);
        let mut result = ChunkRunResult::default();

        for record in &records {
            pb.set_message(record.file.clone());

            let source_lines = self.read_source(&record.file)?;
            let elements = resolve_elements(&record.elements);

            let set = builder
                .chunk_file(&source_lines, &elements)
                .with_context(|| format!("chunking failed for {}", record.file))?;

            let chunks = set.into_chunks();
            result.chunks += chunks.len();
            result.oversized += chunks.iter().filter(|c| c.is_oversized()).count();

            let output = ContractChunks {
                contract: record.file.clone(),
                chunks,
            };
            serde_json::to_writer(&mut out, &output)
                .with_context(|| format!("failed to serialize chunks for {}", record.file))?;
            out.write_all(b"\n").context("failed to write output")?;

            result.contracts += 1;
            debug!("chunked {}", record.file);
            pb.inc(1);
        }

        pb.finish_and_clear();
        info!(
            "Chunked {} contracts into {} chunks ({} oversized)",
            result.contracts, result.chunks, result.oversized
        );
        Ok(result)
    }

    /// Read and parse the metadata JSONL, skipping blank lines.
    fn read_records(&self) -> Result<Vec<ContractRecord>> {
        let data = fs::read_to_string(&self.config.elements_file)
            .with_context(|| format!("failed to read metadata: {}", self.config.elements_file))?;

        let mut records = Vec::new();
        for (line_no, line) in data.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record: ContractRecord = serde_json::from_str(line).with_context(|| {
                format!(
                    "invalid metadata record at {}:{}",
                    self.config.elements_file,
                    line_no + 1
                )
            })?;
            records.push(record);
        }
        Ok(records)
    }

    /// Read a contract source as 1-indexed lines.
    fn read_source(&self, contract: &str) -> Result<Vec<String>> {
        let path: PathBuf = Path::new(&self.config.contracts_dir).join(format!("{contract}.sol"));
        anyhow::ensure!(path.exists(), "source file not found: {}", path.display());

        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read source: {}", path.display()))?;
        Ok(content.lines().map(str::to_string).collect())
    }
}

/// Count `.sol` files under a directory (gitignore-aware walk).
fn sol_file_count(dir: &Path) -> usize {
    WalkBuilder::new(dir)
        .hidden(false)
        .build()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path().is_file()
                && e.path().extension().and_then(|s| s.to_str()) == Some("sol")
        })
        .count()
}
