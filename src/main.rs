use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use solchunk::config::Config;
use solchunk::report;
use solchunk::runner::ChunkRunner;
use solchunk::tokenizer::TokenCounter;
use solchunk::tokenizer::codebert::CodeBertCounter;
use solchunk::tokenizer::mock::MockCounter;

#[derive(Parser)]
#[command(name = "solchunk", version, about = "Structure-aware chunking of Solidity sources")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chunk every contract listed in the element metadata file
    Chunk {
        /// Path to the JSON configuration file
        #[arg(long, default_value = "config.json")]
        config: String,
        /// Override the configured token budget
        #[arg(long)]
        max_tokens: Option<usize>,
        /// Count whitespace fragments instead of loading a tokenizer file
        #[arg(long)]
        mock_tokenizer: bool,
    },
    /// Produce the range-summarized form of an existing chunk file
    Summarize {
        /// Chunk JSONL produced by `chunk`
        #[arg(long)]
        input: String,
        /// Destination summary JSONL
        #[arg(long)]
        output: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Chunk {
            config,
            max_tokens,
            mock_tokenizer,
        } => {
            let mut config = Config::load(&config)?;
            if let Some(budget) = max_tokens {
                config.max_tokens = budget;
            }
            config.validate().context("invalid configuration")?;

            let counter: Box<dyn TokenCounter> = if mock_tokenizer {
                Box::new(MockCounter)
            } else {
                Box::new(CodeBertCounter::from_file(Path::new(&config.tokenizer.path))?)
            };

            let runner = ChunkRunner::new(&config, counter.as_ref());
            let result = runner.run()?;
            info!(
                "Done: {} contracts, {} chunks, {} oversized",
                result.contracts, result.chunks, result.oversized
            );
        }
        Command::Summarize { input, output } => {
            let written = report::summarize_file(Path::new(&input), Path::new(&output))?;
            info!("Done: {written} contracts summarized");
        }
    }

    Ok(())
}
