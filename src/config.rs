/// Configuration module for solchunk.
///
/// Handles loading, validating, and providing default configuration values.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// ── Default value functions ──────────────────────────────────────────

fn default_contracts_dir() -> String {
    "contractsSelectedClean".to_string()
}

fn default_elements_file() -> String {
    "splitContracts.jsonl".to_string()
}

fn default_output_file() -> String {
    "contractsChunks.jsonl".to_string()
}

fn default_max_tokens() -> usize {
    512
}

fn default_tokenizer_path() -> String {
    "models/codebert-base/tokenizer.json".to_string()
}

// ── Config structs ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Directory holding the comment-stripped `.sol` sources.
    #[serde(default = "default_contracts_dir")]
    pub contracts_dir: String,

    /// Structural-element metadata JSONL from the external analyzer.
    #[serde(default = "default_elements_file")]
    pub elements_file: String,

    /// Destination JSONL for the chunk records.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Token budget per chunk.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    #[serde(default)]
    pub tokenizer: TokenizerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TokenizerConfig {
    /// Path to the classifier's `tokenizer.json`.
    #[serde(default = "default_tokenizer_path")]
    pub path: String,
}

// ── Default impls ────────────────────────────────────────────────────

impl Default for Config {
    fn default() -> Self {
        Self {
            contracts_dir: default_contracts_dir(),
            elements_file: default_elements_file(),
            output_file: default_output_file(),
            max_tokens: default_max_tokens(),
            tokenizer: TokenizerConfig::default(),
        }
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            path: default_tokenizer_path(),
        }
    }
}

// ── Config implementation ────────────────────────────────────────────

impl Config {
    /// Load configuration from a JSON file.
    ///
    /// If `config_path` is empty, defaults to `"config.json"`.
    /// If the file does not exist, returns a default config and optionally
    /// generates a template file.
    pub fn load(config_path: &str) -> Result<Self> {
        let path = if config_path.is_empty() {
            "config.json"
        } else {
            config_path
        };

        if !Path::new(path).exists() {
            info!("{path} not found, using defaults");
            let cfg = Self::default();

            // Generate template only for the default path
            if path == "config.json" {
                match cfg.save(path) {
                    Ok(()) => info!("Generated config template: {path}"),
                    Err(e) => warn!("Failed to generate config template: {e}"),
                }
            }

            return Ok(cfg);
        }

        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {path}"))?;

        let cfg: Config = match serde_json::from_str(&data) {
            Ok(c) => c,
            Err(e) => {
                warn!("Invalid JSON in {path}: {e}");
                warn!("Using default configuration");
                return Ok(Self::default());
            }
        };

        info!("Loaded configuration from {path}");
        Ok(cfg)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &str) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("failed to marshal config")?;
        std::fs::write(path, data).with_context(|| format!("failed to write config: {path}"))?;
        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.max_tokens > 0, "max_tokens must be positive");
        anyhow::ensure!(
            !self.contracts_dir.is_empty(),
            "contracts_dir must not be empty"
        );
        anyhow::ensure!(
            !self.elements_file.is_empty(),
            "elements_file must not be empty"
        );
        anyhow::ensure!(
            !self.output_file.is_empty(),
            "output_file must not be empty"
        );
        anyhow::ensure!(
            !self.tokenizer.path.is_empty(),
            "tokenizer.path must not be empty"
        );
        Ok(())
    }
}

// ── Tests ────────────────────────────────────────────────────────────
