//! gen-chunks configuration: document locations and chunking limits.

use crate::text::Language;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Defaults for a fresh install
const DEFAULT_INPUT_DIR: &str = "documentos_fuente";
const DEFAULT_OUTPUT_FILE: &str = "info_dia_preventivo.json";
const DEFAULT_MAX_CHUNK_CHARS: usize = 1500;
const DEFAULT_OVERLAP_CHARS: usize = 200;

/// Errors raised while loading, saving, or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_chunk_chars must be greater than zero")]
    ZeroChunkSize,

    #[error("overlap_chars ({overlap}) must be smaller than max_chunk_chars ({max})")]
    OverlapTooLarge { overlap: usize, max: usize },

    #[error("Could not determine home directory")]
    NoHomeDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Validated size limits for the chunk builder, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkConfig {
    max_chunk_chars: usize,
    overlap_chars: usize,
}

impl ChunkConfig {
    /// Create limits, rejecting combinations where chunking cannot make progress.
    pub fn new(max_chunk_chars: usize, overlap_chars: usize) -> Result<Self, ConfigError> {
        if max_chunk_chars == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if overlap_chars >= max_chunk_chars {
            return Err(ConfigError::OverlapTooLarge {
                overlap: overlap_chars,
                max: max_chunk_chars,
            });
        }
        Ok(Self {
            max_chunk_chars,
            overlap_chars,
        })
    }

    pub fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    pub fn overlap_chars(&self) -> usize {
        self.overlap_chars
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: DEFAULT_MAX_CHUNK_CHARS,
            overlap_chars: DEFAULT_OVERLAP_CHARS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory holding the PDF and DOCX files
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// JSON knowledge file chunks are merged into
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,

    /// Maximum characters per chunk (a single longer sentence is kept whole)
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Characters carried from the end of one chunk into the next
    #[serde(default = "default_overlap_chars")]
    pub overlap_chars: usize,

    /// Language used for sentence splitting
    #[serde(default)]
    pub language: Language,

    /// Also process documents in subdirectories
    #[serde(default)]
    pub recursive: bool,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT_DIR)
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

fn default_max_chunk_chars() -> usize {
    DEFAULT_MAX_CHUNK_CHARS
}

fn default_overlap_chars() -> usize {
    DEFAULT_OVERLAP_CHARS
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_file: default_output_file(),
            max_chunk_chars: default_max_chunk_chars(),
            overlap_chars: default_overlap_chars(),
            language: Language::default(),
            recursive: false,
        }
    }
}

impl IngestConfig {
    /// Get the config file path: ~/.config/cli-programs/gen-chunks.toml
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home
            .join(".config")
            .join("cli-programs")
            .join("gen-chunks.toml"))
    }

    /// Load config from a file, returning defaults if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: IngestConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save config to a file, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validated chunking limits.
    pub fn chunk_config(&self) -> Result<ChunkConfig, ConfigError> {
        ChunkConfig::new(self.max_chunk_chars, self.overlap_chars)
    }
}
