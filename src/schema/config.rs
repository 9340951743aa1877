/// Bot configuration: RON settings file and the author ignore list.
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::filter::FilterConfig;
use crate::core::generator::DEFAULT_ATTEMPT_BUDGET;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    /// Regular expression of blocked content.
    #[serde(default)]
    pub ng_words: Option<String>,
    /// Author ignore list; a missing file means nobody is ignored.
    #[serde(default = "default_ignores_file")]
    pub ignores_file: PathBuf,
    /// Maximum output length in characters.
    #[serde(default)]
    pub max_length: Option<usize>,
    #[serde(default = "default_attempt_budget")]
    pub attempt_budget: u32,
    /// Fixed RNG seed; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_ignores_file() -> PathBuf {
    PathBuf::from("ignores.txt")
}

fn default_attempt_budget() -> u32 {
    DEFAULT_ATTEMPT_BUDGET
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            ng_words: None,
            ignores_file: default_ignores_file(),
            max_length: None,
            attempt_budget: default_attempt_budget(),
            seed: None,
        }
    }
}

impl BotConfig {
    pub fn parse_ron(input: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(input)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_ron(&contents)
    }

    /// Build the line filter settings, reading the ignore list from disk.
    pub fn filter_config(&self) -> Result<FilterConfig, ConfigError> {
        Ok(FilterConfig {
            ng_words: self.ng_words.clone(),
            ignored_authors: load_ignores(&self.ignores_file)?,
        })
    }
}

/// Parse an ignore list: one author per line, the first space-separated
/// field is the author id, `#` starts a comment line.
pub fn parse_ignores(text: &str) -> FxHashSet<String> {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| line.split(' ').next())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Load an ignore list. A missing file is an empty list.
pub fn load_ignores(path: &Path) -> Result<FxHashSet<String>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(parse_ignores(&text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FxHashSet::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}
