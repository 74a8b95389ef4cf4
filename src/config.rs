//! Settings read from an optional JSON file. Every field has a default so
//! a partial file is enough.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use schemars::{JsonSchema, schema_for};
use serde::{Deserialize, Serialize};

use crate::pgn::{DEFAULT_LINE_WIDTH, Profile};

pub const DEFAULT_BOOKMARK_PAGE_SIZE: usize = 9;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Config {
    /// Maximum length of a move text line when saving
    pub line_width: usize,
    /// Bookmarks shown per page
    pub bookmark_page_size: usize,
    pub export: ExportConfig,
    /// Log filter used when RUST_LOG is not set
    pub log_level: String,
}

/// What plain PGN export keeps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExportConfig {
    pub keep_comments: bool,
    pub keep_evaluations: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            line_width: DEFAULT_LINE_WIDTH,
            bookmark_page_size: DEFAULT_BOOKMARK_PAGE_SIZE,
            export: ExportConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            keep_comments: true,
            keep_evaluations: true,
        }
    }
}

impl ExportConfig {
    pub fn profile(self) -> Profile {
        Profile::Export {
            keep_comments: self.keep_comments,
            keep_evaluations: self.keep_evaluations,
        }
    }
}

impl Config {
    /// Reads the config from `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(text).context("config is not valid JSON")?;
        // zero would make paging and wrapping meaningless
        config.line_width = config.line_width.max(1);
        config.bookmark_page_size = config.bookmark_page_size.max(1);
        Ok(config)
    }

    /// JSON schema of the config file, pretty printed
    pub fn json_schema() -> Result<String> {
        serde_json::to_string_pretty(&schema_for!(Config)).context("failed to serialize config schema")
    }
}
