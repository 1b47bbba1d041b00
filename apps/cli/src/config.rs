//! Optional JSON configuration, merged under the command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rfctl_analysis::SessionConfig;
use rfctl_detect::MatcherConfig;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DEVICE: &str = "/dev/rfctl";
pub const DEFAULT_KEYS_DIR: &str = "./keys";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Receiver device read by `dump` and `detect`.
    pub device: PathBuf,
    /// Key library directory.
    pub keys_dir: PathBuf,
    pub session: SessionConfig,
    pub matcher: MatcherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            keys_dir: PathBuf::from(DEFAULT_KEYS_DIR),
            session: SessionConfig::default(),
            matcher: MatcherConfig::default(),
        }
    }
}

impl Config {
    /// Load `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }
}
