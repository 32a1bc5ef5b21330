//! Configuration schema for lockscope
//!
//! Configuration is stored at `~/.config/lockscope/config.toml`

use crate::cache::Retention;
use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Where to find assets files
    pub assets: AssetsConfig,

    /// Restore graph cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Assets file location relative to a project directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Intermediate output directory restore writes into
    pub obj_dir: String,

    /// Assets file name inside `obj_dir`
    pub file_name: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            obj_dir: "obj".to_string(),
            file_name: "project.assets.json".to_string(),
        }
    }
}

/// Restore graph cache configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// "pinned" (keep the last graph alive) or "weak" (freed once unused)
    pub retention: Retention,
}
