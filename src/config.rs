use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::config_file;

/// Startup configuration, built once in `main` and threaded into each
/// component. Loaded from `$XDG_CONFIG_HOME/goup/config.toml` when that
/// file exists; every field falls back to a default otherwise.
///
/// Example TOML:
/// ```toml
/// index_url     = "https://go.dev/dl/?mode=json"
/// download_base = "https://go.dev/dl/"
/// goproxy       = "https://goproxy.cn,direct"
/// profile       = "/home/user/.zshrc"
/// ```
#[derive(Debug, Deserialize)]
pub struct Config {
    /// JSON release index, ordered newest-first.
    #[serde(default = "default_index_url")]
    pub index_url: String,
    /// Base URL the release filename is appended to.
    #[serde(default = "default_download_base")]
    pub download_base: String,
    /// Module proxy written via `go env -w GOPROXY=...` after install.
    #[serde(default = "default_goproxy")]
    pub goproxy: String,
    /// Shell profile to reconcile on Unix. Defaults to `~/.bashrc`.
    #[serde(default)]
    pub profile: Option<PathBuf>,
}

fn default_index_url() -> String {
    "https://go.dev/dl/?mode=json".to_string()
}

fn default_download_base() -> String {
    "https://go.dev/dl/".to_string()
}

fn default_goproxy() -> String {
    "https://goproxy.cn,direct".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            index_url: default_index_url(),
            download_base: default_download_base(),
            goproxy: default_goproxy(),
            profile: None,
        }
    }
}

impl Config {
    /// Load the configuration from the default location.
    ///
    /// A missing file is not an error; defaults apply.
    pub fn load() -> Result<Config> {
        Config::load_from(&config_file()?)
    }

    /// Load from an explicit path (missing file → defaults).
    pub fn load_from(path: &Path) -> Result<Config> {
        let txt = match fs::read_to_string(path) {
            Ok(txt) => txt,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()));
            }
        };
        toml::from_str(&txt).with_context(|| format!("failed to parse {}", path.display()))
    }
}
