use anyhow::{Context, Result};
use std::{env, path::PathBuf};

/// Resolve the current user's home directory.
///
/// Checks `HOME` first (Unix), then `USERPROFILE` (Windows).
pub fn user_home() -> Result<PathBuf> {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .context("cannot determine home directory (HOME/USERPROFILE unset)")
}

/// Directory holding goup's own configuration (`$XDG_CONFIG_HOME/goup`
/// or `~/.config/goup`).
pub fn goup_home() -> Result<PathBuf> {
    let base = match env::var_os("XDG_CONFIG_HOME") {
        Some(xdg) => PathBuf::from(xdg),
        None => user_home()?.join(".config"),
    };
    Ok(base.join("goup"))
}

/// Path of the optional `config.toml`.
pub fn config_file() -> Result<PathBuf> {
    Ok(goup_home()?.join("config.toml"))
}

/// Install root used when the toolchain is absent and the user accepts
/// the default at the prompt: `<home>/go`.
pub fn default_install_root() -> Result<PathBuf> {
    Ok(user_home()?.join("go"))
}
