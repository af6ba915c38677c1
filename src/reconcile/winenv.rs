//! Windows persistent-variable-store strategy.
//!
//! Variables are written at machine scope with `setx ... /M` so they
//! survive the process and new terminal sessions. The search path is
//! read back first and `%GOROOT%\bin` is only appended when it is not
//! already an exact member.

use anyhow::{Context, Result, bail};
use regex::Regex;
use std::path::Path;
use std::process::Command;

use super::Platform;

/// PATH member added for the toolchain, by variable reference.
const BIN_MEMBER: &str = "%GOROOT%\\bin";

pub struct WindowsEnv;

impl WindowsEnv {
    fn setx(&self, name: &str, value: &str) -> Result<()> {
        let status = Command::new("setx")
            .args([name, value, "/M"])
            .status()
            .with_context(|| format!("failed to run setx {name}"))?;
        if !status.success() {
            bail!("setx {} exited with {}", name, status);
        }
        Ok(())
    }

    fn current_path(&self) -> Result<String> {
        let output = Command::new("powershell")
            .args(["-Command", "echo $env:Path"])
            .output()
            .context("failed to read PATH via powershell")?;
        if !output.status.success() {
            bail!("powershell exited with {}", output.status);
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl Platform for WindowsEnv {
    fn set_install_root(&self, root: &Path) -> Result<()> {
        self.setx("GOROOT", &root.display().to_string())
    }

    fn add_bin_to_path(&self, _root: &Path) -> Result<()> {
        let current = self.current_path()?;
        if path_contains(&current, BIN_MEMBER) {
            return Ok(());
        }
        let updated = format!("{};{}", current, BIN_MEMBER);
        self.setx("PATH", &updated)
    }

    fn validate_install_path(&self, path: &str) -> Result<()> {
        validate_windows_path(path)
    }
}

/// Exact member comparison after splitting on the path-list separator.
fn path_contains(path_list: &str, member: &str) -> bool {
    path_list.split(';').any(|p| p.trim() == member)
}

fn validate_windows_path(path: &str) -> Result<()> {
    if path.len() > 260 {
        bail!("install path exceeds 260 characters");
    }
    let drive = Regex::new(r"^[A-Za-z]:[\\/]").unwrap();
    if !drive.is_match(path) {
        bail!("install path must start with a drive letter: {}", path);
    }
    for (i, c) in path.char_indices() {
        // the drive-letter colon is the only colon allowed
        if c == ':' && i == 1 {
            continue;
        }
        if matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*') {
            bail!("install path contains illegal character '{}'", c);
        }
    }
    Ok(())
}
