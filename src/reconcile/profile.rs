//! POSIX shell-profile strategy.
//!
//! Bindings are written as `export` lines in the user's profile file.
//! The file is read first and matching bindings are replaced or skipped,
//! so repeated runs never accumulate duplicates. Each apply is a single
//! whole-file write; a failure here leaves previously completed edits
//! intact.

use anyhow::{Context, Result, bail};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::Platform;

/// The search-path line references the variable rather than a literal
/// expansion so the binding follows GOROOT if it is ever changed.
const PATH_LINE: &str = "export PATH=$PATH:$GOROOT/bin";

pub struct ShellProfile {
    path: PathBuf,
}

impl ShellProfile {
    pub fn new(path: PathBuf) -> Self {
        ShellProfile { path }
    }

    fn read(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(s),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to read {}", self.path.display()))
            }
        }
    }

    fn write(&self, lines: Vec<String>) -> Result<()> {
        let mut out = lines.join("\n");
        out.push('\n');
        fs::write(&self.path, out)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

impl Platform for ShellProfile {
    /// Replace an existing `export GOROOT=` line, or append one.
    fn set_install_root(&self, root: &Path) -> Result<()> {
        let line = format!("export GOROOT={}", root.display());
        let current = self.read()?;
        if current.lines().any(|l| l.trim() == line) {
            return Ok(());
        }
        let mut lines: Vec<String> = current.lines().map(str::to_string).collect();
        let mut replaced = false;
        for l in &mut lines {
            if l.trim_start().starts_with("export GOROOT=") {
                *l = line.clone();
                replaced = true;
                break;
            }
        }
        if !replaced {
            lines.push(line);
        }
        self.write(lines)
    }

    /// Append the PATH extension once. An existing `export PATH=` line
    /// already containing `$GOROOT/bin` counts as present; other PATH
    /// lines in the profile are never touched.
    fn add_bin_to_path(&self, _root: &Path) -> Result<()> {
        let current = self.read()?;
        let present = current.lines().any(|l| {
            let t = l.trim();
            t.starts_with("export PATH=") && t.contains("$GOROOT/bin")
        });
        if present {
            return Ok(());
        }
        let mut lines: Vec<String> = current.lines().map(str::to_string).collect();
        lines.push(PATH_LINE.to_string());
        self.write(lines)
    }

    fn validate_install_path(&self, path: &str) -> Result<()> {
        if path.is_empty() {
            bail!("install path is empty");
        }
        if path.len() > 4096 {
            bail!("install path exceeds 4096 characters");
        }
        if path.contains('\0') {
            bail!("install path contains a NUL character");
        }
        if !path.starts_with('/') {
            bail!("install path must be absolute: {}", path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn profile_in(dir: &Path) -> ShellProfile {
        ShellProfile::new(dir.join(".bashrc"))
    }

    #[test]
    fn creates_profile_with_both_bindings() {
        let td = tempdir().unwrap();
        let p = profile_in(td.path());
        p.set_install_root(Path::new("/opt/go")).unwrap();
        p.add_bin_to_path(Path::new("/opt/go")).unwrap();

        let txt = fs::read_to_string(td.path().join(".bashrc")).unwrap();
        assert!(txt.contains("export GOROOT=/opt/go\n"));
        assert!(txt.contains("export PATH=$PATH:$GOROOT/bin\n"));
    }

    #[test]
    fn repeated_apply_leaves_exactly_one_binding_each() {
        let td = tempdir().unwrap();
        let p = profile_in(td.path());
        for _ in 0..3 {
            p.set_install_root(Path::new("/opt/go")).unwrap();
            p.add_bin_to_path(Path::new("/opt/go")).unwrap();
        }

        let txt = fs::read_to_string(td.path().join(".bashrc")).unwrap();
        assert_eq!(txt.matches("export GOROOT=").count(), 1);
        assert_eq!(txt.matches("$GOROOT/bin").count(), 1);
    }

    #[test]
    fn changed_root_replaces_the_old_binding_in_place() {
        let td = tempdir().unwrap();
        let path = td.path().join(".bashrc");
        fs::write(
            &path,
            "alias ll='ls -l'\nexport GOROOT=/old/go\nexport EDITOR=vim\n",
        )
        .unwrap();

        let p = ShellProfile::new(path.clone());
        p.set_install_root(Path::new("/new/go")).unwrap();

        let txt = fs::read_to_string(&path).unwrap();
        assert_eq!(txt.matches("export GOROOT=").count(), 1);
        assert!(txt.contains("export GOROOT=/new/go"));
        // unrelated lines survive in order
        assert!(txt.starts_with("alias ll='ls -l'\n"));
        assert!(txt.contains("export EDITOR=vim"));
    }

    #[test]
    fn unrelated_path_lines_are_not_touched() {
        let td = tempdir().unwrap();
        let path = td.path().join(".bashrc");
        fs::write(&path, "export PATH=$PATH:$HOME/.cargo/bin\n").unwrap();

        let p = ShellProfile::new(path.clone());
        p.add_bin_to_path(Path::new("/opt/go")).unwrap();

        let txt = fs::read_to_string(&path).unwrap();
        assert!(txt.contains("export PATH=$PATH:$HOME/.cargo/bin\n"));
        assert!(txt.contains("export PATH=$PATH:$GOROOT/bin\n"));
    }

    #[test]
    fn validates_unix_paths() {
        let td = tempdir().unwrap();
        let p = profile_in(td.path());
        assert!(p.validate_install_path("/usr/local/go").is_ok());
        assert!(p.validate_install_path("").is_err());
        assert!(p.validate_install_path("relative/go").is_err());
        assert!(p.validate_install_path("/bad\0path").is_err());
        assert!(p.validate_install_path(&"/x".repeat(3000)).is_err());
    }
}
