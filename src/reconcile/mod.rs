//! Environment reconciliation.
//!
//! After extraction the new install root has to become discoverable by
//! future shell sessions and by the toolchain itself. Persisted state is
//! heterogeneous and possibly absent (shell profile on Unix, the
//! machine-wide variable store on Windows), so each platform supplies one
//! strategy implementing the same capability set. Every edit is
//! idempotent: re-applying it to already-reconciled state produces no
//! duplicate entries and no observable change.

mod profile;
mod winenv;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::goenv;
use crate::paths::user_home;

pub use profile::ShellProfile;
pub use winenv::WindowsEnv;

/// Capability set every platform must provide.
///
/// Selected once at startup (see [`platform`]); no other code branches
/// on the OS tag.
pub trait Platform {
    /// Persist the install-root variable (GOROOT) so it survives this
    /// process and new terminal sessions.
    fn set_install_root(&self, root: &Path) -> Result<()>;

    /// Make `$GOROOT/bin` a member of the persisted executable search
    /// path, unless an equivalent member already exists.
    fn add_bin_to_path(&self, root: &Path) -> Result<()>;

    /// Basic syntax validation for an interactively supplied install
    /// path. Reports the problem; never auto-corrects.
    fn validate_install_path(&self, path: &str) -> Result<()>;
}

/// Select the strategy for the running platform.
pub fn platform(cfg: &Config) -> Result<Box<dyn Platform>> {
    if cfg!(windows) {
        Ok(Box::new(WindowsEnv))
    } else {
        let profile = match &cfg.profile {
            Some(p) => p.clone(),
            None => user_home()?.join(".bashrc"),
        };
        Ok(Box::new(ShellProfile::new(profile)))
    }
}

/// Create `<root>/gomodcache` and persist it as the module cache via the
/// freshly installed toolchain's own configuration mechanism.
pub fn set_module_cache(root: &Path) -> Result<PathBuf> {
    let cache = root.join("gomodcache");
    std::fs::create_dir_all(&cache)
        .with_context(|| format!("failed to create {}", cache.display()))?;
    goenv::write_default(&go_bin(root), "GOMODCACHE", &cache.to_string_lossy())?;
    Ok(cache)
}

/// Persist the configured module proxy.
///
/// Independent of [`set_module_cache`]; a failure in one does not roll
/// back the other.
pub fn set_goproxy(root: &Path, proxy: &str) -> Result<()> {
    goenv::write_default(&go_bin(root), "GOPROXY", proxy)
}

fn go_bin(root: &Path) -> PathBuf {
    let name = if cfg!(windows) { "go.exe" } else { "go" };
    root.join("bin").join(name)
}
