//! Install pipeline.
//!
//! High-level flow of `goup update`:
//! 1. Fetch the newest release from the index and probe the local
//!    toolchain with `go env`.
//! 2. Gate: proceed only when the remote version is strictly newer, or
//!    the toolchain is absent.
//! 3. Resolve the install root (existing GOROOT, or an interactive
//!    prompt with a platform-validated path) and confirm it first, since the reset
//!    below is destructive and irreversible.
//! 4. Download the matching archive into the working directory.
//! 5. Reset the install root to a clean slate, extract the archive into
//!    it, then reconcile the environment (GOROOT, PATH, GOMODCACHE,
//!    GOPROXY) and remove the downloaded archive.
//!
//! Strictly sequential; nothing retries. An interruption mid-reset or
//! mid-extraction leaves the root partially populated; recovery is to
//! re-run the whole pipeline.

pub mod archive;

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::paths::default_install_root;
use crate::progress::{err_style, finish_ok, step};
use crate::reconcile::{self, Platform};
use crate::{goenv, release, version};

pub use archive::extract_archive;

/// Guarantee a clean install root: remove it and everything under it
/// (including files a prior toolchain wrote into it after install), then
/// recreate it empty.
///
/// Idempotent. Any filesystem error is fatal; extraction must not run
/// into a half-cleared directory.
pub fn reset_install_root(root: &Path) -> Result<()> {
    match fs::symlink_metadata(root) {
        Ok(md) if md.is_dir() => {
            fs::remove_dir_all(root)
                .with_context(|| format!("failed to clear {}", root.display()))?;
        }
        Ok(_) => {
            fs::remove_file(root)
                .with_context(|| format!("failed to remove {}", root.display()))?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("failed to stat {}", root.display()));
        }
    }
    fs::create_dir_all(root).with_context(|| format!("failed to create {}", root.display()))
}

/// CLI command: check whether a newer release is available.
pub fn cmd_check(cfg: &Config) -> Result<()> {
    let client = release::http_client()?;
    let pb = step("resolving latest release…");
    let rel = release::fetch_latest(&client, &cfg.index_url)?;
    finish_ok(&pb, format!("latest release: {}", rel.version));

    let local = goenv::probe();
    match local.as_ref().and_then(|e| e.goversion()) {
        None => println!("no local toolchain detected; {} can be installed", rel.version),
        Some(v) if version::should_install(&rel.version, Some(v)) => {
            println!("update available: {} (local {})", rel.version, v);
        }
        Some(v) => println!("local toolchain {} is up to date", v),
    }
    Ok(())
}

/// CLI command: run the full update pipeline.
pub fn cmd_update(cfg: &Config) -> Result<()> {
    let platform = reconcile::platform(cfg)?;
    let client = release::http_client()?;

    let pb = step("resolving latest release…");
    let rel = release::fetch_latest(&client, &cfg.index_url)?;
    let local = goenv::probe();
    let local_version = local.as_ref().and_then(|e| e.goversion());

    if !version::should_install(&rel.version, local_version) {
        finish_ok(
            &pb,
            format!("already up to date ({})", local_version.unwrap_or(&rel.version)),
        );
        return Ok(());
    }
    match local_version {
        Some(v) => finish_ok(&pb, format!("update available: {} (local {})", rel.version, v)),
        None => finish_ok(&pb, format!("no local toolchain; installing {}", rel.version)),
    }

    let (os, arch) = release::host_target()?;
    let file = release::pick_archive(&rel, os, arch)?;

    let root = match local.as_ref().and_then(|e| e.goroot()) {
        Some(r) => PathBuf::from(r),
        None => prompt_install_root(platform.as_ref(), &mut io::stdin().lock())?,
    };
    if !confirm_install(&root, &mut io::stdin().lock())? {
        println!("aborted");
        return Ok(());
    }

    let pb = step(format!("downloading {}", file.filename));
    let url = format!("{}{}", cfg.download_base, file.filename);
    let archive_path = std::env::current_dir()?.join(&file.filename);
    release::download(&client, &url, &archive_path)?;
    finish_ok(&pb, format!("downloaded {}", file.filename));

    let pb = step(format!("installing into {}", root.display()));
    let installed: Result<()> = (|| {
        reset_install_root(&root)?;
        extract_archive(&archive_path, &root)?;
        Ok(())
    })();
    if let Err(e) = installed {
        pb.set_style(err_style());
        pb.finish_with_message(format!(
            "install failed, {} must be considered corrupt",
            root.display()
        ));
        return Err(e);
    }
    finish_ok(&pb, format!("installed {} into {}", rel.version, root.display()));

    let pb = step("reconciling environment…");
    platform.set_install_root(&root)?;
    platform.add_bin_to_path(&root)?;
    // the two toolchain-internal edits are independent; report each and
    // keep going so one failure does not undo or block the other
    let cache = match reconcile::set_module_cache(&root) {
        Ok(cache) => Some(cache),
        Err(e) => {
            eprintln!("warning: could not set GOMODCACHE: {e:#}");
            None
        }
    };
    if let Err(e) = reconcile::set_goproxy(&root, &cfg.goproxy) {
        eprintln!("warning: could not set GOPROXY: {e:#}");
    }
    finish_ok(&pb, "environment reconciled");

    if let Err(e) = fs::remove_file(&archive_path) {
        eprintln!("warning: could not remove {}: {}", archive_path.display(), e);
    }

    print_summary(&rel.version, &root, cache.as_deref());
    wait_for_ack()?;
    Ok(())
}

/// Ask for an install directory when no GOROOT is known.
///
/// An empty answer falls back to `<home>/go`; anything else must pass
/// the platform's syntax validation (reported as-is, never corrected).
fn prompt_install_root(platform: &dyn Platform, input: &mut dyn BufRead) -> Result<PathBuf> {
    print!("install directory [default: {}]: ", default_install_root()?.display());
    io::stdout().flush()?;
    let answer = read_line(input)?;
    if answer.is_empty() {
        return default_install_root();
    }
    platform.validate_install_path(&answer)?;
    Ok(PathBuf::from(answer))
}

/// Confirm the destructive reset of the install root. Defaults to yes.
fn confirm_install(root: &Path, input: &mut dyn BufRead) -> Result<bool> {
    print!(
        "install into {} (existing contents will be removed) [Y/n]: ",
        root.display()
    );
    io::stdout().flush()?;
    let answer = read_line(input)?.to_lowercase();
    Ok(matches!(answer.as_str(), "" | "y" | "yes"))
}

fn read_line(input: &mut dyn BufRead) -> Result<String> {
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read stdin")?;
    Ok(line.trim().to_string())
}

fn print_summary(version: &str, root: &Path, cache: Option<&Path>) {
    println!();
    println!("{}", "go toolchain installed".green().bold());
    println!("-------------------------");
    println!("version:    {}", version);
    println!("GOROOT:     {}", root.display());
    if let Some(cache) = cache {
        println!("GOMODCACHE: {}", cache.display());
    }
    println!("open a new shell, then run `go env` to inspect the result");
    println!("-------------------------");
}

fn wait_for_ack() -> Result<()> {
    print!("press enter to exit… ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
