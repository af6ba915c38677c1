//! Release discovery and archive download.
//!
//! The index endpoint returns a JSON array of releases ordered
//! newest-first; only the first element is consulted.

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Release {
    pub version: String,
    #[serde(default)]
    pub stable: bool,
    pub files: Vec<ReleaseFile>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseFile {
    pub filename: String,
    #[serde(default)]
    pub os: String,
    #[serde(default)]
    pub arch: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub sha256: String,
    #[serde(default)]
    pub size: u64,
    pub kind: String,
}

pub fn http_client() -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT, HeaderValue::from_static("goup-installer"));
    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .build()?;
    Ok(client)
}

/// Fetch the release index and return its newest entry.
pub fn fetch_latest(client: &Client, index_url: &str) -> Result<Release> {
    let releases: Vec<Release> = client
        .get(index_url)
        .send()
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("failed to fetch release index: {index_url}"))?
        .json()
        .context("failed to decode release index")?;
    releases.into_iter().next().context("release index is empty")
}

/// Pick the installable archive for the given platform.
///
/// Only `kind == "archive"` entries are eligible; installer and source
/// artifacts are skipped.
pub fn pick_archive<'a>(release: &'a Release, os: &str, arch: &str) -> Result<&'a ReleaseFile> {
    release
        .files
        .iter()
        .find(|f| f.os == os && f.arch == arch && f.kind == "archive")
        .with_context(|| format!("no archive for {os}/{arch} in {}", release.version))
}

/// Map the host triple onto the release index's os/arch naming.
pub fn host_target() -> Result<(&'static str, &'static str)> {
    let os = match std::env::consts::OS {
        "linux" => "linux",
        "macos" => "darwin",
        "windows" => "windows",
        other => bail!("unsupported OS: {}", other),
    };
    let arch = match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" | "arm64" => "arm64",
        other => bail!("unsupported ARCH: {}", other),
    };
    Ok((os, arch))
}

/// Stream `url` into `dest`. The caller removes the file once the
/// install has succeeded.
pub fn download(client: &Client, url: &str, dest: &Path) -> Result<()> {
    let mut resp = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("failed to download: {url}"))?;
    let mut out = fs::File::create(dest)
        .with_context(|| format!("failed to create {}", dest.display()))?;
    std::io::copy(&mut resp, &mut out)
        .with_context(|| format!("failed to write {}", dest.display()))?;
    Ok(())
}
