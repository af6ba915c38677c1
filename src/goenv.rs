//! Local toolchain introspection via `go env`.
//!
//! The snapshot is read once per run and never mutated; writes go through
//! [`write_default`], which shells out to `go env -w`.

use anyhow::{Context, Result, bail};
use std::collections::HashMap;
use std::path::Path;
use std::process::Command;

/// Environment keys recognized in `go env` output. Anything else is
/// silently dropped during parsing.
const KNOWN_KEYS: &[&str] = &[
    "GO111MODULE",
    "GOARCH",
    "GOBIN",
    "GOCACHE",
    "GOENV",
    "GOEXE",
    "GOEXPERIMENT",
    "GOFLAGS",
    "GOHOSTARCH",
    "GOHOSTOS",
    "GOINSECURE",
    "GOMODCACHE",
    "GONOPROXY",
    "GONOSUMDB",
    "GOOS",
    "GOPATH",
    "GOPRIVATE",
    "GOPROXY",
    "GOROOT",
    "GOSUMDB",
    "GOTMPDIR",
    "GOTOOLCHAIN",
    "GOTOOLDIR",
    "GOVCS",
    "GOVERSION",
    "GODEBUG",
    "GOTELEMETRY",
    "GOTELEMETRYDIR",
    "GCCGO",
    "GOAMD64",
    "AR",
    "CC",
    "CXX",
    "CGO_ENABLED",
    "GOMOD",
    "GOWORK",
    "CGO_CFLAGS",
    "CGO_CPPFLAGS",
    "CGO_CXXFLAGS",
    "CGO_FFLAGS",
    "CGO_LDFLAGS",
    "PKG_CONFIG",
    "GOGCCFLAGS",
];

/// Read-only snapshot of the locally installed toolchain's environment.
///
/// Partial by design: keys the local `go env` did not report are simply
/// absent from the map.
#[derive(Debug, Default)]
pub struct GoEnv {
    vars: HashMap<String, String>,
}

impl GoEnv {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn goversion(&self) -> Option<&str> {
        self.get("GOVERSION")
    }

    pub fn goroot(&self) -> Option<&str> {
        self.get("GOROOT")
    }
}

/// Run `go env` and parse its output.
///
/// Returns `None` when the command cannot be run or exits non-zero;
/// the toolchain is treated as not installed.
pub fn probe() -> Option<GoEnv> {
    let output = Command::new("go").arg("env").output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(parse(&String::from_utf8_lossy(&output.stdout)))
}

/// Parse line-oriented `KEY=VALUE` output.
///
/// - A `set ` prefix (Windows form) is stripped.
/// - Lines without `=` are ignored.
/// - Keys outside the known set are ignored.
/// - Surrounding single or double quotes on the value are stripped.
pub fn parse(output: &str) -> GoEnv {
    let mut vars = HashMap::new();
    for line in output.lines() {
        let line = line.trim();
        let line = line.strip_prefix("set ").unwrap_or(line);
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if !KNOWN_KEYS.contains(&key) {
            continue;
        }
        let value = unquote(value.trim());
        vars.insert(key.to_string(), value.to_string());
    }
    GoEnv { vars }
}

fn unquote(v: &str) -> &str {
    let v = v.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')).unwrap_or(v);
    v.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(v)
}

/// Persist one toolchain-internal setting via `go env -w KEY=VALUE`,
/// invoking the given `go` binary directly (the fresh install may not be
/// on PATH in this session yet).
pub fn write_default(go_bin: &Path, key: &str, value: &str) -> Result<()> {
    let status = Command::new(go_bin)
        .args(["env", "-w", &format!("{key}={value}")])
        .status()
        .with_context(|| format!("failed to run {} env -w", go_bin.display()))?;
    if !status.success() {
        bail!("go env -w {}={} exited with {}", key, value, status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_key_value_lines() {
        let env = parse("GOVERSION=go1.22.0\nGOROOT=/usr/local/go\n");
        assert_eq!(env.goversion(), Some("go1.22.0"));
        assert_eq!(env.goroot(), Some("/usr/local/go"));
    }

    #[test]
    fn strips_windows_set_prefix() {
        let env = parse("set GOROOT=C:\\Go\r\nset GOVERSION=go1.22.0\r\n");
        assert_eq!(env.goroot(), Some("C:\\Go"));
        assert_eq!(env.goversion(), Some("go1.22.0"));
    }

    #[test]
    fn strips_quoted_values() {
        let env = parse("GOPROXY='https://proxy.golang.org,direct'\nGOFLAGS=\"\"\n");
        assert_eq!(env.get("GOPROXY"), Some("https://proxy.golang.org,direct"));
        assert_eq!(env.get("GOFLAGS"), Some(""));
    }

    #[test]
    fn ignores_malformed_and_unknown_lines() {
        let env = parse("not a key value line\nWHATEVER=1\nGOOS=linux\n");
        assert_eq!(env.get("WHATEVER"), None);
        assert_eq!(env.get("GOOS"), Some("linux"));
    }

    #[test]
    fn absent_keys_are_none() {
        let env = parse("GOOS=linux\n");
        assert_eq!(env.goversion(), None);
        assert_eq!(env.goroot(), None);
    }
}
