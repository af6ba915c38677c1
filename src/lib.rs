//! Crate entry point for **goup**.
//!
//! This library provides the internal implementation for the `goup` CLI,
//! a self-updating installer for the Go toolchain. Each submodule
//! encapsulates one responsibility:
//!
//! - [`release`]: release index discovery and archive download
//! - [`goenv`]: `go env` introspection of the installed toolchain
//! - [`version`]: remote/local version comparison
//! - [`install`]: install-root lifecycle and archive extraction
//! - [`reconcile`]: shell profile / persistent variable reconciliation
//! - [`config`]: startup configuration (`config.toml`)
//!
//! The `pub use` re-exports make the CLI commands accessible directly
//! from the crate root.

pub mod config;
pub mod goenv;
pub mod install;
mod paths;
mod progress;
pub mod reconcile;
pub mod release;
pub mod version;

pub use config::Config;
pub use install::{cmd_check, cmd_update};
pub use paths::goup_home;
