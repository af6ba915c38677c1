//! # goup
//!
//! **goup** is a self-updating installer for the Go toolchain.
//!
//! Features:
//! - `goup update` discovers the latest release, downloads the matching
//!   archive and replaces the local installation
//! - `goup check` reports whether a newer release is available
//! - `goup home` prints the goup configuration directory
//! - GOROOT/PATH reconciliation in the shell profile (or the Windows
//!   persistent variable store), without duplicating existing entries
//!
//! This CLI is built with [clap](https://docs.rs/clap).

use anyhow::Result;
use clap::{Parser, Subcommand};
use goup::{Config, cmd_check, cmd_update, goup_home};

/// Command-line interface definition.
///
/// Parsed using `clap` derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "goup",
    version,
    about = "goup - self-updating Go toolchain installer",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    cmd: Option<Cmd>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Cmd {
    /// Install or update the Go toolchain to the latest release
    Update,
    /// Check whether a newer release is available
    Check,
    /// Print the goup configuration directory
    Home,
}

/// CLI entry point.
///
/// Loads the startup configuration once and hands it to the selected
/// subcommand; any error surfaces here as an abnormal exit with a
/// diagnostic message.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let cmd = cli.cmd.unwrap();

    let cfg = Config::load()?;
    match cmd {
        Cmd::Update => cmd_update(&cfg),
        Cmd::Check => cmd_check(&cfg),
        Cmd::Home => {
            println!("{}", goup_home()?.display());
            Ok(())
        }
    }
}
