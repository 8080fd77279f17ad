// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # Roscodec CLI
//!
//! Command-line tool for Rosco dashcam recordings (typically `.nvr` or
//! `.asd` files).
//!
//! ## Usage
//!
//! ```sh
//! # Show file information
//! roscodec info recording.nvr
//!
//! # Dump one chunk of one stream
//! roscodec debug recording.nvr 17 0
//!
//! # Export audio
//! roscodec export audio recording.nvr 1 out.wav --format wav
//!
//! # Export video
//! roscodec export video recording.nvr 1 out.avi
//!
//! # Batch-export every camera of every NVR file in a directory
//! roscodec export dvpro /media/dashcam/
//! ```

mod cmd;
mod common;

use std::process;

use clap::{Parser, Subcommand};
use cmd::{DebugCmd, ExportCmd, InfoCmd};
use common::Result;

/// Roscodec - Rosco dashcam recording toolkit
///
/// Parse NVR/ASD recordings and export their streams as AVI, WAV, or raw
/// PCM. The container format is auto-detected.
#[derive(Parser, Clone)]
#[command(name = "roscodec")]
#[command(about = "Rosco dashcam recording toolkit", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ArcheBase")]
struct Cli {
    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Clone)]
enum Commands {
    /// Show the information from the given file(s)
    Info(InfoCmd),

    /// Show debug information for one chunk of one stream
    Debug(DebugCmd),

    /// Export a stream from a file (audio, video, dvpro batch)
    #[command(subcommand)]
    Export(ExportCmd),
}

fn init_logging(debug: bool) {
    let default_filter = if debug { "roscodec=debug" } else { "roscodec=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match cli.command {
        Commands::Info(cmd) => cmd.run(),
        Commands::Debug(cmd) => cmd.run(),
        Commands::Export(cmd) => cmd.run(),
    }
}

fn main() {
    let result = run();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
