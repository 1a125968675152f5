// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use depth_recorder::constants::synthetic::{DEFAULT_FPS, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depth-recorder")]
#[command(about = "Record depth and color sensor frames to PNG")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record frames from the synthetic sensor
    Record {
        /// Recording name (default from config, usually "Recording")
        #[arg(short, long)]
        label: Option<String>,

        /// Number of frame pairs to record (0 = until Ctrl+C)
        #[arg(short, long, default_value = "30")]
        frames: u64,

        /// Sensor frame rate
        #[arg(long, default_value_t = DEFAULT_FPS)]
        fps: u32,

        /// Frame width
        #[arg(long, default_value_t = DEFAULT_WIDTH)]
        width: u32,

        /// Frame height
        #[arg(long, default_value_t = DEFAULT_HEIGHT)]
        height: u32,

        /// Recordings root directory (default: ~/Videos/Recordings)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write frames on the event thread instead of the writer thread
        #[arg(long)]
        immediate: bool,

        /// Number color and depth frames independently
        #[arg(long)]
        per_stream: bool,

        /// Clear the tracking bits from depth samples
        #[arg(long)]
        clear_tracking_bits: bool,
    },

    /// List recordings
    List {
        /// Recordings root directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        save: bool,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set RUST_LOG to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depth_recorder=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record {
            label,
            frames,
            fps,
            width,
            height,
            output,
            immediate,
            per_stream,
            clear_tracking_bits,
        } => cli::record(cli::RecordArgs {
            label,
            frames,
            fps,
            width,
            height,
            output,
            immediate,
            per_stream,
            clear_tracking_bits,
        }),
        Commands::List { output } => cli::list(output),
        Commands::Config { save } => cli::show_config(save),
    }
}
