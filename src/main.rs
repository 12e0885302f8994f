// SPDX-License-Identifier: GPL-3.0-only

use clap::{Args, Parser, Subcommand};
use qr_scanner::constants::capture;

mod cli;

#[derive(Parser)]
#[command(name = "qr-scanner")]
#[command(about = "Scan QR codes from a live camera feed")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(flatten)]
    scan: ScanArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run in terminal mode (renders the camera feed to the terminal)
    Terminal,

    /// List available cameras
    List,
}

/// Options shared by the window and terminal scanners
#[derive(Args)]
pub struct ScanArgs {
    /// Camera device path (default: first V4L2 device)
    #[arg(short, long, global = true)]
    device: Option<String>,

    /// Capture width in pixels
    #[arg(long, default_value_t = capture::DEFAULT_WIDTH, global = true)]
    width: u32,

    /// Capture height in pixels
    #[arg(long, default_value_t = capture::DEFAULT_HEIGHT, global = true)]
    height: u32,

    /// Print decoded URLs without opening them
    #[arg(long, global = true)]
    no_open: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=qr_scanner=debug, RUST_LOG=info
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
        Some(Commands::List) => cli::list_cameras(),
        Some(Commands::Terminal) => cli::scan(&cli.scan, cli::DisplayMode::Terminal),
        None => cli::scan(&cli.scan, cli::DisplayMode::Window),
    }
}
