// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! - Scanning in a window (default) or in the terminal
//! - Listing available cameras

use crate::ScanArgs;
use qr_scanner::backends::camera::{CameraConfig, list_devices};
use qr_scanner::constants::WINDOW_TITLE;
use qr_scanner::{DisplaySink, Scanner, SystemBrowser, TerminalSink, UrlDispatcher, WindowSink};
use std::io::Write;
use std::sync::atomic::Ordering;
use tracing::info;

/// Where annotated frames are shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Window,
    Terminal,
}

/// Run the scanner until quit, interrupt or capture failure
pub fn scan(args: &ScanArgs, mode: DisplayMode) -> Result<(), Box<dyn std::error::Error>> {
    let config = CameraConfig {
        device: args.device.clone(),
        width: args.width,
        height: args.height,
    };

    let scanner = Scanner::open(&config, || {
        let display: Box<dyn DisplaySink> = match mode {
            DisplayMode::Window => Box::new(WindowSink::create(
                WINDOW_TITLE,
                config.width as usize,
                config.height as usize,
            )?),
            DisplayMode::Terminal => Box::new(TerminalSink::create()?),
        };
        Ok(display)
    })?;

    // The terminal sink owns stdout; console lines go to its status bar
    let console: Box<dyn Write> = match mode {
        DisplayMode::Window => Box::new(std::io::stdout()),
        DisplayMode::Terminal => Box::new(std::io::sink()),
    };

    let dispatcher = if args.no_open {
        UrlDispatcher::disabled()
    } else {
        UrlDispatcher::new(Box::new(SystemBrowser))
    };

    let scanner = scanner.with_console(console).with_dispatcher(dispatcher);

    // Set up Ctrl+C handler
    let interrupt = scanner.interrupt_handle();
    ctrlc::set_handler(move || {
        interrupt.store(true, Ordering::SeqCst);
    })?;

    let reason = scanner.run();
    info!(?reason, "Scanner finished");

    Ok(())
}

/// List all available cameras
pub fn list_cameras() -> Result<(), Box<dyn std::error::Error>> {
    let cameras = list_devices()?;

    if cameras.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras:");
    println!();
    for (index, camera) in cameras.iter().enumerate() {
        println!("  [{}] {}", index, camera.name);
        if let Some(path) = &camera.path {
            println!("      Device: {}", path);
        }
    }

    Ok(())
}
