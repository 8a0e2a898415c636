use std::path::PathBuf;

use clap::Parser;
use famicore_core::controller::Button;
use tracing::Level;

/// Headless runner: loads a ROM, runs it and optionally dumps the last frame
#[derive(Parser, Debug)]
#[command(name = "famicore", author, version, about, long_about = None)]
pub struct Args {
    /// Path to the iNES ROM file
    #[arg(required = true)]
    pub rom: PathBuf,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 60)]
    pub frames: u32,

    /// Write the final frame to this PNG file
    #[arg(long, value_name = "PATH")]
    pub png: Option<PathBuf>,

    /// Button held on controller 1 for the whole run (repeatable: a, b,
    /// select, start, up, down, left, right)
    #[arg(long, value_name = "BUTTON")]
    pub hold: Vec<Button>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: Level,
}
