use clap::Parser;
use std::path::PathBuf;

// Build version with toolkit info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "GUI:    egui/eframe 0.33\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Caption cue retiming tool
#[derive(Parser, Debug)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// WebVTT file to open - optional, can also use File > Open
    #[arg(value_name = "FILE")]
    pub file_path: Option<PathBuf>,

    /// Initial timeline zoom in pixels per second
    #[arg(short = 'z', long = "zoom", value_name = "PX_PER_SEC")]
    pub zoom: Option<f32>,

    /// Initial playhead position in seconds
    #[arg(long = "seek", value_name = "SECS")]
    pub seek: Option<f64>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,
}
