//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Detect, style and enhance arbitrary HTML pages
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: uac.toml)
    #[arg(short = 'C', long, global = true, default_value = "uac.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Enhance HTML files
    #[command(visible_alias = "e")]
    Enhance {
        #[command(flatten)]
        args: EnhanceArgs,
    },

    /// Print the feature snapshot of a page
    #[command(visible_alias = "d")]
    Detect {
        #[command(flatten)]
        args: DetectArgs,
    },

    /// Print the default configuration
    #[command(visible_alias = "c")]
    Config,
}

/// Enhance command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct EnhanceArgs {
    /// Files or directories to enhance. Use `-` to read paths from stdin.
    #[arg(value_name = "PATH", required = true, value_hint = clap::ValueHint::AnyPath)]
    pub paths: Vec<PathBuf>,

    /// Write enhanced files under this directory instead of stdout
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Viewport width in CSS pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Viewport height in CSS pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,

    /// Pretend the system prefers a dark colour scheme
    #[arg(long)]
    pub prefers_dark: bool,

    /// Pretend the system prefers reduced motion
    #[arg(long)]
    pub reduced_motion: bool,

    /// Local hour (0-23) used by `darkMode = "auto"`; defaults to now
    #[arg(long, value_parser = clap::value_parser!(u32).range(0..24))]
    pub hour: Option<u32>,

    /// State file holding the persisted dark-mode decision
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub state: Option<PathBuf>,

    /// Enhance pages that opt out with `data-uac-manual`
    #[arg(short, long)]
    pub force: bool,
}

/// Detect command arguments.
#[derive(clap::Args, Debug, Clone)]
pub struct DetectArgs {
    /// HTML file to inspect
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    pub path: PathBuf,

    /// Print the snapshot as JSON
    #[arg(short, long)]
    pub json: bool,
}
