//! uac - detect, style and enhance arbitrary HTML pages.

mod cli;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, common::load_options};
use uac::config::init_config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    uac::logger::set_verbose(cli.verbose);

    match &cli.command {
        Commands::Enhance { args } => {
            let options = init_config(load_options(&cli.config)?);
            if options.debug {
                uac::logger::set_verbose(true);
            }
            cli::enhance::run_enhance(args)
        }
        Commands::Detect { args } => cli::detect::run_detect(args),
        Commands::Config => cli::config::run_config(),
    }
}
