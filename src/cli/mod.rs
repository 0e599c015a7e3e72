//! Command-line interface.

mod args;
pub mod common;
pub mod config;
pub mod detect;
pub mod enhance;

pub use args::{Cli, Commands};
