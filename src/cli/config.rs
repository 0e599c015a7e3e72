//! Config command implementation.

use anyhow::Result;
use uac::Options;

/// Print the default `uac.toml`.
pub fn run_config() -> Result<()> {
    print!("{}", Options::template()?);
    Ok(())
}
