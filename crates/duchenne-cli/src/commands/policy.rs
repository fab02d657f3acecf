//! Policy command - print the effective configuration.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use super::ConfigArgs;
use crate::config::Settings;

#[derive(Args, Clone)]
pub struct PolicyArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub fn run(args: &PolicyArgs) -> Result<()> {
    let settings = Settings::load(&args.config.overrides())?;
    let text = settings.to_toml()?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
