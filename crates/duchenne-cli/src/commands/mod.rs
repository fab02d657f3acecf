//! CLI command definitions and handlers.

pub mod policy;
pub mod score;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use duchenne_core::CompositionMode;

use crate::config::Overrides;

/// Duchenne - smile authenticity scoring from facial landmarks
#[derive(Parser)]
#[command(name = "duchenne")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score detector JSON files
    Score(score::ScoreArgs),
    /// Validate and print the effective configuration as TOML
    Policy(policy::PolicyArgs),
}

/// Composition mode as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Weighted landmark metrics only
    Geometry,
    /// Landmark metrics blended with the "happy" expression probability
    Blend,
}

impl From<ModeArg> for CompositionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Geometry => CompositionMode::Geometry,
            ModeArg::Blend => CompositionMode::Blend,
        }
    }
}

/// Arguments shared by every command that builds a scoring configuration.
#[derive(Args, Clone)]
pub struct ConfigArgs {
    /// TOML configuration file (default: $DUCHENNE_CONFIG, then
    /// $XDG_CONFIG_HOME/duchenne/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Composition mode; selects the built-in preset the file overlays
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,
}

impl ConfigArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            mode: self.mode.map(Into::into),
        }
    }
}
