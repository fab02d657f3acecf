//! Layered scoring configuration.
//!
//! Priority, lowest to highest:
//! 1. Built-in preset for the selected composition mode
//! 2. TOML file: `--config`, else `DUCHENNE_CONFIG`, else
//!    `$XDG_CONFIG_HOME/duchenne/config.toml` when it exists
//! 3. `DUCHENNE_MODE` and `DUCHENNE_CACHE_CAPACITY`
//! 4. CLI flags
//!
//! The resolved [`Settings`] are validated once; any failure is fatal.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use duchenne_core::{
    BlendWeights, CompositionMode, FormulaSet, GenuinenessRule, Metric, VerdictTier, WeightPolicy,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const ENV_CONFIG: &str = "DUCHENNE_CONFIG";
pub const ENV_MODE: &str = "DUCHENNE_MODE";
pub const ENV_CACHE_CAPACITY: &str = "DUCHENNE_CACHE_CAPACITY";

/// Results kept in memory per run. 0 disables caching.
pub const DEFAULT_CACHE_CAPACITY: usize = 256;

/// Contents of a configuration file. Every field is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub policy: PolicySection,
    pub formulas: FormulaSet,
    pub cache: CacheSection,
}

/// Overlay on the preset policy; present fields replace the preset's.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicySection {
    pub mode: Option<CompositionMode>,
    pub weights: Option<BTreeMap<Metric, f64>>,
    pub blend: Option<BlendWeights>,
    pub verdicts: Option<Vec<VerdictTier>>,
    pub genuine: Option<GenuinenessRule>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSection {
    pub capacity: Option<usize>,
}

/// Values taken from the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub mode: Option<CompositionMode>,
}

/// Fully resolved configuration. Serializes back to the file format.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    pub policy: WeightPolicy,
    pub formulas: FormulaSet,
    pub cache: EffectiveCache,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EffectiveCache {
    pub capacity: usize,
}

impl AppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config file {}", path.display()))
    }
}

impl Settings {
    /// Resolve against the process environment.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        Self::load_with(overrides, |key| std::env::var(key).ok())
    }

    pub fn load_with(overrides: &Overrides, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file = match overrides
            .config
            .clone()
            .or_else(|| env(ENV_CONFIG).map(PathBuf::from))
        {
            Some(path) => {
                info!(path = %path.display(), "loading config");
                AppConfig::from_file(&path)?
            }
            None => match xdg_config_path(&env) {
                Some(path) if path.exists() => {
                    info!(path = %path.display(), "loading XDG config");
                    AppConfig::from_file(&path)?
                }
                Some(path) => {
                    debug!(path = %path.display(), "no XDG config");
                    AppConfig::default()
                }
                None => AppConfig::default(),
            },
        };

        let env_mode = env(ENV_MODE).map(|v| parse_mode(&v)).transpose()?;
        let env_capacity = env(ENV_CACHE_CAPACITY)
            .map(|v| {
                v.trim()
                    .parse::<usize>()
                    .with_context(|| format!("{ENV_CACHE_CAPACITY}={v:?} is not a count"))
            })
            .transpose()?;

        let settings = Self::resolve(file, overrides.mode.or(env_mode), env_capacity);
        settings.validate()?;
        Ok(settings)
    }

    /// Layer `file` over the preset for the winning mode.
    pub fn resolve(
        file: AppConfig,
        mode_override: Option<CompositionMode>,
        capacity_override: Option<usize>,
    ) -> Self {
        let section = file.policy;
        let mode = mode_override.or(section.mode).unwrap_or_default();

        let mut policy = WeightPolicy::preset(mode);
        if let Some(weights) = section.weights {
            policy.weights = weights;
        }
        if let Some(blend) = section.blend {
            policy.blend = blend;
        }
        if let Some(verdicts) = section.verdicts {
            policy.verdicts = verdicts;
        }
        if let Some(genuine) = section.genuine {
            policy.genuine = genuine;
        }

        let capacity = capacity_override
            .or(file.cache.capacity)
            .unwrap_or(DEFAULT_CACHE_CAPACITY);

        Self {
            policy,
            formulas: file.formulas,
            cache: EffectiveCache { capacity },
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.policy.validate().context("invalid [policy]")?;
        self.formulas.validate().context("invalid [formulas]")?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing configuration")
    }
}

fn parse_mode(value: &str) -> Result<CompositionMode> {
    match value.trim().to_ascii_lowercase().as_str() {
        "geometry" => Ok(CompositionMode::Geometry),
        "blend" => Ok(CompositionMode::Blend),
        other => bail!("{ENV_MODE}={other:?}: expected \"geometry\" or \"blend\""),
    }
}

fn xdg_config_path(env: &impl Fn(&str) -> Option<String>) -> Option<PathBuf> {
    let base = env("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| env("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(base.join("duchenne").join("config.toml"))
}
