//! Score command - assess every face in detector JSON files.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use duchenne_core::{DetectionBatch, Engine, ScoringService};
use tracing::{debug, info};

use super::ConfigArgs;
use crate::cache::MemoryCache;
use crate::config::Settings;
use crate::output::{write_json, FileReport};
use crate::telemetry::DailyCounters;

#[derive(Args, Clone)]
pub struct ScoreArgs {
    /// Detector output files: `{"image": {...}, "faces": [...]}`
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Pretty-print each report
    #[arg(long)]
    pub pretty: bool,

    /// Print today's usage counters to stderr when done
    #[arg(long)]
    pub stats: bool,
}

pub fn run(args: &ScoreArgs) -> Result<()> {
    let settings = Settings::load(&args.config.overrides())?;
    let capacity = settings.cache.capacity;
    let engine =
        Engine::new(settings.policy, settings.formulas).context("building scoring engine")?;

    let counters = Arc::new(DailyCounters::new());
    let mut service = ScoringService::new(engine).with_telemetry(counters.clone());
    let cache = (capacity > 0).then(|| Arc::new(MemoryCache::new(capacity)));
    if let Some(cache) = &cache {
        service = service.with_cache(cache.clone());
    }
    info!(files = args.files.len(), cache_capacity = capacity, "scoring");

    let mut stdout = std::io::stdout().lock();
    for path in &args.files {
        let content =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let batch: DetectionBatch = serde_json::from_slice(&content)
            .with_context(|| format!("parsing detector output {}", path.display()))?;

        let outcome = service.score(&content, &batch);
        debug!(
            file = %path.display(),
            scored = outcome.faces.len(),
            rejected = outcome.rejected.len(),
            "file scored"
        );

        let report = FileReport {
            file: path.display().to_string(),
            faces: &outcome.faces,
            rejected: &outcome.rejected,
        };
        write_json(&mut stdout, &report, args.pretty)?;
    }
    stdout.flush()?;

    if let Some(cache) = &cache {
        debug!(entries = cache.len(), "result cache");
    }
    if args.stats {
        write_json(&mut std::io::stderr().lock(), &counters.snapshot(), false)?;
    }
    Ok(())
}
