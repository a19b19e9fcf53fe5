//! `nhrl-stats` command-line entrypoint.
//!
//! Loads one statistics sheet, applies the configured filter, and prints a JSON
//! report (load info, overview, ranking, win-rate histogram, leaderboards).
//!
//! ```text
//! nhrl-stats [SOURCE] [--export PATH]
//! ```
//!
//! `SOURCE` is a file path or http(s) URL; it defaults to `$NHRL_SOURCE`, then
//! `data/sample.csv`.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nhrl_stats::config;
use nhrl_stats::filter::{overview, weapon_type_options, Overview, WeaponTypeOption};
use nhrl_stats::ingest::providers::provider_for;
use nhrl_stats::ingest::{IngestCoordinator, IngestOutcome};
use nhrl_stats::insights::leaderboards::{build_report, InsightReport};
use nhrl_stats::insights::{confidence, winrate_buckets5, WinrateBucket};
use nhrl_stats::scoring::rank;
use nhrl_stats::{BotRecord, LoadInfo, WeaponCategory};

const ENV_SOURCE: &str = "NHRL_SOURCE";
const DEFAULT_SOURCE: &str = "data/sample.csv";

/// Compact logs to stderr; JSON lines when `NHRL_LOG_JSON=1`.
fn init_tracing() {
    let json = std::env::var("NHRL_LOG_JSON")
        .ok()
        .is_some_and(|v| v == "1");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nhrl_stats=info,warn"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init();
    }
}

#[derive(Debug, Default)]
struct Args {
    source: Option<String>,
    export: Option<PathBuf>,
}

fn parse_args(mut it: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    while let Some(a) = it.next() {
        if a == "--export" {
            let p = it.next().context("--export needs a path")?;
            args.export = Some(PathBuf::from(p));
        } else if a.starts_with("--") {
            bail!("unknown flag {a}");
        } else if args.source.is_none() {
            args.source = Some(a);
        } else {
            bail!("unexpected argument {a}");
        }
    }
    Ok(args)
}

#[derive(Serialize)]
struct RankedRow<'a> {
    rank: usize,
    name: &'a str,
    score: f64,
    win_rate: f64,
    ko_rate: f64,
    fights: u32,
    confidence: f64,
    category: WeaponCategory,
}

#[derive(Serialize)]
struct Report<'a> {
    load: &'a LoadInfo,
    weapon_types: Vec<WeaponTypeOption>,
    overview: Overview,
    ranking: Vec<RankedRow<'a>>,
    winrate_buckets: Vec<WinrateBucket>,
    insights: InsightReport<'a>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; missing file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args = parse_args(std::env::args().skip(1))?;
    let cfg = config::load_default()?;
    let source = args
        .source
        .or_else(|| std::env::var(ENV_SOURCE).ok())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    let coordinator = IngestCoordinator::new(cfg.delimiter()?);
    let provider = provider_for(&source);
    let snapshot = match coordinator.ingest(provider.as_ref()).await? {
        IngestOutcome::Published(s) => s,
        IngestOutcome::Superseded => bail!("ingest of {source} was superseded"),
    };

    let score_cfg = cfg.score_config();
    let population: Vec<&BotRecord> = cfg.filter().apply(&snapshot.bots);
    tracing::info!(
        total = snapshot.bots.len(),
        selected = population.len(),
        control_ko_included = score_cfg.control_ko_included,
        "population selected"
    );

    let ranking = rank(population.iter().copied(), score_cfg)
        .into_iter()
        .map(|r| RankedRow {
            rank: r.rank,
            name: &r.record.name,
            score: r.score,
            win_rate: r.record.win_rate_normalized,
            ko_rate: r.record.ko_win_rate_normalized,
            fights: r.record.fights,
            confidence: confidence(r.record.fights),
            category: r.record.weapon_category,
        })
        .collect();

    let report = Report {
        load: &snapshot.info,
        weapon_types: weapon_type_options(&snapshot.bots),
        overview: overview(&population),
        ranking,
        winrate_buckets: winrate_buckets5(population.iter().copied()),
        insights: build_report(&population, score_cfg, cfg.insight_params()),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    if let Some(path) = args.export {
        let csv = snapshot.export_filtered(population.iter().copied())?;
        tokio::fs::write(&path, csv)
            .await
            .with_context(|| format!("writing export to {}", path.display()))?;
        tracing::info!(path = %path.display(), rows = population.len(), "filtered rows exported");
    }
    Ok(())
}
