// src/config/mod.rs
//! Pipeline configuration (TOML or JSON).
//!
//! Lookup order for [`load_default`]:
//! 1) `$NHRL_CONFIG_PATH` (must exist)
//! 2) `config/pipeline.toml`
//! 3) `config/pipeline.json`
//! 4) built-in defaults
//!
//! Values are copied out into small value types ([`ScoreConfig`], [`Filter`],
//! [`InsightParams`]) that are passed by value into the pure pipeline stages.

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::filter::Filter;
use crate::insights::leaderboards::{InsightContext, InsightParams};
use crate::scoring::{ScoreConfig, DEFAULT_KO_WEIGHT, DEFAULT_WR_WEIGHT};

pub const ENV_CONFIG_PATH: &str = "NHRL_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/pipeline.toml";
pub const DEFAULT_JSON_PATH: &str = "config/pipeline.json";

fn default_wr_weight() -> f64 {
    DEFAULT_WR_WEIGHT
}
fn default_ko_weight() -> f64 {
    DEFAULT_KO_WEIGHT
}
fn default_board_min_fights() -> u32 {
    8
}
fn default_top_n() -> usize {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSection {
    #[serde(default = "default_wr_weight")]
    pub wr_weight: f64,
    #[serde(default = "default_ko_weight")]
    pub ko_weight: f64,
    #[serde(default)]
    pub control_ko_included: bool,
}

impl Default for ScoringSection {
    fn default() -> Self {
        Self {
            wr_weight: DEFAULT_WR_WEIGHT,
            ko_weight: DEFAULT_KO_WEIGHT,
            control_ko_included: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsSection {
    #[serde(default)]
    pub context: InsightContext,
    #[serde(default = "default_board_min_fights")]
    pub min_fights: u32,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for InsightsSection {
    fn default() -> Self {
        Self {
            context: InsightContext::default(),
            min_fights: default_board_min_fights(),
            top_n: default_top_n(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngestSection {
    /// Single character; auto-detected from the header line when absent.
    #[serde(default)]
    pub delimiter: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub scoring: ScoringSection,
    #[serde(default)]
    pub insights: InsightsSection,
    #[serde(default)]
    pub filter: Filter,
    #[serde(default)]
    pub ingest: IngestSection,
}

impl PipelineConfig {
    pub fn score_config(&self) -> ScoreConfig {
        ScoreConfig {
            control_ko_included: self.scoring.control_ko_included,
            wr_weight: self.scoring.wr_weight,
            ko_weight: self.scoring.ko_weight,
        }
    }

    pub fn insight_params(&self) -> InsightParams {
        InsightParams {
            context: self.insights.context,
            min_fights: self.insights.min_fights,
            top_n: self.insights.top_n,
        }
    }

    pub fn filter(&self) -> Filter {
        self.filter.clone()
    }

    /// Configured delimiter as a byte.
    pub fn delimiter(&self) -> Result<Option<u8>> {
        let Some(d) = self.ingest.delimiter.as_deref() else {
            return Ok(None);
        };
        let mut chars = d.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii() => Ok(Some(c as u8)),
            _ => bail!("ingest.delimiter must be a single ASCII character, got {d:?}"),
        }
    }

    /// Replace unusable weights with defaults.
    fn sanitize(mut self) -> Self {
        let ok = |w: f64| w.is_finite() && w >= 0.0;
        if !ok(self.scoring.wr_weight) {
            self.scoring.wr_weight = DEFAULT_WR_WEIGHT;
        }
        if !ok(self.scoring.ko_weight) {
            self.scoring.ko_weight = DEFAULT_KO_WEIGHT;
        }
        if let Some(k) = self.filter.weapon_type.take() {
            let k = crate::normalize::normalize_key(&k);
            self.filter.weapon_type = (!k.is_empty()).then_some(k);
        }
        self
    }
}

/// Load from an explicit path. Format follows the extension, then content.
pub fn load_from(path: &Path) -> Result<PipelineConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading pipeline config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

/// Load using env var + fallbacks (see module docs).
pub fn load_default() -> Result<PipelineConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
    }
    for p in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
    }
    Ok(PipelineConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<PipelineConfig> {
    let cfg = match hint_ext {
        "toml" => toml::from_str::<PipelineConfig>(s).context("parsing TOML config")?,
        "json" => serde_json::from_str::<PipelineConfig>(s).context("parsing JSON config")?,
        _ => match serde_json::from_str::<PipelineConfig>(s) {
            Ok(c) => c,
            Err(_) => toml::from_str::<PipelineConfig>(s).context("unsupported config format")?,
        },
    };
    let cfg = cfg.sanitize();
    cfg.delimiter()?;
    Ok(cfg)
}
