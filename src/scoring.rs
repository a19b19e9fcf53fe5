//! # Effectiveness Scorer
//!
//! `score = win_rate * w_wr + ko_rate * w_ko`, with one exception: control bots
//! that are not flamethrowers score on win rate alone (`w_wr = 1, w_ko = 0`)
//! unless `control_ko_included` is set.
//!
//! Ranks are positions in the working collection sorted by score, descending.
//! The sort is stable, so equal scores keep their collection order. Ranks only
//! mean something relative to the collection they were computed over; callers
//! re-rank the whole collection whenever the population or config changes.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::normalize::BotRecord;

pub const DEFAULT_WR_WEIGHT: f64 = 0.7;
pub const DEFAULT_KO_WEIGHT: f64 = 0.3;

/// Scoring knobs, passed by value into every computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub control_ko_included: bool,
    pub wr_weight: f64,
    pub ko_weight: f64,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            control_ko_included: false,
            wr_weight: DEFAULT_WR_WEIGHT,
            ko_weight: DEFAULT_KO_WEIGHT,
        }
    }
}

impl ScoreConfig {
    pub fn with_control_ko(mut self, included: bool) -> Self {
        self.control_ko_included = included;
        self
    }

    /// `(w_wr, w_ko)` applied to `record`.
    pub fn weights_for(&self, record: &BotRecord) -> (f64, f64) {
        if record.is_control_non_flame() && !self.control_ko_included {
            (1.0, 0.0)
        } else {
            (self.wr_weight, self.ko_weight)
        }
    }
}

/// Effectiveness score of one record.
pub fn score(record: &BotRecord, cfg: ScoreConfig) -> f64 {
    let (w_wr, w_ko) = cfg.weights_for(record);
    record.win_rate_normalized * w_wr + record.ko_win_rate_normalized * w_ko
}

/// One entry of a ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked<'a> {
    pub record: &'a BotRecord,
    pub score: f64,
    /// 1-based; 1 = best.
    pub rank: usize,
}

/// Score and rank the full working collection.
///
/// Input order is the tie-break: `slice::sort_by` is stable, so records with
/// equal scores keep their relative order.
pub fn rank<'a, I>(records: I, cfg: ScoreConfig) -> Vec<Ranked<'a>>
where
    I: IntoIterator<Item = &'a BotRecord>,
{
    let mut scored: Vec<(&BotRecord, f64)> = records
        .into_iter()
        .map(|r| (r, score(r, cfg)))
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (record, score))| Ranked {
            record,
            score,
            rank: i + 1,
        })
        .collect()
}

/// Name → rank lookup.
///
/// Names are not guaranteed unique. Entries are inserted in rank order, so for a
/// duplicated name the later (worse) rank overwrites the earlier one.
pub fn rank_map(ranked: &[Ranked<'_>]) -> HashMap<String, usize> {
    let mut map = HashMap::with_capacity(ranked.len());
    for r in ranked {
        if map.insert(r.record.name.clone(), r.rank).is_some() {
            tracing::debug!(name = %r.record.name, rank = r.rank, "duplicate name in rank map");
        }
    }
    map
}
