//! Population selection and the summary views built on top of it.
//!
//! A [`Filter`] picks the working collection that scoring and insights run
//! over. It borrows from the snapshot and never copies or edits records.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::normalize::BotRecord;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filter {
    /// Normalized weapon type key; `None` keeps every type.
    pub weapon_type: Option<String>,
    pub min_fights: u32,
}

impl Filter {
    /// `check_type` is false when the batch has no weapon columns; the type
    /// predicate is then skipped.
    pub fn keeps(&self, b: &BotRecord, check_type: bool) -> bool {
        let type_ok = !check_type
            || self
                .weapon_type
                .as_deref()
                .map_or(true, |k| b.weapon_type_normalized == k);
        type_ok && b.fights >= self.min_fights
    }

    /// Matching records in input order. A weapon type selection is ignored
    /// when no record carries a weapon description.
    pub fn apply<'a>(&self, bots: &'a [BotRecord]) -> Vec<&'a BotRecord> {
        let check_type = bots.iter().any(BotRecord::has_weapon);
        if !check_type && self.weapon_type.is_some() {
            tracing::debug!("no weapon columns; weapon type filter skipped");
        }
        bots.iter().filter(|b| self.keeps(b, check_type)).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponTypeOption {
    pub key: String,
    pub label: String,
    pub count: usize,
}

/// Distinct weapon types (by normalized key), most common first.
///
/// The label is the most frequent trimmed spelling seen for the key; the first
/// spelling encountered wins a tie.
pub fn weapon_type_options(bots: &[BotRecord]) -> Vec<WeaponTypeOption> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&BotRecord>> = HashMap::new();
    for b in bots {
        let key = b.weapon_type_normalized.as_str();
        if key.is_empty() {
            continue;
        }
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(b);
    }

    let mut out: Vec<WeaponTypeOption> = order
        .into_iter()
        .map(|key| {
            let items = &groups[key];
            WeaponTypeOption {
                key: key.to_string(),
                label: common_label(items).unwrap_or_else(|| title_case(key)),
                count: items.len(),
            }
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

fn common_label(items: &[&BotRecord]) -> Option<String> {
    let mut seen: Vec<(&str, usize)> = Vec::new();
    for b in items {
        let raw = b.weapon_type_raw.as_str();
        match seen.iter_mut().find(|(s, _)| *s == raw) {
            Some((_, n)) => *n += 1,
            None => seen.push((raw, 1)),
        }
    }
    // max_by_key returns the last max; iterate reversed to keep the first.
    seen.into_iter()
        .rev()
        .max_by_key(|(_, n)| *n)
        .map(|(s, _)| s.to_string())
        .filter(|s| !s.is_empty())
}

/// `"vertical spinner-drum"` -> `"Vertical Spinner Drum"`.
pub fn title_case(s: &str) -> String {
    s.to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut cs = w.chars();
            match cs.next() {
                Some(f) => f.to_uppercase().chain(cs).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Overview {
    pub bots: usize,
    pub avg_win_rate: f64,
    pub avg_ko_rate: f64,
    pub total_fights: u64,
}

pub fn overview(population: &[&BotRecord]) -> Overview {
    let n = population.len();
    if n == 0 {
        return Overview::default();
    }
    let sum_wr: f64 = population.iter().map(|b| b.win_rate_normalized).sum();
    let sum_ko: f64 = population.iter().map(|b| b.ko_win_rate_normalized).sum();
    Overview {
        bots: n,
        avg_win_rate: sum_wr / n as f64,
        avg_ko_rate: sum_ko / n as f64,
        total_fights: population.iter().map(|b| u64::from(b.fights)).sum(),
    }
}
