//! # Field Normalizer
//!
//! Turns one [`RawRow`] into a canonical [`BotRecord`]. Every field has a
//! documented default, so any row yields a complete record:
//!
//! | field                     | source column(s)              | default                     |
//! |---------------------------|-------------------------------|-----------------------------|
//! | `official_rank`           | `Rank`                        | 1-based position            |
//! | counts                    | `Events` `Fights` `W` `L` `KOs` | 0                         |
//! | `win_rate_normalized`     | `Winrate` / `%` / `Percent`   | 0                           |
//! | `ko_win_rate_normalized`  | `KOWinrate`                   | `KOs / W` clamped           |
//! | `ko_against_rate_normalized` | `KO'd` / `KOd`             | `KO'd / L` clamped, else 0  |
//! | `points`                  | `Points`                      | absent (not 0)              |
//! | `rank_change_raw`         | `Rank Change` / `RankChange`  | `—`                         |
//!
//! Rates given on a 0–100 scale are detected by magnitude (> 1.0001) and
//! rescaled; all rates end up in `[0, 1]`.

use serde::Serialize;

use crate::classify::{classify, WeaponCategory};
use crate::ingest::types::RawRow;
use crate::ingest::{
    COL_EVENTS, COL_FIGHTS, COL_KOS, COL_KOS_AGAINST, COL_KO_WINRATE, COL_LOSSES, COL_POINTS,
    COL_RANK, COL_RANK_CHANGE, COL_WEAPON_SPECIFIC, COL_WEAPON_TYPE, COL_WINRATE, COL_WINS,
};
use crate::rank_change::NO_CHANGE_MARKER;

/// Above this magnitude a rate is read as a percentage. 1.0 itself stays a fraction.
pub const PERCENT_THRESHOLD: f64 = 1.0001;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BotRecord {
    pub name: String,
    pub official_rank: u32,
    pub rank_change_raw: String,

    pub events: u32,
    pub fights: u32,
    pub wins: u32,
    pub losses: u32,
    pub kos: u32,
    pub kos_against: Option<u32>,
    pub points: Option<f64>,

    /// Numeric source values before rescaling (absent if not numeric).
    pub win_rate_raw: Option<f64>,
    pub ko_win_rate_raw: Option<f64>,

    pub win_rate_normalized: f64,
    pub ko_win_rate_normalized: f64,
    pub ko_against_rate_normalized: f64,

    pub weapon_type_raw: String,
    pub weapon_specific_raw: String,
    pub weapon_type_normalized: String,
    pub weapon_specific_normalized: String,
    pub weapon_category: WeaponCategory,
}

impl BotRecord {
    pub fn has_weapon(&self) -> bool {
        !self.weapon_type_raw.is_empty() || !self.weapon_specific_raw.is_empty()
    }

    /// Control-style bot without a flame weapon.
    pub fn is_control_non_flame(&self) -> bool {
        self.weapon_category == WeaponCategory::Control
            && !crate::classify::is_flamethrower(&self.weapon_specific_normalized)
    }
}

/// Keep only rows with a non-empty `Bot` cell, preserving order.
/// Returns the kept rows and the number dropped.
pub fn retain_named(rows: Vec<RawRow>) -> (Vec<RawRow>, usize) {
    let before = rows.len();
    let kept: Vec<RawRow> = rows.into_iter().filter(|r| r.name().is_some()).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

/// Normalize a batch. Unnamed rows are skipped and do not consume a position.
pub fn normalize_rows(rows: &[RawRow]) -> Vec<BotRecord> {
    rows.iter()
        .filter_map(|r| r.name().map(|name| (r, name)))
        .enumerate()
        .map(|(idx, (row, name))| build_record(row, name, idx + 1))
        .collect()
}

/// Normalize a single row at 1-based `position` (used as the rank fallback).
/// A row without a name yields an empty `name`.
pub fn normalize_row(row: &RawRow, position: usize) -> BotRecord {
    build_record(row, row.name().unwrap_or_default(), position)
}

fn build_record(row: &RawRow, name: &str, position: usize) -> BotRecord {
    let wins = count(row.get(COL_WINS));
    let losses = count(row.get(COL_LOSSES));
    let kos = count(row.get(COL_KOS));

    let win_rate_raw = row.first_present(COL_WINRATE).and_then(parse_number);
    let win_rate_normalized = win_rate_raw.map(rate_from_value).unwrap_or(0.0);

    let ko_win_rate_raw = row.get(COL_KO_WINRATE).and_then(parse_number);
    let ko_win_rate_normalized = match ko_win_rate_raw {
        Some(v) => rate_from_value(v),
        None => ratio(kos, wins),
    };

    let kos_against = row
        .first_present(COL_KOS_AGAINST)
        .and_then(parse_number)
        .map(count_from_value);
    let ko_against_rate_normalized = kos_against.map(|k| ratio(k, losses)).unwrap_or(0.0);

    let weapon_type_raw = row.get(COL_WEAPON_TYPE).unwrap_or_default().trim().to_string();
    let weapon_specific_raw = row
        .get(COL_WEAPON_SPECIFIC)
        .unwrap_or_default()
        .trim()
        .to_string();

    let official_rank = row
        .get(COL_RANK)
        .and_then(parse_rank)
        .unwrap_or_else(|| u32::try_from(position).unwrap_or(u32::MAX));

    BotRecord {
        name: name.to_string(),
        official_rank,
        rank_change_raw: row
            .first_present(COL_RANK_CHANGE)
            .unwrap_or(NO_CHANGE_MARKER)
            .to_string(),
        events: count(row.get(COL_EVENTS)),
        fights: count(row.get(COL_FIGHTS)),
        wins,
        losses,
        kos,
        kos_against,
        points: row.get(COL_POINTS).and_then(parse_number),
        win_rate_raw,
        ko_win_rate_raw,
        win_rate_normalized,
        ko_win_rate_normalized,
        ko_against_rate_normalized,
        weapon_type_normalized: normalize_key(&weapon_type_raw),
        weapon_specific_normalized: normalize_key(&weapon_specific_raw),
        weapon_category: classify(&weapon_type_raw, &weapon_specific_raw),
        weapon_type_raw,
        weapon_specific_raw,
    }
}

// --- field parsers (each documents its own default) ---

/// Finite number in a cell; blank, non-numeric, NaN and infinities are `None`.
pub fn parse_number(cell: &str) -> Option<f64> {
    let t = cell.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Non-negative count; anything unusable is 0. Fractions truncate.
pub fn count(cell: Option<&str>) -> u32 {
    cell.and_then(parse_number).map(count_from_value).unwrap_or(0)
}

fn count_from_value(v: f64) -> u32 {
    // `as` saturates: negatives -> 0, huge -> u32::MAX.
    v.trunc() as u32
}

/// Leading-integer parse of a rank cell (`"12"`, `" 7th"`, `"3.9"` -> 3).
/// Zero, negative or digit-less cells are `None` so the caller falls back.
pub fn parse_rank(cell: &str) -> Option<u32> {
    let t = cell.trim_start();
    let digits: &str = {
        let end = t
            .char_indices()
            .find(|(_, c)| !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(t.len());
        &t[..end]
    };
    digits.parse::<u32>().ok().filter(|&n| n > 0)
}

/// Fraction-or-percentage value into `[0, 1]`.
pub fn rate_from_value(v: f64) -> f64 {
    let scaled = if v.abs() > PERCENT_THRESHOLD {
        v / 100.0
    } else {
        v
    };
    scaled.clamp(0.0, 1.0)
}

/// `num / den` clamped to `[0, 1]`; 0 when `den` is 0.
pub fn ratio(num: u32, den: u32) -> f64 {
    if den == 0 {
        return 0.0;
    }
    (f64::from(num) / f64::from(den)).clamp(0.0, 1.0)
}

/// Lowercase, trim, collapse internal whitespace runs to one space.
pub fn normalize_key(s: &str) -> String {
    s.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
