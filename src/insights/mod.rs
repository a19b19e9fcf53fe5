//! # Insight metrics
//!
//! Small pure functions over a [`BotRecord`] used by the leaderboards.
//!
//! The points-based helpers read the sheet's `Points` column as an opaque value.
//! [`estimate_bonus_from_upsets_and_finals`] in particular is a heuristic
//! estimate of non-base point contributions, not a reconstruction of any
//! official scoring.

pub mod leaderboards;

use serde::Serialize;

use crate::normalize::BotRecord;

pub const CONFIDENCE_MIN_FIGHTS: u32 = 5;
pub const CONFIDENCE_IDEAL_FIGHTS: u32 = 15;

const BUCKET_WIDTH: f64 = 0.05;
const BUCKET_COUNT: usize = 20;

/// Saturating reliability proxy from fight count.
///
/// 0.1 with no fights; otherwise `(fights - min) / max(1, ideal - min)` clamped
/// to `[0.2, 1]`.
pub fn confidence_from_fights(fights: u32, min: u32, ideal: u32) -> f64 {
    if fights == 0 {
        return 0.1;
    }
    let span = f64::from(ideal.saturating_sub(min).max(1));
    let v = (f64::from(fights) - f64::from(min)) / span;
    v.clamp(0.2, 1.0)
}

/// [`confidence_from_fights`] with the default 5/15 bounds.
pub fn confidence(fights: u32) -> f64 {
    confidence_from_fights(fights, CONFIDENCE_MIN_FIGHTS, CONFIDENCE_IDEAL_FIGHTS)
}

/// `wins - losses`.
pub fn base_points(record: &BotRecord) -> f64 {
    f64::from(record.wins) - f64::from(record.losses)
}

/// `points - (wins - losses)`; `None` when the sheet has no usable points.
pub fn implied_point_mods(record: &BotRecord) -> Option<f64> {
    record.points.map(|p| p - base_points(record))
}

/// Fights short of `min_fight_threshold` (never negative).
pub fn rookie_deficit(record: &BotRecord, min_fight_threshold: u32) -> u32 {
    min_fight_threshold.saturating_sub(record.fights)
}

/// Heuristic: implied mods with the rookie deficit added back.
pub fn estimate_bonus_from_upsets_and_finals(
    record: &BotRecord,
    min_fight_threshold: u32,
) -> Option<f64> {
    implied_point_mods(record)
        .map(|mods| mods + f64::from(rookie_deficit(record, min_fight_threshold)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WinrateBucket {
    /// e.g. `"80-85%"`.
    pub label: String,
    pub index: usize,
    pub count: usize,
}

/// Sparse 5%-wide histogram of win rates, in ascending bin order.
/// Values ≥ 1 land in the last bin, values < 0 in the first.
pub fn winrate_buckets5<'a, I>(records: I) -> Vec<WinrateBucket>
where
    I: IntoIterator<Item = &'a BotRecord>,
{
    let mut counts = [0usize; BUCKET_COUNT];
    for r in records {
        counts[bucket_index(r.win_rate_normalized)] += 1;
    }
    counts
        .iter()
        .enumerate()
        .filter(|(_, &c)| c > 0)
        .map(|(i, &count)| WinrateBucket {
            label: bucket_label(i),
            index: i,
            count,
        })
        .collect()
}

fn bucket_index(win_rate: f64) -> usize {
    let idx = (win_rate / BUCKET_WIDTH).floor();
    if idx.is_nan() || idx < 0.0 {
        0
    } else {
        (idx as usize).min(BUCKET_COUNT - 1)
    }
}

fn bucket_label(i: usize) -> String {
    format!("{}-{}%", i * 5, (i + 1) * 5)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::types::RawRow;
    use crate::normalize::normalize_row;
    use std::sync::Arc;

    fn rec(pairs: &[(&str, &str)]) -> BotRecord {
        let headers: Arc<[String]> = pairs.iter().map(|(h, _)| h.to_string()).collect();
        let row = RawRow::new(headers, pairs.iter().map(|(_, v)| v.to_string()).collect());
        normalize_row(&row, 1)
    }

    #[test]
    fn confidence_bounds_and_monotonic() {
        assert_eq!(confidence(0), 0.1);
        assert_eq!(confidence(1), 0.2);
        assert_eq!(confidence(5), 0.2);
        assert!((confidence(10) - 0.5).abs() < 1e-9);
        assert_eq!(confidence(15), 1.0);
        assert_eq!(confidence(40), 1.0);

        let mut prev = 0.0;
        for f in 0..50 {
            let c = confidence(f);
            assert!(c >= prev);
            prev = c;
        }
    }

    #[test]
    fn confidence_with_degenerate_span() {
        // ideal <= min: span treated as 1
        assert_eq!(confidence_from_fights(6, 5, 5), 1.0);
    }

    #[test]
    fn point_helpers_propagate_absence() {
        let none = rec(&[("Bot", "A"), ("W", "5"), ("L", "1")]);
        assert_eq!(implied_point_mods(&none), None);
        assert_eq!(estimate_bonus_from_upsets_and_finals(&none, 8), None);

        let some = rec(&[
            ("Bot", "A"),
            ("W", "5"),
            ("L", "1"),
            ("Fights", "6"),
            ("Points", "7.5"),
        ]);
        assert_eq!(implied_point_mods(&some), Some(3.5));
        assert_eq!(rookie_deficit(&some, 8), 2);
        assert_eq!(rookie_deficit(&some, 3), 0);
        assert_eq!(estimate_bonus_from_upsets_and_finals(&some, 8), Some(5.5));
    }

    #[test]
    fn buckets_are_sparse() {
        let bots = vec![
            rec(&[("Bot", "A"), ("Winrate", "0.81")]),
            rec(&[("Bot", "B"), ("Winrate", "81")]),
            rec(&[("Bot", "C"), ("Winrate", "0.02")]),
        ];
        let b = winrate_buckets5(&bots);
        assert_eq!(b.len(), 2);
        assert_eq!((b[0].label.as_str(), b[0].count), ("0-5%", 1));
        assert_eq!((b[1].label.as_str(), b[1].count), ("80-85%", 2));
    }

    #[test]
    fn perfect_winrate_lands_in_last_bin() {
        let bots = vec![rec(&[("Bot", "A"), ("Winrate", "1")])];
        let b = winrate_buckets5(&bots);
        assert_eq!(b[0].label, "95-100%");
        assert_eq!(bucket_index(-0.3), 0);
    }
}
