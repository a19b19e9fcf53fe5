//! Leaderboards built over the current working population.
//!
//! Effectiveness ranks are computed inside [`build_report`] from the same
//! population the boards are drawn from, so a board never mixes ranks from a
//! different filter.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{confidence, estimate_bonus_from_upsets_and_finals, implied_point_mods, rookie_deficit};
use crate::normalize::BotRecord;
use crate::rank_change::{parse_rank_change, Direction, RankChange};
use crate::scoring::{rank, rank_map, score, ScoreConfig};

/// Which ruleset the rookie threshold comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InsightContext {
    #[serde(rename = "3lb-all")]
    ThreeLbAllTime,
    #[default]
    #[serde(rename = "3lb-year")]
    ThreeLbYear,
    #[serde(rename = "other")]
    Other,
}

impl InsightContext {
    /// Minimum fights before the rookie penalty stops applying.
    pub fn min_fight_threshold(self) -> u32 {
        match self {
            InsightContext::ThreeLbAllTime => 10,
            InsightContext::ThreeLbYear => 8,
            InsightContext::Other => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightParams {
    pub context: InsightContext,
    /// Fight floor for the performance boards.
    pub min_fights: u32,
    pub top_n: usize,
}

impl Default for InsightParams {
    fn default() -> Self {
        Self {
            context: InsightContext::default(),
            min_fights: 8,
            top_n: 10,
        }
    }
}

/// Per-record derived values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightRow<'a> {
    pub record: &'a BotRecord,
    pub e_rank: Option<usize>,
    /// Official rank minus effectiveness rank (positive = better than official).
    pub delta: i64,
    pub rank_change: RankChange,
    pub e_score: f64,
    /// Fight-count reliability in `[0.1, 1]`.
    pub confidence: f64,
    pub point_mods: Option<f64>,
    pub bonus_estimate: Option<f64>,
    pub rookie_deficit: u32,
    pub points_per_fight: Option<f64>,
    pub ko_diff_per_fight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardEntry<'a> {
    #[serde(flatten)]
    pub row: InsightRow<'a>,
    /// The value the board was sorted on.
    pub metric: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RankChangeCoverage {
    pub up: usize,
    pub down: usize,
    pub new: usize,
    pub same: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsightReport<'a> {
    pub coverage: RankChangeCoverage,
    pub overperformers: Vec<BoardEntry<'a>>,
    pub underperformers: Vec<BoardEntry<'a>>,
    pub movers_up: Vec<BoardEntry<'a>>,
    pub movers_down: Vec<BoardEntry<'a>>,
    pub rookies: Vec<BoardEntry<'a>>,
    pub stable: Vec<BoardEntry<'a>>,
    pub points_per_fight_leaders: Vec<BoardEntry<'a>>,
    pub bonus_heavy: Vec<BoardEntry<'a>>,
    pub penalty_watchlist: Vec<BoardEntry<'a>>,
    pub ko_artists: Vec<BoardEntry<'a>>,
    pub glass_cannons: Vec<BoardEntry<'a>>,
    pub tanks: Vec<BoardEntry<'a>>,
    pub control_specialists: Vec<BoardEntry<'a>>,
    pub control_undervalued: Vec<BoardEntry<'a>>,
}

/// Derive one row per record against an existing rank map.
pub fn derive_rows<'a>(
    population: &[&'a BotRecord],
    ranks: &HashMap<String, usize>,
    cfg: ScoreConfig,
    min_fight_threshold: u32,
) -> Vec<InsightRow<'a>> {
    population
        .iter()
        .map(|&b| {
            let e_rank = ranks.get(&b.name).copied();
            let delta = e_rank
                .map(|e| i64::from(b.official_rank) - e as i64)
                .unwrap_or(0);
            let fights = f64::from(b.fights);
            let points_per_fight = b.points.filter(|_| b.fights > 0).map(|p| p / fights);
            let ko_diff = f64::from(b.kos) - f64::from(b.kos_against.unwrap_or(0));
            InsightRow {
                record: b,
                e_rank,
                delta,
                rank_change: parse_rank_change(&b.rank_change_raw),
                e_score: score(b, cfg),
                confidence: confidence(b.fights),
                point_mods: implied_point_mods(b),
                bonus_estimate: estimate_bonus_from_upsets_and_finals(b, min_fight_threshold),
                rookie_deficit: rookie_deficit(b, min_fight_threshold),
                points_per_fight,
                ko_diff_per_fight: (b.fights > 0).then(|| ko_diff / fights),
            }
        })
        .collect()
}

pub fn coverage(rows: &[InsightRow<'_>]) -> RankChangeCoverage {
    let mut c = RankChangeCoverage::default();
    for r in rows {
        match r.rank_change.direction {
            Direction::Up => c.up += 1,
            Direction::Down => c.down += 1,
            Direction::New => c.new += 1,
            Direction::Same => c.same += 1,
        }
    }
    c
}

#[derive(Clone, Copy)]
enum Order {
    Desc,
    Asc,
}

/// Stable top-N by `metric`.
fn board<'a, F, M>(
    rows: &[InsightRow<'a>],
    n: usize,
    keep: F,
    metric: M,
    order: Order,
) -> Vec<BoardEntry<'a>>
where
    F: Fn(&InsightRow<'a>) -> bool,
    M: Fn(&InsightRow<'a>) -> f64,
{
    let mut picked: Vec<BoardEntry<'a>> = rows
        .iter()
        .filter(|&r| keep(r))
        .map(|r| BoardEntry {
            metric: metric(r),
            row: r.clone(),
        })
        .collect();
    match order {
        Order::Desc => picked.sort_by(|a, b| b.metric.total_cmp(&a.metric)),
        Order::Asc => picked.sort_by(|a, b| a.metric.total_cmp(&b.metric)),
    }
    picked.truncate(n);
    picked
}

/// Rank `population`, derive rows, and fill every board.
pub fn build_report<'a>(
    population: &[&'a BotRecord],
    cfg: ScoreConfig,
    params: InsightParams,
) -> InsightReport<'a> {
    let ranks = rank_map(&rank(population.iter().copied(), cfg));
    let threshold = params.context.min_fight_threshold();
    let rows = derive_rows(population, &ranks, cfg, threshold);

    let n = params.top_n;
    let min_f = params.min_fights;
    let have_points = rows.iter().any(|r| r.record.points.is_some());
    let seasoned = |r: &InsightRow<'_>| r.record.fights >= min_f;
    let control = |r: &InsightRow<'_>| r.record.is_control_non_flame();

    InsightReport {
        coverage: coverage(&rows),
        overperformers: board(
            &rows,
            n,
            |r| r.e_rank.is_some() && r.delta > 0,
            |r| r.delta as f64,
            Order::Desc,
        ),
        underperformers: board(
            &rows,
            n,
            |r| r.e_rank.is_some() && r.delta < 0,
            |r| r.delta as f64,
            Order::Asc,
        ),
        movers_up: board(
            &rows,
            n,
            |r| r.rank_change.direction == Direction::Up && r.rank_change.magnitude_or_zero() > 0,
            |r| r.rank_change.magnitude_or_zero() as f64,
            Order::Desc,
        ),
        movers_down: board(
            &rows,
            n,
            |r| r.rank_change.direction == Direction::Down && r.rank_change.magnitude_or_zero() > 0,
            |r| r.rank_change.magnitude_or_zero() as f64,
            Order::Desc,
        ),
        rookies: board(
            &rows,
            n,
            |r| r.rank_change.direction == Direction::New,
            |r| r.e_score,
            Order::Desc,
        ),
        stable: board(
            &rows,
            n,
            |r| r.rank_change.direction == Direction::Same,
            |r| f64::from(r.record.official_rank),
            Order::Asc,
        ),
        points_per_fight_leaders: if have_points {
            board(
                &rows,
                n,
                |r| r.points_per_fight.is_some() && seasoned(r),
                |r| r.points_per_fight.unwrap_or(0.0),
                Order::Desc,
            )
        } else {
            Vec::new()
        },
        bonus_heavy: if have_points {
            board(
                &rows,
                n,
                |r| r.bonus_estimate.is_some() && seasoned(r),
                |r| r.bonus_estimate.unwrap_or(0.0),
                Order::Desc,
            )
        } else {
            Vec::new()
        },
        penalty_watchlist: board(
            &rows,
            n,
            |r| r.record.fights < threshold,
            |r| r.e_score,
            Order::Desc,
        ),
        ko_artists: board(&rows, n, seasoned, |r| r.record.ko_win_rate_normalized, Order::Desc),
        glass_cannons: board(
            &rows,
            n,
            seasoned,
            |r| r.record.ko_win_rate_normalized * 0.7 + r.record.ko_against_rate_normalized * 0.3,
            Order::Desc,
        ),
        tanks: board(
            &rows,
            n,
            seasoned,
            |r| {
                (1.0 - r.record.ko_against_rate_normalized) * 0.7
                    + r.record.win_rate_normalized * 0.3
            },
            Order::Desc,
        ),
        control_specialists: board(
            &rows,
            n,
            |r| control(r) && seasoned(r),
            |r| r.e_score,
            Order::Desc,
        ),
        control_undervalued: board(
            &rows,
            n,
            |r| control(r) && r.e_rank.is_some() && r.delta > 0,
            |r| r.delta as f64,
            Order::Desc,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::table::parse_table;
    use crate::snapshot::Snapshot;

    const SHEET: &str = "\
Bot,Rank,Rank Change,Fights,W,L,KOs,KO'd,Winrate,Points,WeaponType,WeaponType-specific
Anvil,1,>2,20,15,5,10,1,75,12,Vertical,Drum
Gripper,2,-,18,14,4,0,0,77.8,,Control,Clamp
Newbie,3,!,3,3,0,3,0,100,4,Horizontal,Bar
Slider,4,<3,12,4,8,2,6,33.3,-3,Wedge,
Torchy,5,new,9,6,3,1,2,66.7,5,Control,Flamethrower
";

    fn snap() -> Snapshot {
        Snapshot::from_table(parse_table(SHEET, None).unwrap(), "t.csv")
    }

    #[test]
    fn thresholds_per_context() {
        assert_eq!(InsightContext::ThreeLbAllTime.min_fight_threshold(), 10);
        assert_eq!(InsightContext::ThreeLbYear.min_fight_threshold(), 8);
        assert_eq!(InsightContext::Other.min_fight_threshold(), 5);
    }

    #[test]
    fn coverage_counts_every_direction() {
        let s = snap();
        let pop: Vec<&BotRecord> = s.bots.iter().collect();
        let rep = build_report(&pop, ScoreConfig::default(), InsightParams::default());
        assert_eq!(
            rep.coverage,
            RankChangeCoverage {
                up: 1,
                down: 1,
                new: 2,
                same: 1
            }
        );
    }

    #[test]
    fn boards_follow_their_filters() {
        let s = snap();
        let pop: Vec<&BotRecord> = s.bots.iter().collect();
        let rep = build_report(&pop, ScoreConfig::default(), InsightParams::default());

        let names = |b: &[BoardEntry<'_>]| {
            b.iter()
                .map(|e| e.row.record.name.clone())
                .collect::<Vec<_>>()
        };

        assert_eq!(names(&rep.movers_up), ["Anvil"]);
        assert_eq!(names(&rep.movers_down), ["Slider"]);
        assert_eq!(names(&rep.rookies), ["Newbie", "Torchy"]);
        assert_eq!(names(&rep.stable), ["Gripper"]);
        // Only Newbie is under the 3lb-year threshold of 8 fights.
        assert_eq!(names(&rep.penalty_watchlist), ["Newbie"]);
        // Torchy is control but a flamethrower; Slider (wedge) is control.
        assert_eq!(names(&rep.control_specialists), ["Gripper", "Slider"]);
        // Gripper has no points -> excluded from point boards.
        assert!(rep.bonus_heavy.iter().all(|e| e.row.record.name != "Gripper"));
    }

    #[test]
    fn newbie_tops_overperformers() {
        let s = snap();
        let pop: Vec<&BotRecord> = s.bots.iter().collect();
        let rep = build_report(&pop, ScoreConfig::default(), InsightParams::default());
        // Newbie: official 3, best score (1.0) -> E#1, delta +2.
        assert_eq!(rep.overperformers[0].row.record.name, "Newbie");
        assert_eq!(rep.overperformers[0].row.delta, 2);
        assert!(rep.underperformers.iter().all(|e| e.row.delta < 0));
    }

    #[test]
    fn no_points_means_no_point_boards() {
        let t = parse_table("Bot,Fights,W,L\nA,10,5,5\n", None).unwrap();
        let s = Snapshot::from_table(t, "t.csv");
        let pop: Vec<&BotRecord> = s.bots.iter().collect();
        let rep = build_report(&pop, ScoreConfig::default(), InsightParams::default());
        assert!(rep.points_per_fight_leaders.is_empty());
        assert!(rep.bonus_heavy.is_empty());
        assert_eq!(rep.ko_artists.len(), 1);
    }

    #[test]
    fn ko_diff_and_points_per_fight() {
        let s = snap();
        let pop: Vec<&BotRecord> = s.bots.iter().collect();
        let ranks = rank_map(&rank(pop.iter().copied(), ScoreConfig::default()));
        let rows = derive_rows(&pop, &ranks, ScoreConfig::default(), 8);
        let anvil = &rows[0];
        assert!((anvil.points_per_fight.unwrap() - 0.6).abs() < 1e-9);
        assert!((anvil.ko_diff_per_fight.unwrap() - 0.45).abs() < 1e-9);
        assert_eq!(rows[1].points_per_fight, None);
    }

    #[test]
    fn rows_carry_fight_confidence() {
        let s = snap();
        let pop: Vec<&BotRecord> = s.bots.iter().collect();
        let ranks = rank_map(&rank(pop.iter().copied(), ScoreConfig::default()));
        let rows = derive_rows(&pop, &ranks, ScoreConfig::default(), 8);
        // Anvil 20 fights, Newbie 3, Torchy 9.
        assert_eq!(rows[0].confidence, 1.0);
        assert_eq!(rows[2].confidence, 0.2);
        assert!((rows[4].confidence - 0.4).abs() < 1e-9);
    }
}
