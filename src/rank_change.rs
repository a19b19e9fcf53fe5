//! # Rank-Change Parser
//!
//! Total parser for the small "rank change" token found in leaderboard sheets
//! (`>3`, `<`, `▲2`, `+4`, `down1`, `!`, `-`, ...). Rules are tried in table
//! order and the first hit wins; anything unrecognized reads as "no change".
//!
//! Matching is case-insensitive on a whitespace-stripped copy of the token;
//! the `new`/`rookie` word test runs on the trimmed original so word boundaries
//! survive.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Marker stored when a row has no rank-change cell.
pub const NO_CHANGE_MARKER: &str = "—";

/// 2^64; numeric tokens at or above this magnitude are unrecognized.
const U64_LIMIT: f64 = 18_446_744_073_709_551_616.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    New,
    Same,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankChange {
    pub direction: Direction,
    /// `None` only for [`Direction::New`].
    pub magnitude: Option<u64>,
    pub label: String,
}

impl RankChange {
    pub fn same() -> Self {
        Self {
            direction: Direction::Same,
            magnitude: Some(0),
            label: NO_CHANGE_MARKER.to_string(),
        }
    }

    pub fn new_entry() -> Self {
        Self {
            direction: Direction::New,
            magnitude: None,
            label: "!".to_string(),
        }
    }

    pub fn up(n: u64) -> Self {
        Self {
            direction: Direction::Up,
            magnitude: Some(n),
            label: format!("▲{n}"),
        }
    }

    pub fn down(n: u64) -> Self {
        Self {
            direction: Direction::Down,
            magnitude: Some(n),
            label: format!("▼{n}"),
        }
    }

    /// Magnitude with `new` counted as zero (for sorting movers).
    pub fn magnitude_or_zero(&self) -> u64 {
        self.magnitude.unwrap_or(0)
    }
}

/// Token views shared by every rule.
pub struct Token<'a> {
    /// Trimmed original.
    pub raw: &'a str,
    /// Lowercased with all whitespace removed.
    pub compact: String,
}

impl<'a> Token<'a> {
    pub fn new(input: &'a str) -> Self {
        let raw = input.trim();
        let compact = raw
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        Self { raw, compact }
    }
}

type RuleFn = fn(&Token<'_>) -> Option<RankChange>;

/// Named rule, kept public so each rule can be exercised on its own.
pub struct RankChangeRule {
    pub name: &'static str,
    pub apply: RuleFn,
}

pub static RULES: [RankChangeRule; 9] = [
    RankChangeRule {
        name: "empty",
        apply: rule_empty,
    },
    RankChangeRule {
        name: "dash",
        apply: rule_dash,
    },
    RankChangeRule {
        name: "new",
        apply: rule_new,
    },
    RankChangeRule {
        name: "chevron",
        apply: rule_chevron,
    },
    RankChangeRule {
        name: "triangle",
        apply: rule_triangle,
    },
    RankChangeRule {
        name: "signed",
        apply: rule_signed,
    },
    RankChangeRule {
        name: "word",
        apply: rule_word,
    },
    RankChangeRule {
        name: "numeric",
        apply: rule_numeric,
    },
    RankChangeRule {
        name: "fallback",
        apply: rule_fallback,
    },
];

static RE_NEW_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(?:new|rookie)\b").unwrap());
static RE_UP_CHEVRON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^>(\d+)?$").unwrap());
static RE_DOWN_CHEVRON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<(\d+)?$").unwrap());
static RE_UP_TRIANGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^▲(\d+)?$").unwrap());
static RE_DOWN_TRIANGLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^▼(\d+)?$").unwrap());
static RE_SIGNED: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([+\-−])(\d+)$").unwrap());
static RE_UP_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^up(\d+)?$").unwrap());
static RE_DOWN_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^down(\d+)?$").unwrap());

/// Parse one token. Never fails.
pub fn parse_rank_change(input: &str) -> RankChange {
    let token = Token::new(input);
    RULES
        .iter()
        .find_map(|rule| (rule.apply)(&token))
        .unwrap_or_else(RankChange::same)
}

/// Name of the rule that decides `input` (diagnostics).
pub fn matching_rule(input: &str) -> &'static str {
    let token = Token::new(input);
    RULES
        .iter()
        .find(|rule| (rule.apply)(&token).is_some())
        .map(|rule| rule.name)
        .unwrap_or("fallback")
}

// --- rules ---

fn rule_empty(t: &Token<'_>) -> Option<RankChange> {
    t.raw.is_empty().then(RankChange::same)
}

fn rule_dash(t: &Token<'_>) -> Option<RankChange> {
    matches!(t.compact.as_str(), "-" | "–" | "—").then(RankChange::same)
}

fn rule_new(t: &Token<'_>) -> Option<RankChange> {
    let hit = t.compact.contains('!') || RE_NEW_WORD.is_match(&t.raw.to_lowercase());
    hit.then(RankChange::new_entry)
}

fn rule_chevron(t: &Token<'_>) -> Option<RankChange> {
    optional_count(&RE_UP_CHEVRON, &t.compact)
        .map(RankChange::up)
        .or_else(|| optional_count(&RE_DOWN_CHEVRON, &t.compact).map(RankChange::down))
}

fn rule_triangle(t: &Token<'_>) -> Option<RankChange> {
    optional_count(&RE_UP_TRIANGLE, &t.compact)
        .map(RankChange::up)
        .or_else(|| optional_count(&RE_DOWN_TRIANGLE, &t.compact).map(RankChange::down))
}

fn rule_signed(t: &Token<'_>) -> Option<RankChange> {
    let caps = RE_SIGNED.captures(&t.compact)?;
    let n: u64 = caps.get(2)?.as_str().parse().ok()?;
    match caps.get(1)?.as_str() {
        "+" => Some(RankChange::up(n)),
        _ => Some(RankChange::down(n)),
    }
}

fn rule_word(t: &Token<'_>) -> Option<RankChange> {
    optional_count(&RE_UP_WORD, &t.compact)
        .map(RankChange::up)
        .or_else(|| optional_count(&RE_DOWN_WORD, &t.compact).map(RankChange::down))
}

fn rule_numeric(t: &Token<'_>) -> Option<RankChange> {
    let v: f64 = t.compact.parse().ok().filter(|v: &f64| v.is_finite())?;
    // Integral values only ("3.0" counts, "1.5" does not); must fit u64.
    if v.fract() != 0.0 || v.abs() >= U64_LIMIT {
        return None;
    }
    let n = v.abs() as u64;
    Some(match n {
        0 => RankChange::same(),
        n if v > 0.0 => RankChange::up(n),
        n => RankChange::down(n),
    })
}

fn rule_fallback(_: &Token<'_>) -> Option<RankChange> {
    Some(RankChange::same())
}

/// Digits captured by group 1, defaulting to 1 when the group is absent.
/// Returns `None` when the pattern does not match or the count overflows.
fn optional_count(re: &Regex, s: &str) -> Option<u64> {
    let caps = re.captures(s)?;
    match caps.get(1) {
        Some(m) => m.as_str().parse().ok(),
        None => Some(1),
    }
}
