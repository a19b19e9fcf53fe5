//! # Weapon Classifier
//!
//! Maps free-text weapon descriptions to one of five style categories using an
//! ordered keyword table. The first matching rule wins; order is significant
//! (e.g. "bar" is listed for both horizontal and vertical, and resolves to
//! horizontal because that rule is checked first).

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponCategory {
    Overhead,
    Control,
    Horizontal,
    Vertical,
    Other,
}

impl WeaponCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            WeaponCategory::Overhead => "overhead",
            WeaponCategory::Control => "control",
            WeaponCategory::Horizontal => "horizontal",
            WeaponCategory::Vertical => "vertical",
            WeaponCategory::Other => "other",
        }
    }
}

impl fmt::Display for WeaponCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the classification table: any keyword hit selects `category`.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: WeaponCategory,
    pub keywords: &'static [&'static str],
}

/// Keyword rules in priority order. Empty text is handled before this table.
pub const CATEGORY_RULES: [CategoryRule; 4] = [
    CategoryRule {
        category: WeaponCategory::Overhead,
        keywords: &["hammer", "axe", "overhead"],
    },
    CategoryRule {
        category: WeaponCategory::Control,
        keywords: &[
            "lifter", "clamp", "grab", "grabber", "control", "flipper", "wedge", "pincer", "fork",
        ],
    },
    CategoryRule {
        category: WeaponCategory::Horizontal,
        keywords: &[
            "horizontal",
            "undercutter",
            "shell",
            "full body",
            "ring",
            "bar",
        ],
    },
    CategoryRule {
        category: WeaponCategory::Vertical,
        keywords: &["vertical", "drum", "eggbeater", "beater", "bar"],
    },
];

const FLAME_KEYWORDS: [&str; 4] = ["flame", "flamethrow", "flame thrower", "torch"];

impl CategoryRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k))
    }
}

/// Classify from the two raw weapon fields (joined with a space, lowercased).
pub fn classify(weapon_type: &str, weapon_specific: &str) -> WeaponCategory {
    classify_text(&format!("{weapon_type} {weapon_specific}"))
}

/// Classify an already combined description.
pub fn classify_text(text: &str) -> WeaponCategory {
    let lowered = text.to_lowercase();
    if lowered.trim().is_empty() {
        return WeaponCategory::Other;
    }
    CATEGORY_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.category)
        .unwrap_or(WeaponCategory::Other)
}

/// True if a normalized weapon-specific key names a flame weapon.
pub fn is_flamethrower(weapon_specific_normalized: &str) -> bool {
    FLAME_KEYWORDS
        .iter()
        .any(|k| weapon_specific_normalized.contains(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_examples() {
        assert_eq!(classify("Vertical", "Drum"), WeaponCategory::Vertical);
        assert_eq!(classify("Horizontal", "Bar"), WeaponCategory::Horizontal);
        assert_eq!(classify("", ""), WeaponCategory::Other);
        assert_eq!(classify("Clamp", ""), WeaponCategory::Control);
    }

    #[test]
    fn bare_bar_resolves_to_horizontal() {
        assert_eq!(classify_text("bar"), WeaponCategory::Horizontal);
        assert_eq!(classify_text("Vertical bar"), WeaponCategory::Horizontal);
    }

    #[test]
    fn overhead_beats_control() {
        // "hammer" (overhead) is checked before "grab" (control).
        assert_eq!(classify("Hammer", "grabber arm"), WeaponCategory::Overhead);
    }

    #[test]
    fn each_rule_fires_on_its_own_keywords() {
        for rule in CATEGORY_RULES {
            for kw in rule.keywords {
                let got = classify_text(kw);
                // "bar" is shadowed by the horizontal rule.
                if rule.category == WeaponCategory::Vertical && *kw == "bar" {
                    assert_eq!(got, WeaponCategory::Horizontal);
                } else {
                    assert_eq!(got, rule.category, "keyword {kw}");
                }
            }
        }
    }

    #[test]
    fn unknown_and_whitespace() {
        assert_eq!(classify_text("   "), WeaponCategory::Other);
        assert_eq!(classify_text("saw blade"), WeaponCategory::Other);
    }

    #[test]
    fn flame_detection() {
        assert!(is_flamethrower("flamethrower"));
        assert!(is_flamethrower("propane torch"));
        assert!(!is_flamethrower("wedge"));
    }
}
