use std::collections::HashMap;
use std::num::IntErrorKind;

use serde::{Deserialize, Serialize};

use crate::entities::NewAttribute;
use crate::value_objects::ThreatLevel;

/// Scoring configuration for threat levels.
///
/// The table is plain data: the engine never mutates it and it can be swapped
/// per test or loaded from a file at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTable {
    /// Base score for categories missing from `category_base`.
    pub default_base: i64,
    pub category_base: HashMap<String, i64>,
    /// Attribute keys whose value is parsed as an integer and weighted.
    pub numeric_keys: Vec<String>,
    pub numeric_weight: i64,
    /// Attribute keys whose value is looked up in `verbal_adjustments`.
    pub verbal_keys: Vec<String>,
    /// Lowercase verbal estimate -> adjustment.
    pub verbal_adjustments: HashMap<String, i64>,
}

impl Default for ScoringTable {
    fn default() -> Self {
        let category_base = [("Měňavec", 70), ("Elementál", 50), ("Přízrak", 30)]
            .into_iter()
            .map(|(category, base)| (category.to_string(), base))
            .collect();
        let verbal_adjustments = [
            ("nízká", -10),
            ("nizka", -10),
            ("low", -10),
            ("střední", 0),
            ("stredni", 0),
            ("medium", 0),
            ("vysoká", 20),
            ("vysoka", 20),
            ("high", 20),
        ]
        .into_iter()
        .map(|(word, adjustment)| (word.to_string(), adjustment))
        .collect();

        Self {
            default_base: 10,
            category_base,
            numeric_keys: vec!["agresivita".to_string(), "aggressiveness".to_string()],
            numeric_weight: 2,
            verbal_keys: vec![
                "agresivita_odhad".to_string(),
                "aggressiveness_estimate".to_string(),
            ],
            verbal_adjustments,
        }
    }
}

impl ScoringTable {
    /// Lowercases the verbal table so lookups can be case-insensitive.
    pub fn normalized(mut self) -> Self {
        self.verbal_adjustments = self
            .verbal_adjustments
            .into_iter()
            .map(|(word, adjustment)| (word.trim().to_lowercase(), adjustment))
            .collect();
        self
    }

    pub fn base_score(&self, category: &str) -> i64 {
        self.category_base
            .get(category)
            .copied()
            .unwrap_or(self.default_base)
    }

    /// Computes the threat level of an anomaly.
    ///
    /// Never fails: numeric attributes that do not parse as integers and
    /// unknown verbal estimates contribute nothing.
    pub fn score(&self, category: &str, attributes: &[NewAttribute]) -> ThreatLevel {
        let mut score = i128::from(self.base_score(category));

        for attr in attributes {
            if self.is_numeric_key(&attr.key) {
                let Some(value) = parse_integer(&attr.value) else {
                    continue;
                };
                score = score.saturating_add(i128::from(value).saturating_mul(i128::from(self.numeric_weight)));
            } else if self.is_verbal_key(&attr.key) {
                let adjustment = self
                    .verbal_adjustments
                    .get(&attr.value.to_lowercase())
                    .copied()
                    .unwrap_or(0);
                score = score.saturating_add(i128::from(adjustment));
            }
        }

        ThreatLevel::clamped(score)
    }

    fn is_numeric_key(&self, key: &str) -> bool {
        self.numeric_keys.iter().any(|candidate| candidate == key)
    }

    fn is_verbal_key(&self, key: &str) -> bool {
        self.verbal_keys.iter().any(|candidate| candidate == key)
    }
}

// Out-of-range integers are still integers, so they saturate instead of
// being dropped like non-numeric text.
fn parse_integer(raw: &str) -> Option<i64> {
    match raw.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(err) => match err.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}
