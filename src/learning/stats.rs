//! Acceptance statistics
//!
//! Counts of accepted and rejected suggestions, overall and per category.
//! Rates are always derived from the counts, never trusted from disk.

use crate::storage::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category used when a suggestion does not name one
pub const DEFAULT_CATEGORY: &str = "general";

/// Rate assumed for a category with no recorded feedback
pub const NEUTRAL_RATE: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceCounts {
    pub accepted: u64,
    pub rejected: u64,
    #[serde(default)]
    pub rate: f64,
}

impl AcceptanceCounts {
    pub fn total(&self) -> u64 {
        self.accepted + self.rejected
    }

    pub fn record(&mut self, accepted: bool) {
        if accepted {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        self.rate = match self.total() {
            0 => 0.0,
            total => self.accepted as f64 / total as f64,
        };
    }

    /// Rate, or `None` with no samples
    pub fn observed_rate(&self) -> Option<f64> {
        (self.total() > 0).then_some(self.rate)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceStats {
    #[serde(default)]
    pub overall: AcceptanceCounts,
    #[serde(default)]
    pub by_category: BTreeMap<String, AcceptanceCounts>,
}

impl AcceptanceStats {
    /// Count one piece of feedback toward `category` and overall
    pub fn record(&mut self, category: &str, accepted: bool) {
        self.overall.record(accepted);
        self.by_category
            .entry(category.to_string())
            .or_default()
            .record(accepted);
    }

    /// Acceptance rate for `category`, neutral when unseen
    pub fn rate_for(&self, category: &str) -> f64 {
        self.by_category
            .get(category)
            .and_then(AcceptanceCounts::observed_rate)
            .unwrap_or(NEUTRAL_RATE)
    }
}

impl Record for AcceptanceStats {
    const FILE_NAME: &'static str = "acceptance_stats.json";

    fn normalize(&mut self) {
        self.overall.recompute();
        for counts in self.by_category.values_mut() {
            counts.recompute();
        }
    }
}
