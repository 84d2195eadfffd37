//! Rejection history and mining
//!
//! The history is a bounded list of rejected suggestions, oldest first. It
//! serves two purposes: the validator flags new suggestions that closely
//! resemble a past rejection, and the calibrator mines it for categories the
//! user keeps rejecting.

use crate::storage::Record;
use crate::utils::string::{jaccard_similarity, word_set};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Rejections kept in history
pub const MAX_REJECTIONS: usize = 100;

/// Minimum word-set similarity for a suggestion to count as a repeat
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Rejections of one category needed before it can be an anti-pattern
pub const ANTI_PATTERN_MIN_COUNT: u64 = 5;

/// Share of the window's rejections needed for an anti-pattern
pub const ANTI_PATTERN_MIN_SHARE: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub suggestion: String,
    pub reason: String,
    pub category: String,
    pub timestamp: DateTime<Utc>,
}

/// Closest prior rejection for a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectionMatch {
    pub suggestion: String,
    pub reason: String,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    pub similarity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RejectionHistory {
    entries: VecDeque<Rejection>,
}

impl RejectionHistory {
    pub fn entries(&self) -> impl Iterator<Item = &Rejection> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append, evicting the oldest past the cap
    pub fn push(&mut self, rejection: Rejection) {
        self.entries.push_back(rejection);
        while self.entries.len() > MAX_REJECTIONS {
            self.entries.pop_front();
        }
    }

    pub fn record(&mut self, suggestion: &str, reason: &str, category: &str, at: DateTime<Utc>) {
        self.push(Rejection {
            suggestion: suggestion.to_string(),
            reason: reason.to_string(),
            category: category.to_string(),
            timestamp: at,
        });
    }

    /// Most similar past rejection at or above the similarity threshold
    ///
    /// On equal similarity the most recent rejection wins.
    pub fn best_match(&self, text: &str) -> Option<RejectionMatch> {
        let words = word_set(text);
        let mut best: Option<(&Rejection, f64)> = None;

        for rejection in self.entries.iter().rev() {
            let similarity = jaccard_similarity(&words, &word_set(&rejection.suggestion));
            if similarity < SIMILARITY_THRESHOLD {
                continue;
            }
            if best.map_or(true, |(_, s)| similarity > s) {
                best = Some((rejection, similarity));
            }
        }

        best.map(|(rejection, similarity)| RejectionMatch {
            suggestion: rejection.suggestion.clone(),
            reason: rejection.reason.clone(),
            category: rejection.category.clone(),
            timestamp: rejection.timestamp,
            similarity,
        })
    }

    /// Rejections no older than `days` before `now`
    pub fn within_window(
        &self,
        now: DateTime<Utc>,
        days: u32,
    ) -> impl Iterator<Item = &Rejection> {
        let cutoff = now - Duration::days(i64::from(days));
        self.entries.iter().filter(move |r| r.timestamp >= cutoff)
    }
}

impl Record for RejectionHistory {
    const FILE_NAME: &'static str = "rejection_history.json";

    fn normalize(&mut self) {
        while self.entries.len() > MAX_REJECTIONS {
            self.entries.pop_front();
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntiPattern {
    pub category: String,
    pub count: u64,
    pub rejection_share: f64,
    pub recommendation: String,
}

/// What the rejection window says about the user's preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RejectionInsights {
    pub total_rejections: usize,
    pub by_reason: BTreeMap<String, u64>,
    pub by_category: BTreeMap<String, u64>,
    pub anti_patterns: Vec<AntiPattern>,
}

impl RejectionInsights {
    pub fn anti_pattern_categories(&self) -> impl Iterator<Item = &str> {
        self.anti_patterns.iter().map(|a| a.category.as_str())
    }
}

/// Group recent rejections and find categories that are always rejected
pub fn mine_rejections(
    history: &RejectionHistory,
    now: DateTime<Utc>,
    window_days: u32,
) -> RejectionInsights {
    let mut insights = RejectionInsights::default();

    for rejection in history.within_window(now, window_days) {
        insights.total_rejections += 1;
        *insights
            .by_reason
            .entry(rejection.reason.clone())
            .or_default() += 1;
        *insights
            .by_category
            .entry(rejection.category.clone())
            .or_default() += 1;
    }

    if insights.total_rejections == 0 {
        return insights;
    }

    let total = insights.total_rejections as f64;
    insights.anti_patterns = insights
        .by_category
        .iter()
        .filter_map(|(category, count)| {
            let share = *count as f64 / total;
            (*count >= ANTI_PATTERN_MIN_COUNT && share >= ANTI_PATTERN_MIN_SHARE).then(|| {
                AntiPattern {
                    category: category.clone(),
                    count: *count,
                    rejection_share: share,
                    recommendation: format!(
                        "Stop suggesting {} - rejection rate {:.0}%",
                        category,
                        share * 100.0
                    ),
                }
            })
        })
        .collect();

    insights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_history_is_capped_oldest_first() {
        let mut history = RejectionHistory::default();
        for i in 0..130 {
            history.record(&format!("suggestion {}", i), "no", "style", t0());
        }

        assert_eq!(history.len(), MAX_REJECTIONS);
        let first = history.entries().next().unwrap();
        assert_eq!(first.suggestion, "suggestion 30");
    }

    #[test]
    fn test_best_match_above_threshold() {
        let mut history = RejectionHistory::default();
        history.record(
            "Add rate limiting to the login endpoint",
            "handled by the gateway",
            "security",
            t0(),
        );

        let hit = history
            .best_match("add rate limiting to login endpoint")
            .unwrap();
        assert!(hit.similarity >= SIMILARITY_THRESHOLD);
        assert_eq!(hit.reason, "handled by the gateway");

        assert!(history.best_match("rename the config struct").is_none());
    }

    #[test]
    fn test_best_match_picks_most_similar() {
        let mut history = RejectionHistory::default();
        history.record("use a connection pool for postgres queries", "a", "perf", t0());
        history.record("use a connection pool for postgres", "b", "perf", t0());

        let hit = history.best_match("use a connection pool for postgres").unwrap();
        assert_eq!(hit.reason, "b");
        assert!((hit.similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let mut history = RejectionHistory::default();
        history.record("x", "y", "z", t0());
        let json = history.encode().unwrap();
        assert!(json.trim_start().starts_with('['));
        assert_eq!(RejectionHistory::decode(&json).unwrap(), history);
    }

    #[test]
    fn test_mining_finds_dominant_category() {
        let mut history = RejectionHistory::default();
        for _ in 0..5 {
            history.record("add docstrings", "noise", "documentation", t0());
        }
        history.record("inline this", "prefer clarity", "style", t0());

        // 5 of 6 is 0.83
        let insights = mine_rejections(&history, t0(), 30);
        assert_eq!(insights.total_rejections, 6);
        assert_eq!(insights.by_reason["noise"], 5);
        assert_eq!(insights.by_category["style"], 1);
        assert_eq!(insights.anti_patterns.len(), 1);
        assert_eq!(insights.anti_patterns[0].category, "documentation");
        assert_eq!(
            insights.anti_patterns[0].recommendation,
            "Stop suggesting documentation - rejection rate 83%"
        );
    }

    #[test]
    fn test_mining_needs_minimum_count_and_share() {
        let mut history = RejectionHistory::default();
        for _ in 0..4 {
            history.record("a", "r", "style", t0());
        }
        assert!(mine_rejections(&history, t0(), 30).anti_patterns.is_empty());

        for _ in 0..3 {
            history.record("b", "r", "security", t0());
        }
        history.record("a", "r", "style", t0());
        // style is 5 of 8
        assert!(mine_rejections(&history, t0(), 30).anti_patterns.is_empty());
    }

    #[test]
    fn test_mining_ignores_rejections_outside_window() {
        let mut history = RejectionHistory::default();
        for _ in 0..6 {
            history.record("a", "r", "style", t0());
        }

        let later = t0() + Duration::days(45);
        let insights = mine_rejections(&history, later, 30);
        assert_eq!(insights.total_rejections, 0);
        assert!(insights.anti_patterns.is_empty());
    }
}
