//! Persisted feedback operations
//!
//! Ties the learning records to the state directory: recording feedback,
//! running a calibration and reporting statistics.

use super::controller::{
    apply_adjustments, calculate_adjustments, update_auto_review, AutoReviewChanges,
    ThresholdAdjustment,
};
use super::rejections::{mine_rejections, RejectionHistory, RejectionInsights, RejectionMatch};
use super::stats::{AcceptanceCounts, AcceptanceStats};
use crate::config::{AutoReviewConfig, GuardianConfig, Threshold};
use crate::error::Result;
use crate::storage::StateStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Outcome of one calibration pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReport {
    pub current_acceptance_rate: f64,
    pub target_acceptance_rate: f64,
    pub threshold_adjustments: Vec<ThresholdAdjustment>,
    pub auto_review_updates: AutoReviewChanges,
    pub insights: RejectionInsights,
    pub applied: bool,
}

/// Snapshot of everything the learner knows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningStatistics {
    pub overall: AcceptanceCounts,
    pub by_category: BTreeMap<String, AcceptanceCounts>,
    pub current_thresholds: BTreeMap<String, u32>,
    pub target_acceptance_rate: f64,
    pub adjustment_speed: f64,
    pub recent_rejections: usize,
    pub memory_window_days: u32,
    pub auto_review: AutoReviewConfig,
}

/// Run the controller over `config` in place
pub fn calibrate(
    config: &mut GuardianConfig,
    stats: &AcceptanceStats,
    history: &RejectionHistory,
    now: DateTime<Utc>,
) -> CalibrationReport {
    let insights = mine_rejections(history, now, config.learning.memory_window_days);
    let adjustments = calculate_adjustments(&config.sensitivity, stats, &config.learning);
    apply_adjustments(&mut config.sensitivity, &adjustments);
    let changes = update_auto_review(&mut config.auto_review, stats, &insights);

    CalibrationReport {
        current_acceptance_rate: stats.overall.rate,
        target_acceptance_rate: config.learning.acceptance_rate_target,
        threshold_adjustments: adjustments,
        auto_review_updates: changes,
        insights,
        applied: false,
    }
}

/// Feedback records in one state directory
#[derive(Debug, Clone)]
pub struct FeedbackLedger {
    store: StateStore,
}

impl FeedbackLedger {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Count an accept or reject toward `category` and overall
    pub fn record_feedback(&self, category: &str, accepted: bool) -> Result<AcceptanceStats> {
        let stats = self.store.update(|stats: &mut AcceptanceStats| {
            stats.record(category, accepted);
            stats.clone()
        })?;
        debug!(
            "Recorded {} for {}, overall rate {:.2}",
            if accepted { "accept" } else { "reject" },
            category,
            stats.overall.rate
        );
        Ok(stats)
    }

    /// Remember a rejected suggestion; returns the history length
    pub fn record_rejection(
        &self,
        suggestion: &str,
        reason: &str,
        category: &str,
        at: DateTime<Utc>,
    ) -> Result<usize> {
        self.store.update(|history: &mut RejectionHistory| {
            history.record(suggestion, reason, category, at);
            history.len()
        })
    }

    /// Closest past rejection for `text`, without validating it
    pub fn check_rejection(&self, text: &str) -> Option<RejectionMatch> {
        self.store.load::<RejectionHistory>().best_match(text)
    }

    /// Compute a calibration and, unless `dry_run`, persist it
    pub fn calibrate(&self, dry_run: bool, now: DateTime<Utc>) -> Result<CalibrationReport> {
        let stats = self.store.load::<AcceptanceStats>();
        let history = self.store.load::<RejectionHistory>();

        if dry_run {
            let mut config = self.store.load::<GuardianConfig>();
            return Ok(calibrate(&mut config, &stats, &history, now));
        }

        let mut report = self
            .store
            .update(|config: &mut GuardianConfig| calibrate(config, &stats, &history, now))?;
        report.applied = true;

        info!(
            "Calibration applied: {} threshold(s) changed, {} auto-review addition(s)",
            report
                .threshold_adjustments
                .iter()
                .filter(|a| a.before != a.after)
                .count(),
            report.auto_review_updates.always_review.len()
                + report.auto_review_updates.never_review.len()
        );
        Ok(report)
    }

    pub fn statistics(&self, now: DateTime<Utc>) -> LearningStatistics {
        let stats = self.store.load::<AcceptanceStats>();
        let history = self.store.load::<RejectionHistory>();
        let config = self.store.load::<GuardianConfig>();
        let window = config.learning.memory_window_days;

        LearningStatistics {
            overall: stats.overall,
            by_category: stats.by_category,
            current_thresholds: Threshold::ALL
                .iter()
                .map(|t| (t.key().to_string(), config.sensitivity.get(*t)))
                .collect(),
            target_acceptance_rate: config.learning.acceptance_rate_target,
            adjustment_speed: config.learning.adjustment_speed,
            recent_rejections: history.within_window(now, window).count(),
            memory_window_days: window,
            auto_review: config.auto_review,
        }
    }
}
