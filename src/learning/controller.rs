//! Threshold controller
//!
//! Nudges each sensitivity threshold toward the target acceptance rate. A
//! low acceptance rate means Guardian is interrupting too often, so the
//! threshold goes up; a high rate means it could speak up sooner, so the
//! threshold comes down. Inside the ±0.1 dead band nothing moves.

use super::rejections::RejectionInsights;
use super::stats::AcceptanceStats;
use crate::config::{AutoReviewConfig, LearningConfig, SensitivityConfig, Threshold};
use serde::{Deserialize, Serialize};

/// Half-width of the band around the target where thresholds hold still
pub const DEAD_BAND: f64 = 0.1;

/// Minimum step for the lines threshold
pub const MIN_LINES_STEP: u32 = 5;

/// Samples a category needs before it can join an auto-review list
pub const AUTO_REVIEW_MIN_SAMPLES: u64 = 10;

pub const ALWAYS_REVIEW_RATE: f64 = 0.9;
pub const NEVER_REVIEW_RATE: f64 = 0.2;

/// Feedback category that governs `threshold`, or `None` for the overall rate
pub fn governing_category(threshold: Threshold) -> Option<&'static str> {
    match threshold {
        Threshold::Lines => None,
        Threshold::ErrorRepeat => Some("error_analysis"),
        Threshold::FileChurn => Some("file_churn"),
        Threshold::Correction => Some("corrections"),
    }
}

/// Rate of the governing signal
///
/// The overall rate is 0 before any feedback; a category nobody has rated
/// counts as neutral.
pub fn governing_rate(threshold: Threshold, stats: &AcceptanceStats) -> f64 {
    match governing_category(threshold) {
        None => stats.overall.rate,
        Some(category) => stats.rate_for(category),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Raised,
    Lowered,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdAdjustment {
    pub threshold: Threshold,
    pub before: u32,
    pub after: u32,
    pub rate: f64,
    pub direction: Direction,
}

fn step_for(threshold: Threshold, current: u32, speed: f64) -> u32 {
    match threshold {
        Threshold::Lines => {
            let scaled = (f64::from(current) * speed).round() as u32;
            scaled.max(MIN_LINES_STEP)
        }
        _ => 1,
    }
}

/// Adjustment for one threshold given its governing rate
pub fn adjust_threshold(
    threshold: Threshold,
    current: u32,
    rate: f64,
    learning: &LearningConfig,
) -> ThresholdAdjustment {
    let (floor, ceiling) = threshold.bounds();
    let target = learning.acceptance_rate_target;

    let after = if rate < target - DEAD_BAND {
        let step = step_for(threshold, current, learning.adjustment_speed);
        current.saturating_add(step).min(ceiling)
    } else if rate > target + DEAD_BAND {
        let step = step_for(threshold, current, learning.adjustment_speed);
        current.saturating_sub(step).max(floor)
    } else {
        current
    };

    let direction = match after.cmp(&current) {
        std::cmp::Ordering::Greater => Direction::Raised,
        std::cmp::Ordering::Less => Direction::Lowered,
        std::cmp::Ordering::Equal => Direction::Unchanged,
    };

    ThresholdAdjustment {
        threshold,
        before: current,
        after,
        rate,
        direction,
    }
}

/// Adjustments for every threshold, in a fixed order
pub fn calculate_adjustments(
    sensitivity: &SensitivityConfig,
    stats: &AcceptanceStats,
    learning: &LearningConfig,
) -> Vec<ThresholdAdjustment> {
    Threshold::ALL
        .iter()
        .map(|&threshold| {
            adjust_threshold(
                threshold,
                sensitivity.get(threshold),
                governing_rate(threshold, stats),
                learning,
            )
        })
        .collect()
}

/// Write adjustments into `sensitivity`
pub fn apply_adjustments(sensitivity: &mut SensitivityConfig, adjustments: &[ThresholdAdjustment]) {
    for adjustment in adjustments {
        sensitivity.set(adjustment.threshold, adjustment.after);
    }
}

/// Categories added to the auto-review lists by one calibration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutoReviewChanges {
    pub always_review: Vec<String>,
    pub never_review: Vec<String>,
}

impl AutoReviewChanges {
    pub fn is_empty(&self) -> bool {
        self.always_review.is_empty() && self.never_review.is_empty()
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) -> bool {
    if list.iter().any(|existing| existing == value) {
        false
    } else {
        list.push(value.to_string());
        true
    }
}

/// Extend the auto-review lists from feedback and mined anti-patterns
///
/// Lists stay deduplicated and keep insertion order. Returns what was added.
pub fn update_auto_review(
    auto_review: &mut AutoReviewConfig,
    stats: &AcceptanceStats,
    insights: &RejectionInsights,
) -> AutoReviewChanges {
    let mut changes = AutoReviewChanges::default();

    for (category, counts) in &stats.by_category {
        if counts.total() <= AUTO_REVIEW_MIN_SAMPLES {
            continue;
        }
        if counts.rate > ALWAYS_REVIEW_RATE {
            if push_unique(&mut auto_review.always_review, category) {
                changes.always_review.push(category.clone());
            }
        } else if counts.rate < NEVER_REVIEW_RATE
            && push_unique(&mut auto_review.never_review, category)
        {
            changes.never_review.push(category.clone());
        }
    }

    for category in insights.anti_pattern_categories() {
        if push_unique(&mut auto_review.never_review, category) {
            changes.never_review.push(category.to_string());
        }
    }

    changes
}
