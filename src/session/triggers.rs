//! Trigger evaluation
//!
//! Four independent checks run against the current metrics and thresholds.
//! Each check yields at most one trigger: the first subject that crosses its
//! threshold, in path (or error key) order rather than arrival order.

use super::metrics::SessionMetrics;
use crate::config::{GuardianConfig, SensitivityConfig};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    CodeVolume,
    RepeatedErrors,
    FileChurn,
    RepeatedCorrections,
}

/// Trigger urgency, ordered from least to most urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Medium,
    High,
    Critical,
}

/// A condition that warrants an external review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    #[serde(rename = "trigger")]
    pub kind: TriggerKind,
    pub priority: Priority,
    /// File path or error key the trigger concerns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Observed value (lines, occurrences, edits or corrections)
    pub value: u64,
    pub threshold: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_minutes: Option<u32>,
}

/// Large volume of code written to one file
pub fn check_code_volume(metrics: &SessionMetrics, config: &GuardianConfig) -> Option<Trigger> {
    let threshold = config.sensitivity.lines_threshold;

    metrics
        .code_written
        .iter()
        .filter(|(file, _)| !config.auto_review.never_matches(file))
        .find(|(_, volume)| volume.total_lines >= u64::from(threshold))
        .map(|(file, volume)| Trigger {
            kind: TriggerKind::CodeVolume,
            priority: if config.auto_review.always_matches(file) {
                Priority::High
            } else {
                Priority::Medium
            },
            subject: Some(file.clone()),
            value: volume.total_lines,
            threshold,
            window_minutes: None,
        })
}

/// The same error seen too many times
pub fn check_repeated_errors(
    metrics: &SessionMetrics,
    sensitivity: &SensitivityConfig,
) -> Option<Trigger> {
    let threshold = sensitivity.error_repeat_threshold;

    metrics
        .errors
        .iter()
        .find(|(_, error)| error.count >= u64::from(threshold))
        .map(|(key, error)| Trigger {
            kind: TriggerKind::RepeatedErrors,
            priority: Priority::Critical,
            subject: Some(key.clone()),
            value: error.count,
            threshold,
            window_minutes: None,
        })
}

/// One file edited too often within the churn window
pub fn check_file_churn(
    metrics: &SessionMetrics,
    sensitivity: &SensitivityConfig,
    now: DateTime<Utc>,
) -> Option<Trigger> {
    let threshold = sensitivity.file_churn_threshold;
    let window = sensitivity.churn_window_minutes;
    let cutoff = now - Duration::minutes(i64::from(window));

    metrics
        .file_edits
        .iter()
        .map(|(file, edits)| (file, edits.edits_since(cutoff)))
        .find(|(_, recent)| *recent as u64 >= u64::from(threshold))
        .map(|(file, recent)| Trigger {
            kind: TriggerKind::FileChurn,
            priority: Priority::High,
            subject: Some(file.clone()),
            value: recent as u64,
            threshold,
            window_minutes: Some(window),
        })
}

/// The user corrected the assistant too often within the correction window
pub fn check_repeated_corrections(
    metrics: &SessionMetrics,
    sensitivity: &SensitivityConfig,
    now: DateTime<Utc>,
) -> Option<Trigger> {
    let threshold = sensitivity.correction_threshold;
    let window = sensitivity.correction_window_minutes;
    let cutoff = now - Duration::minutes(i64::from(window));
    let recent = metrics.corrections_since(cutoff) as u64;

    (recent >= u64::from(threshold)).then(|| Trigger {
        kind: TriggerKind::RepeatedCorrections,
        priority: Priority::Critical,
        subject: None,
        value: recent,
        threshold,
        window_minutes: Some(window),
    })
}

/// Run every check, in a fixed order
pub fn evaluate_triggers(
    metrics: &SessionMetrics,
    config: &GuardianConfig,
    now: DateTime<Utc>,
) -> Vec<Trigger> {
    [
        check_code_volume(metrics, config),
        check_repeated_errors(metrics, &config.sensitivity),
        check_file_churn(metrics, &config.sensitivity, now),
        check_repeated_corrections(metrics, &config.sensitivity, now),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// The most urgent trigger; ties go to the earliest
pub fn highest_priority(triggers: &[Trigger]) -> Option<&Trigger> {
    triggers.iter().min_by_key(|t| Reverse(t.priority))
}
