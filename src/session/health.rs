//! Session health score
//!
//! Starts at 100 and subtracts a fixed penalty for each unhealthy signal.
//! Each penalty applies at most once and carries a recommendation. When
//! several files or errors qualify, the one first in path or key order is
//! named.

use super::metrics::SessionMetrics;
use crate::utils::string::truncate_at_char_boundary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const ERROR_RATE_LIMIT: f64 = 0.5;
const ERROR_RATE_PENALTY: u32 = 20;
const CORRECTION_RATE_LIMIT: f64 = 0.1;
const CORRECTION_RATE_PENALTY: u32 = 15;
const CHURN_EDIT_LIMIT: u64 = 5;
const CHURN_PENALTY: u32 = 10;
const REPEATED_ERROR_COUNT: u64 = 3;
const REPEATED_ERROR_PENALTY: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => HealthStatus::Healthy,
            50..=79 => HealthStatus::Degraded,
            _ => HealthStatus::Critical,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub score: u32,
    pub status: HealthStatus,
    pub session_duration_minutes: u64,
    pub total_errors: u64,
    pub total_corrections: u64,
    pub total_lines_written: u64,
    pub files_tracked: usize,
    pub recommendations: Vec<String>,
}

/// Score the session as of `now`
pub fn session_health(metrics: &SessionMetrics, now: DateTime<Utc>) -> HealthReport {
    // Rates are per minute with a one minute floor
    let elapsed = (now - metrics.session_start).num_seconds().max(0) as f64 / 60.0;
    let duration = elapsed.max(1.0);

    let total_errors = metrics.total_errors();
    let total_corrections = metrics.corrections.len() as u64;

    let mut score: u32 = 100;
    let mut recommendations = Vec::new();

    if total_errors as f64 / duration > ERROR_RATE_LIMIT {
        score = score.saturating_sub(ERROR_RATE_PENALTY);
        recommendations
            .push("High error rate - consider taking a break or reassessing the approach".to_string());
    }

    if total_corrections as f64 / duration > CORRECTION_RATE_LIMIT {
        score = score.saturating_sub(CORRECTION_RATE_PENALTY);
        recommendations.push("Frequent corrections - the session may be going off track".to_string());
    }

    if let Some((file, _)) = metrics
        .file_edits
        .iter()
        .find(|(_, edits)| edits.count > CHURN_EDIT_LIMIT)
    {
        score = score.saturating_sub(CHURN_PENALTY);
        recommendations.push(format!(
            "High churn on {} - consider stepping away from this file",
            file
        ));
    }

    if let Some((key, _)) = metrics
        .errors
        .iter()
        .find(|(_, error)| error.count >= REPEATED_ERROR_COUNT)
    {
        score = score.saturating_sub(REPEATED_ERROR_PENALTY);
        recommendations.push(format!(
            "Repeated error: {} - the approach may be fundamentally wrong",
            truncate_at_char_boundary(key, 50)
        ));
    }

    HealthReport {
        score,
        status: HealthStatus::from_score(score),
        session_duration_minutes: duration as u64,
        total_errors,
        total_corrections,
        total_lines_written: metrics.total_lines_written(),
        files_tracked: metrics.code_written.len(),
        recommendations,
    }
}
