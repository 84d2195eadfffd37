//! Learning from user feedback
//!
//! Acceptance statistics and rejection history feed a controller that moves
//! sensitivity thresholds toward a target acceptance rate and grows the
//! auto-review keyword lists.

pub mod controller;
pub mod ledger;
pub mod rejections;
pub mod stats;

pub use controller::{
    adjust_threshold, calculate_adjustments, update_auto_review, AutoReviewChanges, Direction,
    ThresholdAdjustment,
};
pub use ledger::{calibrate, CalibrationReport, FeedbackLedger, LearningStatistics};
pub use rejections::{
    mine_rejections, AntiPattern, Rejection, RejectionHistory, RejectionInsights, RejectionMatch,
};
pub use stats::{AcceptanceCounts, AcceptanceStats, DEFAULT_CATEGORY};
