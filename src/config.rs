//! Guardian configuration
//!
//! Stored as `config.toml` inside the `.guardian` directory. Every section is
//! optional in the file; missing fields take their defaults. Threshold values
//! are clamped into their documented bounds whenever a config is loaded or a
//! threshold is changed, so downstream code can trust the numbers it reads.

use crate::error::{GuardianError, Result};
use crate::storage::Record;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Named sensitivity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threshold {
    /// Lines written to a single file before a code-volume review
    Lines,
    /// Occurrences of one error before a repeated-error review
    ErrorRepeat,
    /// Edits to one file within the churn window
    FileChurn,
    /// User corrections within the correction window
    Correction,
}

impl Threshold {
    pub const ALL: [Threshold; 4] = [
        Threshold::Lines,
        Threshold::ErrorRepeat,
        Threshold::FileChurn,
        Threshold::Correction,
    ];

    /// Field name as it appears in `config.toml`
    pub fn key(&self) -> &'static str {
        match self {
            Threshold::Lines => "lines_threshold",
            Threshold::ErrorRepeat => "error_repeat_threshold",
            Threshold::FileChurn => "file_churn_threshold",
            Threshold::Correction => "correction_threshold",
        }
    }

    /// Inclusive (floor, ceiling)
    pub fn bounds(&self) -> (u32, u32) {
        match self {
            Threshold::Lines => (20, 500),
            Threshold::ErrorRepeat => (2, 10),
            Threshold::FileChurn => (3, 15),
            Threshold::Correction => (2, 10),
        }
    }

    pub fn default_value(&self) -> u32 {
        match self {
            Threshold::Lines => 50,
            Threshold::ErrorRepeat => 3,
            Threshold::FileChurn => 5,
            Threshold::Correction => 3,
        }
    }

    pub fn clamp(&self, value: u32) -> u32 {
        let (floor, ceiling) = self.bounds();
        value.clamp(floor, ceiling)
    }
}

impl std::fmt::Display for Threshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Trigger thresholds read by the trigger evaluator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    pub lines_threshold: u32,
    pub error_repeat_threshold: u32,
    pub file_churn_threshold: u32,
    pub correction_threshold: u32,

    /// Trailing window for file churn (minutes)
    pub churn_window_minutes: u32,

    /// Trailing window for repeated corrections (minutes)
    pub correction_window_minutes: u32,

    /// Context usage fraction at which the host should warn
    pub context_warning_percent: f64,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            lines_threshold: Threshold::Lines.default_value(),
            error_repeat_threshold: Threshold::ErrorRepeat.default_value(),
            file_churn_threshold: Threshold::FileChurn.default_value(),
            correction_threshold: Threshold::Correction.default_value(),
            churn_window_minutes: 10,
            correction_window_minutes: 30,
            context_warning_percent: 0.7,
        }
    }
}

impl SensitivityConfig {
    pub fn get(&self, threshold: Threshold) -> u32 {
        match threshold {
            Threshold::Lines => self.lines_threshold,
            Threshold::ErrorRepeat => self.error_repeat_threshold,
            Threshold::FileChurn => self.file_churn_threshold,
            Threshold::Correction => self.correction_threshold,
        }
    }

    /// Set a threshold, clamped into its bounds
    pub fn set(&mut self, threshold: Threshold, value: u32) {
        let value = threshold.clamp(value);
        match threshold {
            Threshold::Lines => self.lines_threshold = value,
            Threshold::ErrorRepeat => self.error_repeat_threshold = value,
            Threshold::FileChurn => self.file_churn_threshold = value,
            Threshold::Correction => self.correction_threshold = value,
        }
    }

    /// Force every field into its valid range
    pub fn clamp(&mut self) {
        for threshold in Threshold::ALL {
            let current = self.get(threshold);
            let clamped = threshold.clamp(current);
            if clamped != current {
                warn!(
                    "{} = {} out of range, clamped to {}",
                    threshold, current, clamped
                );
                self.set(threshold, clamped);
            }
        }

        if self.churn_window_minutes == 0 {
            self.churn_window_minutes = 10;
        }
        if self.correction_window_minutes == 0 {
            self.correction_window_minutes = 30;
        }
        if !(0.0..=1.0).contains(&self.context_warning_percent) {
            self.context_warning_percent = 0.7;
        }
    }
}

/// Path and category keyword lists consulted by the code-volume trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoReviewConfig {
    pub enabled: bool,
    pub always_review: Vec<String>,
    pub never_review: Vec<String>,
}

impl Default for AutoReviewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            always_review: ["auth", "security", "crypto", "payment"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            never_review: ["test", "mock", "fixture"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl AutoReviewConfig {
    /// Path matches an always-review keyword
    pub fn always_matches(&self, path: &str) -> bool {
        self.enabled && contains_any(path, &self.always_review)
    }

    /// Path matches a never-review keyword
    pub fn never_matches(&self, path: &str) -> bool {
        self.enabled && contains_any(path, &self.never_review)
    }
}

fn contains_any(path: &str, keywords: &[String]) -> bool {
    let lower = path.to_lowercase();
    keywords
        .iter()
        .any(|keyword| !keyword.is_empty() && lower.contains(&keyword.to_lowercase()))
}

/// Feedback-driven calibration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningConfig {
    pub acceptance_rate_target: f64,
    pub adjustment_speed: f64,

    /// Rejections older than this are ignored when mining anti-patterns
    pub memory_window_days: u32,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            acceptance_rate_target: 0.7,
            adjustment_speed: 0.1,
            memory_window_days: 30,
        }
    }
}

impl LearningConfig {
    /// Set the target acceptance rate, rejecting values outside [0, 1]
    pub fn set_target(&mut self, target: f64) -> Result<()> {
        self.acceptance_rate_target = validate_unit("target acceptance rate", target)?;
        Ok(())
    }

    /// Set the adjustment speed, rejecting values outside [0, 1]
    pub fn set_speed(&mut self, speed: f64) -> Result<()> {
        self.adjustment_speed = validate_unit("adjustment speed", speed)?;
        Ok(())
    }
}

/// Validate that `value` lies in [0.0, 1.0]
pub fn validate_unit(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(GuardianError::InvalidInput(format!(
            "{} must be between 0.0 and 1.0, got {}",
            name, value
        )))
    }
}

/// Top-level Guardian configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    /// Master switch; when false, event commands record nothing
    pub enabled: bool,
    pub sensitivity: SensitivityConfig,
    pub auto_review: AutoReviewConfig,
    pub learning: LearningConfig,

    /// Model the host uses for review subagents
    pub model: String,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sensitivity: SensitivityConfig::default(),
            auto_review: AutoReviewConfig::default(),
            learning: LearningConfig::default(),
            model: "haiku".to_string(),
        }
    }
}

impl GuardianConfig {
    /// Parse configuration from a TOML string and normalize it
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let mut config: GuardianConfig = toml::from_str(toml_str)?;
        config.normalize();
        Ok(config)
    }

    /// Render configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Bring every field back into range
    ///
    /// Out-of-range learning parameters fall back to their defaults rather
    /// than failing, matching the policy for corrupt state.
    pub fn normalize(&mut self) {
        self.sensitivity.clamp();

        let defaults = LearningConfig::default();
        if validate_unit("target", self.learning.acceptance_rate_target).is_err() {
            warn!(
                "acceptance_rate_target {} invalid, using {}",
                self.learning.acceptance_rate_target, defaults.acceptance_rate_target
            );
            self.learning.acceptance_rate_target = defaults.acceptance_rate_target;
        }
        if validate_unit("speed", self.learning.adjustment_speed).is_err() {
            warn!(
                "adjustment_speed {} invalid, using {}",
                self.learning.adjustment_speed, defaults.adjustment_speed
            );
            self.learning.adjustment_speed = defaults.adjustment_speed;
        }
    }
}

impl Record for GuardianConfig {
    const FILE_NAME: &'static str = "config.toml";

    fn encode(&self) -> Result<String> {
        self.to_toml()
    }

    fn decode(raw: &str) -> Result<Self> {
        Self::from_toml(raw)
    }

    fn normalize(&mut self) {
        GuardianConfig::normalize(self);
    }
}
