//! Suggestion validation
//!
//! Scores a reviewer's suggestion before the user sees it. Three lexical
//! checks can raise warnings: a contradiction with a high-priority pattern,
//! overlap with a known gotcha, and similarity to a suggestion the user
//! already rejected. The result is blended with the category's historical
//! acceptance rate and gated on a minimum confidence.

use super::knowledge::{KnowledgeCategory, KnowledgeEntry, KnowledgePriority, KnowledgeSource};
use crate::learning::stats::{AcceptanceStats, DEFAULT_CATEGORY};
use crate::learning::RejectionHistory;
use crate::storage::StateStore;
use crate::utils::string::{word_set, words};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

pub const CONTRADICTION_CONFIDENCE: f64 = 0.8;
pub const GOTCHA_CONFIDENCE: f64 = 0.6;
pub const REJECTION_CONFIDENCE: f64 = 0.3;

/// Share of the blended score taken from warnings
pub const WARNING_WEIGHT: f64 = 0.6;
/// Share of the blended score taken from the acceptance rate
pub const ACCEPTANCE_WEIGHT: f64 = 0.4;

/// Below this a suggestion is never shown
pub const PRESENT_THRESHOLD: f64 = 0.3;

/// Words in pattern content that mark a prohibition
const PROHIBITION_CUES: [&str; 3] = ["never", "don't", "avoid"];

/// Shared gotcha words needed to raise a warning (strictly more than this)
const GOTCHA_MIN_SHARED: usize = 3;

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// One suggestion as produced by a reviewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub text: String,
    #[serde(default = "default_category")]
    pub category: String,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    PatternContradiction,
    GotchaWarning,
    PreviouslyRejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub severity: Severity,
    pub message: String,
    /// Confidence this warning pulls the suggestion toward
    pub confidence: f64,
    /// Knowledge entry title or rejected suggestion that caused the warning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub suggestion: String,
    pub category: String,
    pub confidence: f64,
    pub warnings: Vec<ValidationWarning>,
    pub notes: Vec<String>,
    pub should_present: bool,
}

impl ValidationResult {
    pub fn has_high_severity(&self) -> bool {
        self.warnings.iter().any(|w| w.severity == Severity::High)
    }
}

/// Validates suggestions against knowledge, history and acceptance stats
#[derive(Debug, Clone, Default)]
pub struct SuggestionValidator {
    knowledge: Vec<KnowledgeEntry>,
    history: RejectionHistory,
    stats: AcceptanceStats,
}

impl SuggestionValidator {
    pub fn new(
        knowledge: Vec<KnowledgeEntry>,
        history: RejectionHistory,
        stats: AcceptanceStats,
    ) -> Self {
        Self {
            knowledge,
            history,
            stats,
        }
    }

    /// Load history and stats from `store` and knowledge from `source`
    pub fn load(source: &dyn KnowledgeSource, store: Option<&StateStore>) -> Self {
        let (history, stats): (RejectionHistory, AcceptanceStats) = match store {
            Some(store) => (store.load(), store.load()),
            None => Default::default(),
        };
        Self::new(source.load_entries(), history, stats)
    }

    pub fn validate(&self, text: &str, category: &str) -> ValidationResult {
        let suggestion_words = word_set(text);
        let mut warnings = Vec::new();
        let mut notes = Vec::new();
        let mut blocked = false;

        if let Some(pattern) = self.contradicted_pattern(&suggestion_words) {
            warnings.push(ValidationWarning {
                kind: WarningKind::PatternContradiction,
                severity: Severity::High,
                message: format!("Contradicts Oracle pattern: {}", pattern.title),
                confidence: CONTRADICTION_CONFIDENCE,
                source: Some(pattern.title.clone()),
                similarity: None,
            });
            if pattern.priority == KnowledgePriority::Critical {
                blocked = true;
                notes.push("BLOCKED: Contradicts critical Oracle pattern".to_string());
            }
        }

        if let Some(gotcha) = self.related_gotcha(&suggestion_words) {
            warnings.push(ValidationWarning {
                kind: WarningKind::GotchaWarning,
                severity: Severity::Medium,
                message: format!("Related to known gotcha: {}", gotcha.title),
                confidence: GOTCHA_CONFIDENCE,
                source: Some(gotcha.title.clone()),
                similarity: None,
            });
        }

        if let Some(rejection) = self.history.best_match(text) {
            warnings.push(ValidationWarning {
                kind: WarningKind::PreviouslyRejected,
                severity: Severity::Medium,
                message: format!(
                    "Similar suggestion rejected before ({:.0}% similar)",
                    rejection.similarity * 100.0
                ),
                confidence: REJECTION_CONFIDENCE,
                source: Some(rejection.suggestion.clone()),
                similarity: Some(rejection.similarity),
            });
            notes.push(format!("Previous rejection reason: {}", rejection.reason));
        }

        let acceptance_rate = self.stats.rate_for(category);
        let warning_confidence = warnings
            .iter()
            .map(|w| w.confidence)
            .reduce(f64::min);

        let confidence = match warning_confidence {
            None => acceptance_rate,
            // Blocked suggestions are not blended
            Some(c) if blocked => c,
            Some(c) => WARNING_WEIGHT * c + ACCEPTANCE_WEIGHT * acceptance_rate,
        }
        .clamp(0.0, 1.0);

        notes.push(format!(
            "Historical acceptance rate for {}: {:.0}%",
            category,
            acceptance_rate * 100.0
        ));

        let mut should_present = !blocked;
        if confidence < PRESENT_THRESHOLD {
            should_present = false;
            notes.push("Confidence too low - suggestion blocked".to_string());
        }

        debug!(
            "Validated '{}' ({}): confidence {:.2}, {} warning(s), present={}",
            text,
            category,
            confidence,
            warnings.len(),
            should_present
        );

        ValidationResult {
            suggestion: text.to_string(),
            category: category.to_string(),
            confidence,
            warnings,
            notes,
            should_present,
        }
    }

    pub fn validate_batch(&self, suggestions: &[Suggestion]) -> Vec<ValidationResult> {
        suggestions
            .iter()
            .map(|s| self.validate(&s.text, &s.category))
            .collect()
    }

    /// First high or critical pattern that prohibits something the
    /// suggestion mentions
    fn contradicted_pattern(&self, suggestion_words: &HashSet<String>) -> Option<&KnowledgeEntry> {
        let significant: Vec<&String> = suggestion_words
            .iter()
            .filter(|w| w.chars().count() > 3)
            .collect();
        if significant.is_empty() {
            return None;
        }

        self.knowledge.iter().find(|entry| {
            if entry.category != KnowledgeCategory::Pattern
                || entry.priority < KnowledgePriority::High
            {
                return false;
            }

            let content = entry.content.to_lowercase();
            if !PROHIBITION_CUES.iter().any(|cue| content.contains(cue)) {
                return false;
            }

            let content_words: HashSet<String> = words(&content).into_iter().collect();
            significant.iter().any(|w| content_words.contains(*w))
        })
    }

    /// First gotcha sharing more than three words with the suggestion
    fn related_gotcha(&self, suggestion_words: &HashSet<String>) -> Option<&KnowledgeEntry> {
        self.knowledge
            .iter()
            .filter(|entry| entry.category == KnowledgeCategory::Gotcha)
            .find(|entry| {
                let content_words = word_set(&entry.content);
                suggestion_words.intersection(&content_words).count() > GOTCHA_MIN_SHARED
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn md5_pattern(priority: KnowledgePriority) -> KnowledgeEntry {
        KnowledgeEntry::new(
            KnowledgeCategory::Pattern,
            priority,
            "Password hashing",
            "Never use MD5 for password hashing, use bcrypt or argon2",
        )
    }

    #[test]
    fn test_no_warnings_uses_acceptance_rate() {
        let validator = SuggestionValidator::default();
        let result = validator.validate("Extract the retry loop into a helper", "refactoring");

        assert_eq!(result.confidence, 0.5);
        assert!(result.warnings.is_empty());
        assert!(result.should_present);
        assert_eq!(
            result.notes,
            vec!["Historical acceptance rate for refactoring: 50%"]
        );
    }

    #[test]
    fn test_critical_contradiction_blocks() {
        let validator = SuggestionValidator::new(
            vec![md5_pattern(KnowledgePriority::Critical)],
            RejectionHistory::default(),
            AcceptanceStats::default(),
        );
        let result = validator.validate("Use MD5 for password hashing", "security");

        assert_eq!(result.confidence, 0.8);
        assert!(!result.should_present);
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::PatternContradiction);
        assert_eq!(result.warnings[0].severity, Severity::High);
        assert!(result
            .notes
            .contains(&"BLOCKED: Contradicts critical Oracle pattern".to_string()));
    }

    #[test]
    fn test_high_contradiction_blends_without_blocking() {
        let validator = SuggestionValidator::new(
            vec![md5_pattern(KnowledgePriority::High)],
            RejectionHistory::default(),
            AcceptanceStats::default(),
        );
        let result = validator.validate("Use MD5 for password hashing", "security");

        // 0.6 * 0.8 + 0.4 * 0.5
        assert!((result.confidence - 0.68).abs() < 1e-9);
        assert!(result.should_present);
        assert!(result.has_high_severity());
    }

    #[test]
    fn test_medium_patterns_and_plain_statements_are_ignored() {
        let validator = SuggestionValidator::new(
            vec![
                md5_pattern(KnowledgePriority::Medium),
                KnowledgeEntry::new(
                    KnowledgeCategory::Pattern,
                    KnowledgePriority::Critical,
                    "Hashing",
                    "Use argon2 for password hashing",
                ),
            ],
            RejectionHistory::default(),
            AcceptanceStats::default(),
        );
        let result = validator.validate("Use MD5 for password hashing", "security");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_gotcha_overlap_warns() {
        let gotcha = KnowledgeEntry::new(
            KnowledgeCategory::Gotcha,
            KnowledgePriority::High,
            "Blocking in async",
            "Calling blocking file reads inside an async handler stalls the runtime",
        );
        let validator = SuggestionValidator::new(
            vec![gotcha],
            RejectionHistory::default(),
            AcceptanceStats::default(),
        );

        let result = validator.validate(
            "Use blocking file reads inside the async handler",
            "performance",
        );
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].kind, WarningKind::GotchaWarning);
        // 0.6 * 0.6 + 0.4 * 0.5
        assert!((result.confidence - 0.56).abs() < 1e-9);
        assert!(result.should_present);
    }

    #[test]
    fn test_previous_rejection_lowers_confidence_and_surfaces_reason() {
        let mut history = RejectionHistory::default();
        history.record(
            "Add caching to the user lookup",
            "lookups are already cheap",
            "performance",
            Utc::now(),
        );
        let validator =
            SuggestionValidator::new(Vec::new(), history, AcceptanceStats::default());

        let result = validator.validate("Add caching to user lookup", "performance");
        // 0.6 * 0.3 + 0.4 * 0.5
        assert!((result.confidence - 0.38).abs() < 1e-9);
        assert!(result.should_present);
        assert_eq!(result.warnings[0].kind, WarningKind::PreviouslyRejected);
        assert!(result
            .notes
            .contains(&"Previous rejection reason: lookups are already cheap".to_string()));
    }

    #[test]
    fn test_low_confidence_is_gated() {
        let mut stats = AcceptanceStats::default();
        for _ in 0..5 {
            stats.record("style", false);
        }
        let mut history = RejectionHistory::default();
        history.record("Rename variables to snake case", "no", "style", Utc::now());
        let validator = SuggestionValidator::new(Vec::new(), history, stats);

        // 0.6 * 0.3 + 0.4 * 0.0
        let result = validator.validate("Rename variables to snake case", "style");
        assert!((result.confidence - 0.18).abs() < 1e-9);
        assert!(!result.should_present);
        assert_eq!(
            result.notes.last().unwrap(),
            "Confidence too low - suggestion blocked"
        );
    }

    #[test]
    fn test_batch_defaults_category() {
        let suggestions: Vec<Suggestion> =
            serde_json::from_str(r#"[{"text": "a"}, {"text": "b", "category": "security"}]"#)
                .unwrap();
        let results = SuggestionValidator::default().validate_batch(&suggestions);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].category, "general");
        assert_eq!(results[1].category, "security");
    }

    proptest! {
        #[test]
        fn prop_confidence_in_unit_interval(
            text in "[a-z ]{0,60}",
            accepted in 0u32..20,
            rejected in 0u32..20,
            rejected_text in "[a-z ]{0,60}",
        ) {
            let mut stats = AcceptanceStats::default();
            for _ in 0..accepted {
                stats.record("c", true);
            }
            for _ in 0..rejected {
                stats.record("c", false);
            }
            let mut history = RejectionHistory::default();
            history.record(&rejected_text, "r", "c", Utc::now());
            let validator = SuggestionValidator::new(
                vec![md5_pattern(KnowledgePriority::Critical)],
                history,
                stats,
            );

            let result = validator.validate(&text, "c");
            prop_assert!((0.0..=1.0).contains(&result.confidence));
            if result.confidence < PRESENT_THRESHOLD {
                prop_assert!(!result.should_present);
            }
        }
    }
}
