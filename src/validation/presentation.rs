//! Text rendering of validated suggestions for the user

use super::validator::{Severity, ValidationResult};
use serde::{Deserialize, Serialize};

/// Display band for a confidence value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceBand {
    Confident,
    Tentative,
    Low,
}

impl ConfidenceBand {
    pub fn of(confidence: f64) -> Self {
        if confidence >= 0.7 {
            ConfidenceBand::Confident
        } else if confidence >= 0.5 {
            ConfidenceBand::Tentative
        } else {
            ConfidenceBand::Low
        }
    }

    fn marker(&self) -> &'static str {
        match self {
            ConfidenceBand::Confident => "",
            ConfidenceBand::Tentative => "?",
            ConfidenceBand::Low => "!",
        }
    }
}

/// `[0.85]`, `?[0.60]` or `![0.40]`
pub fn confidence_indicator(confidence: f64) -> String {
    format!("{}[{:.2}]", ConfidenceBand::of(confidence).marker(), confidence)
}

const OPTIONS: [&str; 6] = [
    "  a - Accept all high-confidence suggestions (>=0.7)",
    "  1,3,5 - Accept specific suggestions by number",
    "  r - Reject all with reason",
    "  i <reason> - Reject and add to anti-patterns",
    "  d <num> - Discuss specific suggestion",
    "  q - Dismiss review",
];

/// Numbered list of presentable suggestions followed by the reply options
pub fn render_for_user(results: &[ValidationResult]) -> String {
    let presentable: Vec<&ValidationResult> = results.iter().filter(|r| r.should_present).collect();

    if presentable.is_empty() {
        return "Guardian: No suggestions to present (all filtered by validation)".to_string();
    }

    let mut lines = vec![
        format!("Guardian Review Found {} Suggestions:", presentable.len()),
        String::new(),
    ];

    for (i, result) in presentable.iter().enumerate() {
        lines.push(format!(
            "{}. {} {}",
            i + 1,
            confidence_indicator(result.confidence),
            result.suggestion
        ));
        lines.push(format!("   Category: {}", result.category));

        for warning in &result.warnings {
            match warning.severity {
                Severity::High => lines.push(format!("   WARNING: {}", warning.message)),
                Severity::Medium => lines.push(format!("   Note: {}", warning.message)),
            }
        }
        for note in &result.notes {
            lines.push(format!("   {}", note));
        }
        lines.push(String::new());
    }

    lines.push("Options:".to_string());
    lines.extend(OPTIONS.iter().map(|o| o.to_string()));
    lines.join("\n")
}
