//! Suggestion validation against an on-disk knowledge base and feedback history

mod common;

use common::{create_test_store, t0, write_knowledge};
use guardian_core::learning::FeedbackLedger;
use guardian_core::validation::{
    render_for_user, NoKnowledge, Suggestion, SuggestionValidator, WarningKind,
};
use guardian_core::FileKnowledgeBase;
use tempfile::TempDir;

const PATTERNS: &str = r#"[
    {
        "priority": "critical",
        "title": "Password storage",
        "content": "Never use MD5 for password hashing. Use argon2 or bcrypt.",
        "tags": ["security"],
        "created": "2026-01-10T09:00:00Z"
    },
    {
        "priority": "low",
        "title": "Logging",
        "content": "Avoid println in library code",
        "tags": []
    }
]"#;

const GOTCHAS: &str = r#"[
    {
        "priority": "high",
        "title": "SQLite busy timeouts",
        "content": "Concurrent writers to the sqlite database hit busy errors without a timeout"
    }
]"#;

fn oracle() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_knowledge(temp.path(), "patterns.json", PATTERNS);
    write_knowledge(temp.path(), "gotchas.json", GOTCHAS);
    temp
}

#[test]
fn test_md5_suggestion_is_blocked_by_critical_pattern() {
    let oracle = oracle();
    let (_temp, store) = create_test_store();
    let validator =
        SuggestionValidator::load(&FileKnowledgeBase::new(oracle.path()), Some(&store));

    let result = validator.validate("Use MD5 for password hashing", "security");

    assert_eq!(result.confidence, 0.8);
    assert!(!result.should_present);
    assert_eq!(result.warnings[0].kind, WarningKind::PatternContradiction);
    assert_eq!(
        result.warnings[0].message,
        "Contradicts Oracle pattern: Password storage"
    );
}

#[test]
fn test_low_priority_pattern_does_not_contradict() {
    let oracle = oracle();
    let validator = SuggestionValidator::load(&FileKnowledgeBase::new(oracle.path()), None);

    let result = validator.validate("Add println debugging to the library", "debugging");
    assert!(result.warnings.is_empty());
    assert_eq!(result.confidence, 0.5);
    assert!(result.should_present);
}

#[test]
fn test_gotcha_overlap_warns_without_blocking() {
    let oracle = oracle();
    let validator = SuggestionValidator::load(&FileKnowledgeBase::new(oracle.path()), None);

    let result = validator.validate(
        "Allow concurrent writers to the sqlite database",
        "performance",
    );
    assert_eq!(result.warnings.len(), 1);
    assert_eq!(result.warnings[0].kind, WarningKind::GotchaWarning);
    assert!(result.should_present);
}

#[test]
fn test_recorded_rejection_flags_similar_suggestion() {
    let (_temp, store) = create_test_store();
    let ledger = FeedbackLedger::new(store.clone());
    ledger
        .record_rejection(
            "Convert the config loader to async",
            "startup is not a bottleneck",
            "performance",
            t0(),
        )
        .unwrap();

    let validator = SuggestionValidator::load(&NoKnowledge, Some(&store));
    let result = validator.validate("Convert config loader to async", "performance");

    assert_eq!(result.warnings[0].kind, WarningKind::PreviouslyRejected);
    assert!(result.warnings[0].similarity.unwrap() >= 0.6);
    assert!(result
        .notes
        .iter()
        .any(|n| n == "Previous rejection reason: startup is not a bottleneck"));
}

#[test]
fn test_acceptance_history_drives_confidence_without_knowledge() {
    let (_temp, store) = create_test_store();
    let ledger = FeedbackLedger::new(store.clone());
    for accepted in [true, true, true, false] {
        ledger.record_feedback("testing", accepted).unwrap();
    }
    for _ in 0..4 {
        ledger.record_feedback("style", false).unwrap();
    }

    let validator = SuggestionValidator::load(&NoKnowledge, Some(&store));
    let results = validator.validate_batch(&[
        Suggestion::new("Add a regression test for the parser", "testing"),
        Suggestion::new("Reorder the imports", "style"),
    ]);

    assert_eq!(results[0].confidence, 0.75);
    assert!(results[0].should_present);
    assert_eq!(results[1].confidence, 0.0);
    assert!(!results[1].should_present);

    let text = render_for_user(&results);
    assert!(text.starts_with("Guardian Review Found 1 Suggestions:"));
    assert!(text.contains("1. [0.75] Add a regression test for the parser"));
    assert!(!text.contains("Reorder the imports"));
}

#[test]
fn test_missing_knowledge_base_is_not_an_error() {
    let temp = TempDir::new().unwrap();
    let validator =
        SuggestionValidator::load(&FileKnowledgeBase::new(temp.path().join(".oracle")), None);

    let result = validator.validate("Use MD5 for password hashing", "security");
    assert!(result.warnings.is_empty());
    assert!(result.should_present);
}
