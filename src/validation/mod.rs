//! Suggestion validation against knowledge and feedback history

pub mod knowledge;
pub mod presentation;
pub mod validator;

pub use knowledge::{
    FileKnowledgeBase, KnowledgeCategory, KnowledgeEntry, KnowledgePriority, KnowledgeSource,
    NoKnowledge,
};
pub use presentation::{confidence_indicator, render_for_user, ConfidenceBand};
pub use validator::{
    Severity, Suggestion, SuggestionValidator, ValidationResult, ValidationWarning, WarningKind,
};
