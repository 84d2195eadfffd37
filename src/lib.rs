//! Guardian - session health monitoring for AI coding assistants
//!
//! Guardian watches a coding session through hook-fired events and decides
//! when an external review is worth interrupting for:
//! - Bounded per-session metrics (code volume, errors, file churn, corrections)
//! - Threshold triggers and a session health score
//! - Validation of review suggestions against a knowledge base and past rejections
//! - Feedback-driven calibration of the trigger thresholds
//!
//! # Architecture
//!
//! Every invocation is short-lived: load state, evaluate or mutate, persist,
//! exit. State lives in a `.guardian` directory as a handful of records
//! guarded by advisory file locks, so concurrent hooks never lose updates.
//!
//! # Example
//!
//! ```no_run
//! use guardian_core::session::{record_event, SessionEvent};
//! use guardian_core::storage::StateStore;
//!
//! let store = StateStore::new(".guardian");
//! let outcome = record_event(
//!     &store,
//!     &SessionEvent::Error { message: "TypeError: cannot unpack".into() },
//!     None,
//!     chrono::Utc::now(),
//! );
//! for trigger in &outcome.triggers {
//!     println!("{:?}", trigger.kind);
//! }
//! ```

pub mod config;
pub mod error;
pub mod learning;
pub mod project;
pub mod session;
pub mod storage;
pub mod utils;
pub mod validation;

pub use config::{GuardianConfig, Threshold};
pub use error::{GuardianError, Result};
pub use learning::{AcceptanceStats, CalibrationReport, FeedbackLedger, RejectionHistory};
pub use project::ProjectLocator;
pub use session::{HealthReport, SessionEvent, SessionMetrics, Trigger};
pub use storage::{Record, StateStore};
pub use validation::{FileKnowledgeBase, KnowledgeSource, SuggestionValidator, ValidationResult};
