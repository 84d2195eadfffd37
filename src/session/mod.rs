//! Session monitoring: metrics, triggers and health

pub mod health;
pub mod metrics;
pub mod monitor;
pub mod triggers;

pub use health::{session_health, HealthReport, HealthStatus};
pub use metrics::{normalize_error_key, SessionEvent, SessionMetrics};
pub use monitor::{current_health, current_triggers, record_event, reset_session, EventOutcome};
pub use triggers::{evaluate_triggers, highest_priority, Priority, Trigger, TriggerKind};
