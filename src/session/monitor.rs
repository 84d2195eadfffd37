//! Persisted session operations
//!
//! Each hook invocation records one event against the state directory and
//! reports the triggers that hold afterwards. Persistence problems are logged
//! and never stop the report.

use super::health::{session_health, HealthReport};
use super::metrics::{SessionEvent, SessionMetrics};
use super::triggers::{evaluate_triggers, Trigger};
use crate::config::GuardianConfig;
use crate::error::Result;
use crate::storage::StateStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventOutcome {
    pub event_recorded: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub session_reset: bool,
    pub triggers: Vec<Trigger>,
}

/// Record `event` and evaluate triggers
///
/// With Guardian disabled nothing is recorded and no triggers are reported.
pub fn record_event(
    store: &StateStore,
    event: &SessionEvent,
    session_id: Option<&str>,
    now: DateTime<Utc>,
) -> EventOutcome {
    let config = store.load::<GuardianConfig>();
    if !config.enabled {
        debug!("Guardian disabled, ignoring {} event", event.name());
        return EventOutcome {
            event_recorded: false,
            session_reset: false,
            triggers: Vec::new(),
        };
    }

    let (metrics, session_reset) = store.update_best_effort(|metrics: &mut SessionMetrics| {
        let reset = session_id.map_or(false, |id| metrics.begin_session(id, now));
        metrics.apply(event, now);
        (metrics.clone(), reset)
    });
    if session_reset {
        info!("New session detected, metrics reset");
    }

    let triggers = evaluate_triggers(&metrics, &config, now);
    if !triggers.is_empty() {
        info!(
            "{} event raised {} trigger(s)",
            event.name(),
            triggers.len()
        );
    }

    EventOutcome {
        event_recorded: true,
        session_reset,
        triggers,
    }
}

/// Triggers for the stored session without recording anything
pub fn current_triggers(store: &StateStore, now: DateTime<Utc>) -> Vec<Trigger> {
    let config = store.load::<GuardianConfig>();
    evaluate_triggers(&store.load::<SessionMetrics>(), &config, now)
}

pub fn current_health(store: &StateStore, now: DateTime<Utc>) -> HealthReport {
    session_health(&store.load::<SessionMetrics>(), now)
}

/// Replace the stored session with a fresh one starting at `now`
pub fn reset_session(store: &StateStore, now: DateTime<Utc>) -> Result<SessionMetrics> {
    let metrics = store.update(|metrics: &mut SessionMetrics| {
        metrics.reset(now);
        metrics.clone()
    })?;
    info!("Session reset");
    Ok(metrics)
}
