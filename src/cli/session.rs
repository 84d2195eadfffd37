//! Session inspection commands: health, triggers and reset

use chrono::Utc;
use guardian_core::{
    error::Result,
    session::{current_health, current_triggers, highest_priority, reset_session},
};
use serde_json::json;

use super::helpers::{print_json, Context};

/// Handle health command
pub fn health(ctx: &Context) -> Result<()> {
    let report = current_health(&ctx.read_store(), Utc::now());
    print_json(&report)
}

/// Handle triggers command
pub fn triggers(ctx: &Context) -> Result<()> {
    let triggers = current_triggers(&ctx.read_store(), Utc::now());
    let top = highest_priority(&triggers).map(|t| t.kind);

    print_json(&json!({
        "triggers": triggers,
        "highest_priority": top,
    }))
}

/// Handle reset command
pub fn reset(ctx: &Context) -> Result<()> {
    let metrics = reset_session(&ctx.write_store()?, Utc::now())?;

    print_json(&json!({
        "reset": true,
        "session_start": metrics.session_start,
    }))
}
