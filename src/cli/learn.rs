//! Feedback and calibration commands

use chrono::Utc;
use clap::ValueEnum;
use guardian_core::{error::Result, FeedbackLedger};
use serde_json::json;
use tracing::info;

use super::helpers::{print_json, Context};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject,
}

/// Handle reject command
pub fn reject(ctx: &Context, suggestion: &str, reason: &str, category: &str) -> Result<()> {
    let ledger = FeedbackLedger::new(ctx.write_store()?);
    let history_size = ledger.record_rejection(suggestion, reason, category, Utc::now())?;
    info!("Rejection recorded for {}", category);

    print_json(&json!({
        "recorded": true,
        "history_size": history_size,
    }))
}

/// Handle feedback command
pub fn feedback(ctx: &Context, verdict: Verdict, category: &str) -> Result<()> {
    let ledger = FeedbackLedger::new(ctx.write_store()?);
    let stats = ledger.record_feedback(category, verdict == Verdict::Accept)?;

    print_json(&json!({
        "updated": true,
        "category": category,
        "category_rate": stats.rate_for(category),
        "overall_rate": stats.overall.rate,
    }))
}

/// Handle check-rejection command
pub fn check_rejection(ctx: &Context, text: &str) -> Result<()> {
    let ledger = FeedbackLedger::new(ctx.read_store());

    match ledger.check_rejection(text) {
        Some(details) => print_json(&json!({ "found": true, "details": details })),
        None => print_json(&json!({ "found": false })),
    }
}

/// Handle calibrate command
pub fn calibrate(ctx: &Context, dry_run: bool) -> Result<()> {
    let store = if dry_run {
        ctx.read_store()
    } else {
        ctx.write_store()?
    };
    let ledger = FeedbackLedger::new(store);
    let report = ledger.calibrate(dry_run, Utc::now())?;
    print_json(&report)
}

/// Handle stats command
pub fn stats(ctx: &Context) -> Result<()> {
    let ledger = FeedbackLedger::new(ctx.read_store());
    print_json(&ledger.statistics(Utc::now()))
}
