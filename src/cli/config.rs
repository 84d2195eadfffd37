//! Configuration management command

use clap::Subcommand;
use guardian_core::{config::validate_unit, error::Result, GuardianConfig};
use serde_json::json;
use tracing::info;

use super::helpers::{print_json, Context};

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Set the target acceptance rate (0.0 - 1.0)
    SetTarget {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Set how fast thresholds move toward the target (0.0 - 1.0)
    SetSpeed {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
}

/// Handle configuration management command
pub fn handle(ctx: &Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => print_json(&ctx.read_store().load::<GuardianConfig>()),
        ConfigAction::SetTarget { value } => {
            let value = validate_unit("target acceptance rate", value)?;
            ctx.write_store()?
                .update(|config: &mut GuardianConfig| config.learning.set_target(value))??;
            info!("Target acceptance rate set to {}", value);

            print_json(&json!({
                "updated": true,
                "acceptance_rate_target": value,
            }))
        }
        ConfigAction::SetSpeed { value } => {
            let value = validate_unit("adjustment speed", value)?;
            ctx.write_store()?
                .update(|config: &mut GuardianConfig| config.learning.set_speed(value))??;
            info!("Adjustment speed set to {}", value);

            print_json(&json!({
                "updated": true,
                "adjustment_speed": value,
            }))
        }
    }
}
