//! State directory initialization command

use guardian_core::{error::Result, project::init_state_dir};
use serde_json::json;
use tracing::debug;

use super::helpers::{print_json, Context};

/// Handle init command
pub fn handle(ctx: &Context) -> Result<()> {
    let dir = match ctx.explicit_guardian_dir() {
        Some(dir) => {
            init_state_dir(dir)?;
            dir.clone()
        }
        None => ctx.locator().init_guardian()?,
    };
    debug!("Initialized {}", dir.display());

    print_json(&json!({
        "initialized": true,
        "path": dir,
    }))
}
