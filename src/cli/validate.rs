//! Suggestion validation command

use guardian_core::{
    error::{GuardianError, Result},
    validation::{render_for_user, NoKnowledge, Suggestion},
    FileKnowledgeBase, KnowledgeSource, SuggestionValidator,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::helpers::{print_json, Context};

/// Suggestions from a JSON file holding an array of `{text, category}`
fn load_suggestions(path: &Path) -> Result<Vec<Suggestion>> {
    let raw = fs::read_to_string(path).map_err(|e| {
        GuardianError::InvalidInput(format!(
            "Failed to load suggestions file {}: {}",
            path.display(),
            e
        ))
    })?;

    serde_json::from_str(&raw).map_err(|e| {
        GuardianError::InvalidInput(format!(
            "Malformed suggestions file {}: {}",
            path.display(),
            e
        ))
    })
}

/// Handle validate command
pub fn handle(
    ctx: &Context,
    suggestion: Option<String>,
    category: String,
    file: Option<PathBuf>,
    text: bool,
) -> Result<()> {
    let knowledge: Box<dyn KnowledgeSource> = match ctx.oracle_dir() {
        Some(dir) => Box::new(FileKnowledgeBase::new(dir)),
        None => {
            debug!("No knowledge base found, validating on acceptance history only");
            Box::new(NoKnowledge)
        }
    };
    let store = ctx.read_store();
    let validator = SuggestionValidator::load(knowledge.as_ref(), Some(&store));

    match (suggestion, file) {
        (Some(suggestion), _) => {
            let result = validator.validate(&suggestion, &category);
            if text {
                println!("{}", render_for_user(std::slice::from_ref(&result)));
                Ok(())
            } else {
                print_json(&result)
            }
        }
        (None, Some(path)) => {
            let results = validator.validate_batch(&load_suggestions(&path)?);
            if text {
                println!("{}", render_for_user(&results));
                Ok(())
            } else {
                print_json(&results)
            }
        }
        (None, None) => Err(GuardianError::InvalidInput(
            "either --suggestion or --file is required".to_string(),
        )),
    }
}
