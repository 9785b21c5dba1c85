//! Interactive prompts using dialoguer

use anyhow::Result;
use dialoguer::Confirm;

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    let confirmed = Confirm::new()
        .with_prompt(message)
        .default(true)
        .interact()?;
    Ok(confirmed)
}

/// Prompt user to confirm writing artifacts to the output directory
pub fn confirm_write_artifacts(artifact_count: usize, dir: &std::path::Path) -> Result<bool> {
    let message = format!(
        "Write {} artifact(s) to {}?",
        artifact_count,
        dir.display()
    );
    confirm_step(&message)
}
