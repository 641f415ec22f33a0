//! Roll back a published update.

use std::env;

use crate::api::types::UpdateStatus;
use crate::api::ApiClient;
use crate::cli::{prompt, OutputManager};
use crate::config::{self, Config};
use crate::error::{CliError, Result};

use super::helpers::update_table;

pub(super) async fn execute_rollback(
    update_id: &str,
    yes: bool,
    output: &OutputManager,
) -> Result<()> {
    let current_dir = env::current_dir()?;
    let project_dir = config::find_package_root(&current_dir)?;
    let config = Config::load(&project_dir)?;
    let client = ApiClient::new(&config);

    output.progress("Fetching update details");
    let update = client.get_update(update_id).await?;

    // Only live updates can be withdrawn.
    if update.status != UpdateStatus::Published {
        return Err(CliError::InvalidState {
            reason: "Cannot rollback non-published update".to_string(),
        }
        .into());
    }

    output.println(&update_table(std::slice::from_ref(&update)));

    if !yes && !prompt::confirm("Are you sure you want to rollback this update?")? {
        return Ok(());
    }

    output.progress("Rolling back the update");
    client.rollback_update(&update.id).await?;

    output.success("Successfully rolled back the update.");
    Ok(())
}
