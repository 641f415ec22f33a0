//! List updates.

use std::env;

use crate::api::ApiClient;
use crate::cli::OutputManager;
use crate::config::{self, Config};
use crate::error::Result;

use super::helpers::update_table;

pub(super) async fn execute_list(output: &OutputManager) -> Result<()> {
    let current_dir = env::current_dir()?;
    let project_dir = config::find_package_root(&current_dir)?;
    let config = Config::load(&project_dir)?;
    let client = ApiClient::new(&config);

    output.progress("Fetching updates");
    let updates = client.list_updates().await?;

    output.println(&update_table(&updates));
    Ok(())
}
