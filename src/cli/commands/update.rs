//! Publish a new update.

use std::env;

use crate::api::ApiClient;
use crate::cli::OutputManager;
use crate::config::{self, Config};
use crate::error::Result;
use crate::publish::{publish_update, PublishOptions};

pub(super) async fn execute_update(
    message: Option<String>,
    version: Option<String>,
    skip_export: bool,
    output: &OutputManager,
) -> Result<()> {
    let current_dir = env::current_dir()?;
    let project_dir = config::find_package_root(&current_dir)?;
    let config = Config::load(&project_dir)?;
    let client = ApiClient::new(&config);

    publish_update(
        &client,
        &project_dir,
        PublishOptions {
            message,
            version,
            skip_export,
        },
        output,
    )
    .await?;

    Ok(())
}
