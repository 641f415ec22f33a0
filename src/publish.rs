//! The update publish pipeline.

use std::path::Path;

use log::debug;

use crate::api::types::PrepareUpdateRequest;
use crate::api::ApiClient;
use crate::cli::{prompt, OutputManager};
use crate::error::{ApiError, Result};
use crate::export::{export_out_dir, resolve_exporter};
use crate::metadata::build_file_metadata;
use crate::upload::upload_all;

/// Options for one publish run
#[derive(Debug, Default, Clone)]
pub struct PublishOptions {
    /// Message describing the update, prompted for when absent or empty
    pub message: Option<String>,
    /// Runtime version override
    pub version: Option<String>,
    /// Reuse the previous export instead of running the toolchain
    pub skip_export: bool,
}

/// Run the publish pipeline end to end and return the new update's ID.
///
/// Steps run in strict order, each gating the next: health check, message,
/// export, metadata, prepare, upload, commit. Nothing retries. A commit
/// failure leaves the update uncommitted on the server.
pub async fn publish_update(
    client: &ApiClient,
    project_dir: &Path,
    options: PublishOptions,
    output: &OutputManager,
) -> Result<String> {
    client.health_check().await?;

    let message = match options.message {
        Some(message) if !message.is_empty() => message,
        _ => prompt::input("Enter a message")?,
    };

    let mut exporter = resolve_exporter(project_dir)?;
    debug!("using exporter: {}", exporter.name());

    let export_dir = export_out_dir(project_dir);

    if !options.skip_export {
        exporter.export(output).await?;
    }

    let bundle_and_assets = exporter.resolve_bundle_and_assets(output).await?;
    let runtime_version = match options.version {
        Some(version) => version,
        None => exporter.resolve_runtime_version()?,
    };

    let file_metadata = build_file_metadata(&export_dir, &bundle_and_assets).await?;
    debug!("file metadata: {file_metadata:?}");

    output.progress("Preparing update");
    let prepared = client
        .prepare_update(&PrepareUpdateRequest {
            runtime_version,
            file_metadata: file_metadata.clone(),
            message,
            extra: exporter.extra_update_params(),
        })
        .await?;
    debug!("update id: {}", prepared.update_id);
    debug!("upload urls: {:?}", prepared.upload_urls);

    upload_all(&export_dir, &prepared.upload_urls, &file_metadata, output).await?;

    output.progress("Committing update");
    client
        .commit_update(&prepared.update_id)
        .await
        .map_err(|e| ApiError::CommitFailed {
            update_id: prepared.update_id.clone(),
            detail: e.to_string(),
        })?;

    output.success("Update created! 🎉");
    output.println(&format!("ID: {}", prepared.update_id));
    output.println("We're now processing your update. It should be live in a couple of minutes.");

    Ok(prepared.update_id)
}
