//! Parallel upload of exported files to pre-signed URLs.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::Body;
use tokio::task::JoinSet;
use tokio_util::io::ReaderStream;

use crate::api::types::{FileMetadataEntry, UploadTarget};
use crate::cli::OutputManager;
use crate::error::{Result, UploadError};

struct UploadJob {
    path: String,
    url: String,
    file: PathBuf,
    content_length: u64,
    content_type: String,
}

/// Upload every target concurrently, failing fast on the first error.
///
/// Every target is matched against the file metadata before any request goes
/// out; an unknown target fails the run with zero uploads issued. Dropping
/// the task set on the first failure aborts the in-flight siblings.
pub async fn upload_all(
    export_dir: &Path,
    targets: &[UploadTarget],
    file_metadata: &[FileMetadataEntry],
    output: &OutputManager,
) -> Result<()> {
    let index: HashMap<&str, &FileMetadataEntry> = file_metadata
        .iter()
        .map(|entry| (entry.path.as_str(), entry))
        .collect();

    let mut jobs = Vec::with_capacity(targets.len());
    for target in targets {
        let entry =
            index
                .get(target.path.as_str())
                .ok_or_else(|| UploadError::MissingMetadata {
                    path: target.path.clone(),
                })?;
        jobs.push(UploadJob {
            path: target.path.clone(),
            url: target.url.clone(),
            file: export_dir.join(&target.path),
            content_length: entry.content_length,
            content_type: entry.content_type.clone(),
        });
    }

    let total = jobs.len();
    output.progress(&format!("Uploading {total} files"));

    let client = reqwest::Client::new();
    let mut tasks = JoinSet::new();
    for job in jobs {
        let client = client.clone();
        tasks.spawn(async move { upload_file(&client, job).await });
    }

    let mut completed = 0;
    while let Some(result) = tasks.join_next().await {
        let path = result.map_err(|e| UploadError::Interrupted {
            reason: e.to_string(),
        })??;
        completed += 1;
        output.indent(&format!("✓ {path} ({completed}/{total})"));
    }

    debug!("uploaded {completed} files");
    Ok(())
}

async fn upload_file(
    client: &reqwest::Client,
    job: UploadJob,
) -> std::result::Result<String, UploadError> {
    let file = tokio::fs::File::open(&job.file)
        .await
        .map_err(|e| UploadError::Stream {
            path: job.path.clone(),
            reason: e.to_string(),
        })?;

    let response = client
        .put(&job.url)
        .header(CONTENT_LENGTH, job.content_length)
        .header(CONTENT_TYPE, job.content_type)
        .body(Body::wrap_stream(ReaderStream::new(file)))
        .send()
        .await
        .map_err(|e| UploadError::Stream {
            path: job.path.clone(),
            reason: e.to_string(),
        })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UploadError::Rejected {
            path: job.path,
            status: status.as_u16(),
            body,
        });
    }

    Ok(job.path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AirliftError;

    fn entry(path: &str) -> FileMetadataEntry {
        FileMetadataEntry {
            path: path.to_string(),
            extension: ".png".to_string(),
            content_length: 3,
            md5_hash: "0".repeat(32),
            content_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn unknown_target_fails_before_any_upload() {
        let dir = tempfile::tempdir().unwrap();
        let targets = vec![UploadTarget {
            path: "ghost.png".to_string(),
            url: "http://127.0.0.1:1/never-used".to_string(),
        }];
        let metadata = vec![entry("real.png")];

        let output = OutputManager::new(true);
        let err = upload_all(dir.path(), &targets, &metadata, &output)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AirliftError::Upload(UploadError::MissingMetadata { ref path }) if path == "ghost.png"
        ));
    }

    #[tokio::test]
    async fn no_targets_is_a_successful_noop() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputManager::new(true);
        upload_all(dir.path(), &[], &[entry("unused.png")], &output)
            .await
            .unwrap();
    }
}
