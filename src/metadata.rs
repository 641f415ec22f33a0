//! File metadata for the prepare-update request.
//!
//! The server issues one pre-signed upload URL per described file, and the
//! storage backend checks the declared size and MD5 on receipt.

use std::io;
use std::path::Path;

use log::debug;

use crate::api::types::FileMetadataEntry;
use crate::error::{ExportError, Result};
use crate::export::{UpdateMetadata, METADATA_FILE_NAME};

/// Describe every exported file the server needs to know about.
///
/// The metadata file itself leads, followed by each platform's bundle and
/// then its assets in listed order.
pub async fn build_file_metadata(
    export_dir: &Path,
    update: &UpdateMetadata,
) -> Result<Vec<FileMetadataEntry>> {
    let mut entries = Vec::new();

    let metadata_path = export_dir.join(METADATA_FILE_NAME);
    entries.push(
        describe_file(
            &metadata_path,
            METADATA_FILE_NAME.to_string(),
            "json".to_string(),
            "application/json".to_string(),
        )
        .await?,
    );

    for bundle in update.file_metadata.values() {
        let bundle_path = export_dir.join(&bundle.bundle);
        // Bundle extensions are sent without the dot, asset extensions keep
        // theirs. The update server expects exactly this asymmetry.
        let extension = Path::new(&bundle.bundle)
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        entries.push(
            describe_file(
                &bundle_path,
                bundle.bundle.clone(),
                extension,
                "application/javascript".to_string(),
            )
            .await?,
        );

        for asset in &bundle.assets {
            let asset_path = export_dir.join(&asset.path);
            entries.push(
                describe_file(
                    &asset_path,
                    asset.path.clone(),
                    asset.ext.clone(),
                    content_type_for_extension(&asset.ext).to_string(),
                )
                .await?,
            );
        }
    }

    debug!("file metadata covers {} files", entries.len());
    Ok(entries)
}

async fn describe_file(
    path: &Path,
    rel_path: String,
    extension: String,
    content_type: String,
) -> Result<FileMetadataEntry> {
    let stat = tokio::fs::metadata(path)
        .await
        .map_err(|e| artifact_error(path, &e))?;

    Ok(FileMetadataEntry {
        path: rel_path,
        extension,
        content_length: stat.len(),
        md5_hash: md5_file(path).await?,
        content_type,
    })
}

fn artifact_error(path: &Path, e: &io::Error) -> ExportError {
    ExportError::ArtifactUnreadable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}

/// MD5 of a file, hashed off the async runtime
async fn md5_file(path: &Path) -> Result<String> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<String> {
        let mut src = std::fs::File::open(&path).map_err(|e| artifact_error(&path, &e))?;
        let mut context = md5::Context::new();
        io::copy(&mut src, &mut context).map_err(|e| artifact_error(&path, &e))?;
        Ok(hex::encode(context.finalize().0))
    })
    .await
    .map_err(|e| io::Error::other(format!("MD5 hashing task failed: {e}")))?
}

/// Content type for an asset extension, with or without its leading dot.
/// Unknown extensions map to an empty string.
pub fn content_type_for_extension(ext: &str) -> &'static str {
    match ext.trim_start_matches('.') {
        "js" | "jsbundle" | "bundle" => "application/javascript",
        "json" => "application/json",
        "html" => "text/html",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "txt" => "text/plain",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{AssetRef, PlatformBundle};
    use std::collections::BTreeMap;
    use std::fs;

    fn two_platform_update() -> UpdateMetadata {
        let mut file_metadata = BTreeMap::new();
        file_metadata.insert(
            "android".to_string(),
            PlatformBundle {
                bundle: "index.android.bundle".to_string(),
                assets: vec![AssetRef {
                    path: "android/icon.png".to_string(),
                    ext: ".png".to_string(),
                }],
            },
        );
        file_metadata.insert(
            "ios".to_string(),
            PlatformBundle {
                bundle: "main.jsbundle".to_string(),
                assets: vec![],
            },
        );
        UpdateMetadata {
            version: 0,
            bundler: "react-native".to_string(),
            file_metadata,
        }
    }

    #[tokio::test]
    async fn entries_keep_metadata_bundle_asset_order() {
        let dir = tempfile::tempdir().unwrap();
        let export_dir = dir.path();
        fs::create_dir_all(export_dir.join("android")).unwrap();
        fs::write(export_dir.join(METADATA_FILE_NAME), "{}").unwrap();
        fs::write(export_dir.join("index.android.bundle"), "android").unwrap();
        fs::write(export_dir.join("android/icon.png"), "png").unwrap();
        fs::write(export_dir.join("main.jsbundle"), "ios").unwrap();

        let entries = build_file_metadata(export_dir, &two_platform_update())
            .await
            .unwrap();

        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "metadata.json",
                "index.android.bundle",
                "android/icon.png",
                "main.jsbundle",
            ]
        );

        assert_eq!(entries[0].extension, "json");
        assert_eq!(entries[0].content_type, "application/json");
        assert_eq!(entries[1].extension, "bundle");
        assert_eq!(entries[1].content_type, "application/javascript");
        assert_eq!(entries[2].extension, ".png");
        assert_eq!(entries[2].content_type, "image/png");
        assert_eq!(entries[3].extension, "jsbundle");
    }

    #[tokio::test]
    async fn entries_carry_size_and_md5() {
        let dir = tempfile::tempdir().unwrap();
        let export_dir = dir.path();
        fs::write(export_dir.join(METADATA_FILE_NAME), "hello world").unwrap();

        let update = UpdateMetadata {
            version: 0,
            bundler: "react-native".to_string(),
            file_metadata: BTreeMap::new(),
        };
        let entries = build_file_metadata(export_dir, &update).await.unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].content_length, 11);
        assert_eq!(entries[0].md5_hash, "5eb63bbbe01eeed093cb22bb8f5acdc3");
    }

    #[tokio::test]
    async fn missing_artifact_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_file_metadata(dir.path(), &two_platform_update())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("metadata.json"));
    }

    #[test]
    fn content_types_tolerate_leading_dots() {
        assert_eq!(content_type_for_extension(".png"), "image/png");
        assert_eq!(content_type_for_extension("png"), "image/png");
        assert_eq!(content_type_for_extension(".ttf"), "font/ttf");
        assert_eq!(content_type_for_extension(".blob"), "");
        assert_eq!(content_type_for_extension(""), "");
    }
}
