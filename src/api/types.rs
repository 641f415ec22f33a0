//! Wire types for the update service API.
//!
//! Field names follow the server's JSON contract, so serde renames matter here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Update delivery protocol a project was created with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateProtocol {
    /// Expo Updates protocol
    Expo,
    /// CodePush protocol
    Codepush,
}

impl UpdateProtocol {
    /// Human-readable protocol name shown in prompts
    pub fn display_name(&self) -> &'static str {
        match self {
            UpdateProtocol::Expo => "Expo Updates",
            UpdateProtocol::Codepush => "CodePush",
        }
    }

    /// npm package the app must have installed to receive updates
    pub fn required_package(&self) -> &'static str {
        match self {
            UpdateProtocol::Expo => "expo-updates",
            UpdateProtocol::Codepush => "react-native-code-push",
        }
    }
}

impl fmt::Display for UpdateProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateProtocol::Expo => write!(f, "expo"),
            UpdateProtocol::Codepush => write!(f, "codepush"),
        }
    }
}

/// Remote project record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Project identifier
    pub id: String,
    /// Project display name
    #[serde(default)]
    pub name: Option<String>,
    /// Protocol fixed at project creation
    pub update_protocol: UpdateProtocol,
}

/// Body for `POST /api/v1/admin/project`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Project display name
    pub name: String,
    /// Protocol the project will serve
    pub update_protocol: UpdateProtocol,
}

/// Lifecycle status of an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateStatus {
    /// Prepared but not yet committed
    Pending,
    /// Committed, being ingested by the server
    Processing,
    /// Live and served to clients
    Published,
    /// Ingestion failed
    Failed,
    /// Withdrawn
    Canceled,
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpdateStatus::Pending => "pending",
            UpdateStatus::Processing => "processing",
            UpdateStatus::Published => "published",
            UpdateStatus::Failed => "failed",
            UpdateStatus::Canceled => "canceled",
        };
        write!(f, "{}", s)
    }
}

/// Update record returned by the list and detail endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    /// Update identifier
    pub id: String,
    /// Release channel the update is served on
    pub channel: String,
    /// Runtime version the update targets
    pub runtime_version: String,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Publish message
    pub message: String,
    /// Lifecycle status
    pub status: UpdateStatus,
}

/// Describes one exported file in the prepare request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadataEntry {
    /// Path relative to the export output directory
    pub path: String,
    /// File extension (bundles drop the dot, assets keep it)
    pub extension: String,
    /// File size in bytes
    pub content_length: u64,
    /// Hex-encoded MD5 digest of the file contents
    pub md5_hash: String,
    /// MIME type, empty when unknown
    pub content_type: String,
}

/// Body for `POST /api/v1/admin/{projectID}/update`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareUpdateRequest {
    /// Runtime version the update targets
    pub runtime_version: String,
    /// One entry per exported file
    pub file_metadata: Vec<FileMetadataEntry>,
    /// Publish message
    pub message: String,
    /// Exporter-specific parameters merged into the request body
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Response to a prepare request
#[derive(Debug, Deserialize)]
pub struct PrepareUpdateResponse {
    /// Identifier of the prepared update
    #[serde(rename = "updateID")]
    pub update_id: String,
    /// Pre-signed destinations, one per file the server wants uploaded
    #[serde(rename = "uploadURLs")]
    pub upload_urls: Vec<UploadTarget>,
}

/// Pre-signed destination for one exported file
#[derive(Debug, Clone, Deserialize)]
pub struct UploadTarget {
    /// Path relative to the export output directory
    pub path: String,
    /// Pre-signed PUT URL
    pub url: String,
}

/// Error envelope for HTTP 400 responses
#[derive(Debug, Deserialize)]
pub struct ValidationErrorResponse {
    /// Field-level failures
    pub errors: Vec<ValidationFieldError>,
}

/// One field-level validation failure
#[derive(Debug, Clone, Deserialize)]
pub struct ValidationFieldError {
    /// Offending request field
    pub field: String,
    /// What the server disliked about it
    pub message: String,
}
