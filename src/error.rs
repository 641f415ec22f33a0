//! Error types for airlift operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

use crate::api::types::ValidationFieldError;

/// Result type alias for airlift operations
pub type Result<T> = std::result::Result<T, AirliftError>;

/// Main error type for all airlift operations
#[derive(Error, Debug)]
pub enum AirliftError {
    /// Project configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Toolchain discovery errors
    #[error("Toolchain error: {0}")]
    Toolchain(#[from] ToolchainError),

    /// Bundle export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Update API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Asset upload errors
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Project configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file does not exist yet
    #[error("Project is not initialized: {path} not found. Run 'airlift init' first.")]
    NotInitialized {
        /// Path where the configuration file was expected
        path: PathBuf,
    },

    /// Configuration file exists but cannot be used
    #[error("Invalid configuration file {path}: {reason}")]
    Invalid {
        /// Path to the configuration file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// Command must run inside an npm package
    #[error("No package.json found in {dir}. Run this command inside an npm project.")]
    NotAnNpmPackage {
        /// Directory that was checked
        dir: PathBuf,
    },

    /// No package.json found walking up from the start directory
    #[error("Could not find package.json in {start} or any parent directory")]
    PackageRootNotFound {
        /// Directory the search started from
        start: PathBuf,
    },
}

/// Toolchain discovery errors
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// A required tool is not installed in the project
    #[error("{tool} is not installed. Project directory: {project_dir}")]
    ToolNotFound {
        /// Human-readable tool name
        tool: String,
        /// Project directory the lookup started from
        project_dir: PathBuf,
    },

    /// Host operating system has no known hermesc distribution
    #[error("No hermesc binary is distributed for host platform '{os}'")]
    UnsupportedHostPlatform {
        /// Host operating system name
        os: String,
    },
}

/// Bundle export errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// A toolchain subprocess exited non-zero
    #[error("Command failed: {command}\n{detail}")]
    SubprocessFailed {
        /// Command line that failed
        command: String,
        /// Captured tool output
        detail: String,
    },

    /// `expo config` produced no output
    #[error("Failed to read the Expo config: {reason}")]
    ExpoConfigRead {
        /// Reason for the error
        reason: String,
    },

    /// `expo config` output was not valid JSON
    #[error("Failed to parse the Expo config: {reason}")]
    ExpoConfigParse {
        /// Reason for the error
        reason: String,
    },

    /// Runtime version requested before the Expo config was parsed
    #[error("Expo config has not been parsed yet")]
    ExpoConfigNotLoaded,

    /// Export metadata file is missing
    #[error("Metadata file {path} not found. Run once without --skip-export to create it.")]
    MetadataMissing {
        /// Path where metadata.json was expected
        path: PathBuf,
    },

    /// Export metadata file cannot be parsed
    #[error("Failed to parse metadata file {path}: {reason}")]
    MetadataParse {
        /// Path to metadata.json
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },

    /// A platform bundle was never written to the export directory
    #[error("Bundle for {platform} is not exported")]
    BundleMissing {
        /// Platform identifier
        platform: String,
    },

    /// A file listed in the export metadata is missing or unreadable
    #[error("Failed to read exported file {path}: {reason}")]
    ArtifactUnreadable {
        /// Path of the exported file
        path: PathBuf,
        /// Reason for the error
        reason: String,
    },
}

/// Update API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Health check or connection failure
    #[error("Failed to connect to the update server at {url}: {reason}")]
    Unreachable {
        /// Server base URL
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// Request could not be sent or the response body could not be read
    #[error("Request failed [{method}] {url}: {reason}")]
    Transport {
        /// HTTP method
        method: String,
        /// Request URL
        url: String,
        /// Reason for the error
        reason: String,
    },

    /// Server rejected the request with a non-success status
    #[error("Request failed [{method}] {url}. Response status: {status}.\n\n{body}")]
    RequestFailed {
        /// HTTP method
        method: String,
        /// Request URL
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Server rejected the request body with field-level errors
    #[error("Invalid input:{}", join_field_errors(errors))]
    Validation {
        /// Field-level validation errors reported by the server
        errors: Vec<ValidationFieldError>,
    },

    /// Update was uploaded but the final commit failed
    #[error("Failed to commit update {update_id}: {detail}")]
    CommitFailed {
        /// Identifier of the prepared update
        update_id: String,
        /// Reason for the error
        detail: String,
    },
}

/// Asset upload errors
#[derive(Error, Debug)]
pub enum UploadError {
    /// An upload target has no matching file metadata entry
    #[error("Failed to find metadata for {path}")]
    MissingMetadata {
        /// Upload target path
        path: String,
    },

    /// Storage rejected an upload
    #[error("Failed to upload {path}: status {status}\n{body}")]
    Rejected {
        /// Upload target path
        path: String,
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// Upload request could not be sent
    #[error("Failed to upload {path}: {reason}")]
    Stream {
        /// Upload target path
        path: String,
        /// Reason for the error
        reason: String,
    },

    /// Upload task was cancelled or panicked
    #[error("Upload interrupted: {reason}")]
    Interrupted {
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command cannot run against the current remote state
    #[error("{reason}")]
    InvalidState {
        /// Reason for the error
        reason: String,
    },
}

fn join_field_errors(errors: &[ValidationFieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("\n  {}: {}", e.field, e.message))
        .collect()
}

impl AirliftError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            AirliftError::Config(ConfigError::NotInitialized { .. }) => vec![
                "Run 'airlift init' in your project root".to_string(),
                "Check that you are in the directory that holds airlift.json".to_string(),
            ],
            AirliftError::Config(
                ConfigError::NotAnNpmPackage { .. } | ConfigError::PackageRootNotFound { .. },
            ) => vec![
                "Run from a directory containing package.json".to_string(),
            ],
            AirliftError::Toolchain(ToolchainError::ToolNotFound { tool, .. }) => vec![
                format!("Install {} into the project: npm install", tool),
                "Check that node_modules is populated".to_string(),
            ],
            AirliftError::Api(ApiError::Unreachable { .. }) => vec![
                "Verify apiBaseUrl in airlift.json".to_string(),
                "Check that the update server is reachable from this machine".to_string(),
            ],
            AirliftError::Api(ApiError::CommitFailed { update_id, .. }) => vec![
                format!(
                    "Update {} was uploaded but never committed; it will not be served",
                    update_id
                ),
                "Re-run 'airlift update' to publish a fresh update".to_string(),
            ],
            AirliftError::Upload(UploadError::Rejected { .. }) => vec![
                "Upload URLs are short-lived; re-run 'airlift update'".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}
