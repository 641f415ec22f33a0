//! Local project configuration.
//!
//! `airlift.json` lives next to the project's package.json. It is written by
//! `airlift init` and required by every other command.

use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::api::types::UpdateProtocol;
use crate::error::{ConfigError, Result};

/// Name of the configuration file in the project root
pub const CONFIG_FILE_NAME: &str = "airlift.json";

/// Local project configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the update service
    #[serde(rename = "apiBaseUrl")]
    pub api_base_url: String,
    /// Update protocol the project serves
    pub protocol: UpdateProtocol,
    /// Remote project identifier
    #[serde(rename = "projectID")]
    pub project_id: String,
}

impl Config {
    /// Load and validate the configuration of a project directory
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = config_file_path(project_dir);
        if !path.exists() {
            return Err(ConfigError::NotInitialized { path }.into());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&content).map_err(|e| ConfigError::Invalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        config.validate(&path)?;

        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write the configuration into a project directory, returning the file path
    pub fn save(&self, project_dir: &Path) -> Result<PathBuf> {
        let path = config_file_path(project_dir);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Err(e) = Url::parse(&self.api_base_url) {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: format!("apiBaseUrl is not a valid URL: {}", e),
            }
            .into());
        }

        if self.project_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                path: path.to_path_buf(),
                reason: "projectID must not be empty".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Path of the configuration file inside a project directory
pub fn config_file_path(project_dir: &Path) -> PathBuf {
    project_dir.join(CONFIG_FILE_NAME)
}

/// Find the npm package root by walking up from `start`
pub fn find_package_root(start: &Path) -> Result<PathBuf> {
    for dir in start.ancestors() {
        if dir.join("package.json").is_file() {
            return Ok(dir.to_path_buf());
        }
    }

    Err(ConfigError::PackageRootNotFound {
        start: start.to_path_buf(),
    }
    .into())
}

/// Require `dir` itself to be an npm package root
pub fn assert_npm_package_dir(dir: &Path) -> Result<()> {
    if dir.join("package.json").is_file() {
        Ok(())
    } else {
        Err(ConfigError::NotAnNpmPackage {
            dir: dir.to_path_buf(),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AirliftError;

    fn sample_config() -> Config {
        Config {
            api_base_url: "https://updates.example.com".to_string(),
            protocol: UpdateProtocol::Expo,
            project_id: "prj_1".to_string(),
        }
    }

    #[test]
    fn load_fails_when_not_initialized() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            AirliftError::Config(ConfigError::NotInitialized { .. })
        ));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(config_file_path(dir.path()), "{not json").unwrap();

        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            AirliftError::Config(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn load_rejects_unknown_protocol() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            config_file_path(dir.path()),
            r#"{"apiBaseUrl":"https://x.example","protocol":"carrier-pigeon","projectID":"p"}"#,
        )
        .unwrap();

        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            AirliftError::Config(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn load_rejects_invalid_base_url() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            config_file_path(dir.path()),
            r#"{"apiBaseUrl":"not a url","protocol":"expo","projectID":"p"}"#,
        )
        .unwrap();

        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            AirliftError::Config(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let config = sample_config();
        let path = config.save(dir.path()).unwrap();
        assert!(path.ends_with(CONFIG_FILE_NAME));

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.api_base_url, config.api_base_url);
        assert_eq!(loaded.protocol, config.protocol);
        assert_eq!(loaded.project_id, config.project_id);

        // On-disk field names follow the JSON contract, not Rust casing.
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"apiBaseUrl\""));
        assert!(raw.contains("\"projectID\""));
    }

    #[test]
    fn package_root_found_by_walking_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        let nested = dir.path().join("src/screens");
        std::fs::create_dir_all(&nested).unwrap();

        let root = find_package_root(&nested).unwrap();
        assert_eq!(root, dir.path());
    }

    #[test]
    fn package_root_missing_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_package_root(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            AirliftError::Config(ConfigError::PackageRootNotFound { .. })
        ));
    }
}
