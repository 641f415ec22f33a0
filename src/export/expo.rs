use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;
use tokio::process::Command;

use super::{export_out_dir, run_tool, UpdateMetadata};
use crate::cli::OutputManager;
use crate::error::{ExportError, Result};

/// Exporter backed by the project's installed Expo CLI.
///
/// The CLI does the heavy lifting: `expo export` writes bundles, assets and
/// the metadata file, and `expo config` evaluates the app config (including
/// dynamic `app.config.js` setups) to JSON.
#[derive(Debug)]
pub struct ExpoExporter {
    project_dir: PathBuf,
    export_dir: PathBuf,
    expo_cli: PathBuf,
    expo_config: Option<Value>,
}

impl ExpoExporter {
    /// Create an exporter for a project with the Expo CLI at `expo_cli`
    pub fn new(project_dir: &Path, expo_cli: PathBuf) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            export_dir: export_out_dir(project_dir),
            expo_cli,
            expo_config: None,
        }
    }

    /// Run `expo export` into the export output directory
    pub async fn export(&mut self, output: &OutputManager) -> Result<()> {
        output.progress("Exporting bundles & assets");
        run_tool(
            Command::new(&self.expo_cli)
                .arg("export")
                .arg("--output-dir")
                .arg(&self.export_dir)
                .current_dir(&self.project_dir),
        )
        .await?;
        Ok(())
    }

    /// Evaluate the public Expo config, then load the metadata file the
    /// export wrote.
    pub async fn resolve_bundle_and_assets(
        &mut self,
        output: &OutputManager,
    ) -> Result<UpdateMetadata> {
        output.progress("Parsing Expo config");
        let config_output = run_tool(
            Command::new(&self.expo_cli)
                .args(["config", "--type", "public", "--json"])
                .current_dir(&self.project_dir),
        )
        .await?;

        let config_json = String::from_utf8_lossy(&config_output.stdout);
        if config_json.trim().is_empty() {
            return Err(ExportError::ExpoConfigRead {
                reason: "expo config produced no output".to_string(),
            }
            .into());
        }
        debug!("expo config: {}", config_json.trim());

        let config: Value =
            serde_json::from_str(&config_json).map_err(|e| ExportError::ExpoConfigParse {
                reason: e.to_string(),
            })?;
        self.expo_config = Some(config);

        output.progress("Parsing metadata file");
        UpdateMetadata::load(&self.export_dir)
    }

    /// Runtime version from the parsed config: `expo.runtimeVersion` wins,
    /// then `expo.version`, then `1.0.0`. Non-string values (runtime version
    /// policies) are skipped.
    pub fn resolve_runtime_version(&self) -> Result<String> {
        let config = self
            .expo_config
            .as_ref()
            .ok_or(ExportError::ExpoConfigNotLoaded)?;

        let version = [
            config.pointer("/expo/runtimeVersion"),
            config.pointer("/expo/version"),
        ]
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .unwrap_or("1.0.0");

        Ok(version.to_string())
    }

    /// The full app config rides along so the server can serve the Expo
    /// update manifest.
    pub fn extra_update_params(&self) -> serde_json::Map<String, Value> {
        let mut params = serde_json::Map::new();
        if let Some(config) = &self.expo_config {
            params.insert("expoAppConfig".to_string(), config.clone());
        }
        params
    }
}
