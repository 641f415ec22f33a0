//! Bundle exporters.
//!
//! An exporter turns the app's JavaScript and assets into files under the
//! export output directory and describes them with update metadata. Projects
//! with the Expo CLI installed use it for everything; bare React Native
//! projects drive the React Native CLI and the Hermes compiler directly.

pub mod hermes;

mod expo;
mod react_native;

pub use expo::ExpoExporter;
pub use react_native::ReactNativeExporter;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Output;

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::cli::OutputManager;
use crate::error::{ExportError, Result};
use crate::toolchain;

/// Name of the metadata file inside the export output directory
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Platforms an update is exported for, in export order
pub const PLATFORMS: [Platform; 2] = [Platform::Ios, Platform::Android];

/// Target platform of an exported bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Platform {
    /// iOS
    Ios,
    /// Android
    Android,
}

impl Platform {
    /// Identifier used in paths and metadata keys
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ios => "ios",
            Platform::Android => "android",
        }
    }

    /// Conventional bundle file name for the platform
    pub fn bundle_name(&self) -> &'static str {
        match self {
            Platform::Ios => "main.jsbundle",
            Platform::Android => "index.android.bundle",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Export output directory for a project
pub fn export_out_dir(project_dir: &Path) -> PathBuf {
    project_dir.join("dist")
}

/// One exported asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    /// Path relative to the export output directory
    pub path: String,
    /// File extension with its leading dot, empty when the file has none
    pub ext: String,
}

/// Bundle and assets exported for one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformBundle {
    /// Bundle path relative to the export output directory
    pub bundle: String,
    /// Exported assets in deterministic order
    pub assets: Vec<AssetRef>,
}

/// Contents of the export metadata file.
///
/// The on-disk shape matches what the Expo CLI writes, so either toolchain's
/// output can be loaded back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateMetadata {
    /// Metadata schema version
    pub version: u32,
    /// Tool that produced the export
    pub bundler: String,
    /// Per-platform bundles keyed by platform identifier
    #[serde(rename = "fileMetadata")]
    pub file_metadata: BTreeMap<String, PlatformBundle>,
}

impl UpdateMetadata {
    /// Load the metadata file from an export output directory
    pub fn load(export_dir: &Path) -> Result<Self> {
        let path = export_dir.join(METADATA_FILE_NAME);
        if !path.exists() {
            return Err(ExportError::MetadataMissing { path }.into());
        }

        let content = std::fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|e| {
            ExportError::MetadataParse {
                path,
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Write the metadata file into an export output directory
    pub fn save(&self, export_dir: &Path) -> Result<PathBuf> {
        let path = export_dir.join(METADATA_FILE_NAME);
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }
}

/// Exporter for a project, selected by probing the installed toolchain
#[derive(Debug)]
pub enum Exporter {
    /// Projects with the Expo CLI installed
    Expo(ExpoExporter),
    /// Bare React Native projects
    ReactNative(ReactNativeExporter),
}

/// Pick the exporter for a project: Expo wins when its CLI is installed
pub fn resolve_exporter(project_dir: &Path) -> Result<Exporter> {
    if let Ok(expo_cli) = toolchain::resolve_expo_cli(project_dir) {
        debug!("using the expo exporter via {}", expo_cli.display());
        return Ok(Exporter::Expo(ExpoExporter::new(project_dir, expo_cli)));
    }

    let rn_cli = toolchain::resolve_react_native_cli(project_dir)?;
    debug!("using the react-native exporter via {}", rn_cli.display());
    Ok(Exporter::ReactNative(ReactNativeExporter::new(
        project_dir,
        rn_cli,
    )))
}

impl Exporter {
    /// Exporter name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Exporter::Expo(_) => "expo",
            Exporter::ReactNative(_) => "react-native",
        }
    }

    /// Run the toolchain, writing bundles and assets into the export directory
    pub async fn export(&mut self, output: &OutputManager) -> Result<()> {
        match self {
            Exporter::Expo(exporter) => exporter.export(output).await,
            Exporter::ReactNative(exporter) => exporter.export(output).await,
        }
    }

    /// Describe the exported files, writing or loading the metadata file.
    ///
    /// Must run after [`Exporter::export`], or against the export directory
    /// a previous run left behind.
    pub async fn resolve_bundle_and_assets(
        &mut self,
        output: &OutputManager,
    ) -> Result<UpdateMetadata> {
        match self {
            Exporter::Expo(exporter) => exporter.resolve_bundle_and_assets(output).await,
            Exporter::ReactNative(exporter) => exporter.resolve_bundle_and_assets(output),
        }
    }

    /// Determine the runtime version the update targets
    pub fn resolve_runtime_version(&self) -> Result<String> {
        match self {
            Exporter::Expo(exporter) => exporter.resolve_runtime_version(),
            Exporter::ReactNative(exporter) => exporter.resolve_runtime_version(),
        }
    }

    /// Exporter-specific parameters merged into the prepare request body
    pub fn extra_update_params(&self) -> serde_json::Map<String, serde_json::Value> {
        match self {
            Exporter::Expo(exporter) => exporter.extra_update_params(),
            Exporter::ReactNative(exporter) => exporter.extra_update_params(),
        }
    }
}

/// Run a toolchain subprocess with captured output.
///
/// A non-zero exit surfaces the command line and the tool's stderr (falling
/// back to stdout when stderr is empty).
pub(crate) async fn run_tool(command: &mut Command) -> Result<Output> {
    let rendered = render_command(command);
    debug!("running {}", rendered);

    let output = command
        .output()
        .await
        .map_err(|e| ExportError::SubprocessFailed {
            command: rendered.clone(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&output.stdout).into_owned()
        } else {
            stderr.into_owned()
        };
        return Err(ExportError::SubprocessFailed {
            command: rendered,
            detail,
        }
        .into());
    }

    Ok(output)
}

fn render_command(command: &Command) -> String {
    let std_command = command.as_std();
    let mut rendered = std_command.get_program().to_string_lossy().into_owned();
    for arg in std_command.get_args() {
        rendered.push(' ');
        rendered.push_str(&arg.to_string_lossy());
    }
    rendered
}

/// Relative path with `/` separators, so metadata is identical across hosts
pub(crate) fn relative_unix_path(base: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(base).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_save_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut file_metadata = BTreeMap::new();
        file_metadata.insert(
            "ios".to_string(),
            PlatformBundle {
                bundle: "main.jsbundle".to_string(),
                assets: vec![AssetRef {
                    path: "ios/assets/logo.png".to_string(),
                    ext: ".png".to_string(),
                }],
            },
        );
        let metadata = UpdateMetadata {
            version: 0,
            bundler: "react-native".to_string(),
            file_metadata,
        };

        metadata.save(dir.path()).unwrap();
        let loaded = UpdateMetadata::load(dir.path()).unwrap();
        assert_eq!(loaded, metadata);

        // 2-space pretty JSON with the wire field name.
        let raw = std::fs::read_to_string(dir.path().join(METADATA_FILE_NAME)).unwrap();
        assert!(raw.contains("\"fileMetadata\""));
        assert!(raw.contains("  \"version\": 0"));
    }

    #[test]
    fn metadata_load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = UpdateMetadata::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AirliftError::Export(ExportError::MetadataMissing { .. })
        ));
    }

    #[test]
    fn metadata_load_reports_parse_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(METADATA_FILE_NAME), "{oops").unwrap();
        let err = UpdateMetadata::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AirliftError::Export(ExportError::MetadataParse { .. })
        ));
    }

    #[test]
    fn expo_metadata_shape_is_loadable() {
        // Shape the Expo CLI writes for a two-platform export.
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(METADATA_FILE_NAME),
            r#"{
  "version": 0,
  "bundler": "metro",
  "fileMetadata": {
    "android": {
      "bundle": "bundles/android-f00d.js",
      "assets": [{ "path": "assets/beef", "ext": ".ttf" }]
    },
    "ios": {
      "bundle": "bundles/ios-cafe.js",
      "assets": []
    }
  }
}"#,
        )
        .unwrap();

        let metadata = UpdateMetadata::load(dir.path()).unwrap();
        assert_eq!(metadata.bundler, "metro");
        assert_eq!(metadata.file_metadata.len(), 2);
        assert_eq!(
            metadata.file_metadata["android"].assets[0].ext,
            ".ttf".to_string()
        );
    }

    #[test]
    fn platform_identifiers_and_bundle_names() {
        assert_eq!(Platform::Ios.as_str(), "ios");
        assert_eq!(Platform::Android.bundle_name(), "index.android.bundle");
        assert_eq!(PLATFORMS[0], Platform::Ios);
    }

    #[test]
    fn relative_paths_use_forward_slashes() {
        let base = Path::new("/tmp/project/dist");
        let path = Path::new("/tmp/project/dist/android/drawable/icon.png");
        assert_eq!(relative_unix_path(base, path), "android/drawable/icon.png");
    }
}
