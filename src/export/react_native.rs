use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;
use tokio::process::Command;
use walkdir::WalkDir;

use super::{
    export_out_dir, hermes, relative_unix_path, run_tool, AssetRef, Platform, PlatformBundle,
    UpdateMetadata, METADATA_FILE_NAME, PLATFORMS,
};
use crate::cli::{prompt, OutputManager};
use crate::error::{ExportError, Result};
use crate::toolchain;

/// Per-platform answers gathered before the export runs
#[derive(Debug, Clone)]
struct PlatformOptions {
    entry_file: PathBuf,
    hermes_enabled: bool,
}

/// Exporter for bare React Native projects.
///
/// Drives the React Native CLI once per platform and compiles the result to
/// Hermes bytecode where the project uses Hermes.
#[derive(Debug)]
pub struct ReactNativeExporter {
    project_dir: PathBuf,
    export_dir: PathBuf,
    rn_cli: PathBuf,
    exported_bundles: BTreeMap<Platform, PathBuf>,
}

impl ReactNativeExporter {
    /// Create an exporter for a project with the React Native CLI at `rn_cli`
    pub fn new(project_dir: &Path, rn_cli: PathBuf) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            export_dir: export_out_dir(project_dir),
            rn_cli,
            exported_bundles: BTreeMap::new(),
        }
    }

    fn bundle_path(&self, platform: Platform) -> PathBuf {
        self.export_dir.join(platform.bundle_name())
    }

    fn assets_dest_dir(&self, platform: Platform) -> PathBuf {
        self.export_dir.join(platform.as_str())
    }

    fn resolve_entry_file(&self, platform: Platform) -> Option<PathBuf> {
        // TODO: honor the package.json "main" field
        let candidates = ["index.js".to_string(), format!("index.{platform}.js")];
        candidates
            .iter()
            .map(|name| self.project_dir.join(name))
            .find(|path| path.exists())
    }

    /// Figure out the entry file and JS engine for each platform, asking the
    /// user whenever the project files don't answer.
    fn resolve_platform_options(
        &self,
        output: &OutputManager,
    ) -> Result<BTreeMap<Platform, PlatformOptions>> {
        let mut options = BTreeMap::new();

        for platform in PLATFORMS {
            let entry_file = match self.resolve_entry_file(platform) {
                Some(path) => path,
                None => {
                    output.info(&format!("Could not find entry file for {platform}"));
                    PathBuf::from(prompt::input(&format!(
                        "Enter the path to the entry file for {platform}"
                    ))?)
                }
            };

            let hermes_enabled = match hermes::hermes_enabled(&self.project_dir, platform) {
                Some(enabled) => enabled,
                None => {
                    let choice = prompt::select(
                        &format!("Which JS engine do you use for {platform}?"),
                        &["Hermes", "JSC"],
                    )?;
                    choice == 0
                }
            };
            debug!(
                "hermes is {} for {platform}",
                if hermes_enabled { "enabled" } else { "disabled" }
            );

            options.insert(
                platform,
                PlatformOptions {
                    entry_file,
                    hermes_enabled,
                },
            );
        }

        Ok(options)
    }

    /// Bundle every platform into the export output directory
    pub async fn export(&mut self, output: &OutputManager) -> Result<()> {
        std::fs::create_dir_all(&self.export_dir)?;

        let options = self.resolve_platform_options(output)?;

        for (platform, options) in options {
            let bundle_path = self.bundle_path(platform);
            let assets_dest = self.assets_dest_dir(platform);

            output.progress(&format!("Exporting bundle & assets for {platform}"));
            run_tool(
                Command::new(&self.rn_cli)
                    .arg("bundle")
                    .args(["--platform", platform.as_str()])
                    .arg("--entry-file")
                    .arg(&options.entry_file)
                    .arg("--bundle-output")
                    .arg(&bundle_path)
                    .arg("--assets-dest")
                    .arg(&assets_dest)
                    // Hermes runs its own optimization pass over the bundle.
                    .args(["--minify", if options.hermes_enabled { "false" } else { "true" }])
                    .args(["--dev", "false"])
                    .current_dir(&self.project_dir),
            )
            .await?;

            if options.hermes_enabled {
                self.compile_with_hermes(&bundle_path).await?;
            }

            self.exported_bundles.insert(platform, bundle_path);
        }

        Ok(())
    }

    /// Compile a bundle to Hermes bytecode and swap it into the bundle path.
    ///
    /// The swap is a single rename, so the bundle path always holds either
    /// the full plain bundle or the full bytecode file.
    async fn compile_with_hermes(&self, bundle_path: &Path) -> Result<()> {
        let hermesc = toolchain::resolve_hermesc(&self.project_dir)?;

        let mut hbc_path = OsString::from(bundle_path.as_os_str());
        hbc_path.push(".hbc");
        let hbc_path = PathBuf::from(hbc_path);

        run_tool(
            Command::new(&hermesc)
                .arg("-emit-binary")
                .arg(bundle_path)
                .arg("-out")
                .arg(&hbc_path),
        )
        .await?;

        if let Err(e) = std::fs::rename(&hbc_path, bundle_path) {
            if let Err(cleanup) = std::fs::remove_file(&hbc_path) {
                debug!("failed to remove {}: {}", hbc_path.display(), cleanup);
            }
            return Err(e.into());
        }

        Ok(())
    }

    /// Describe the exported bundles and assets, writing the metadata file.
    ///
    /// When the export step was skipped this falls back to the metadata a
    /// previous export left in the output directory.
    pub fn resolve_bundle_and_assets(&mut self, output: &OutputManager) -> Result<UpdateMetadata> {
        if self.exported_bundles.is_empty() {
            return UpdateMetadata::load(&self.export_dir);
        }

        let mut file_metadata = BTreeMap::new();
        for platform in PLATFORMS {
            let bundle_path =
                self.exported_bundles
                    .get(&platform)
                    .ok_or_else(|| ExportError::BundleMissing {
                        platform: platform.to_string(),
                    })?;

            let bundle = relative_unix_path(&self.export_dir, bundle_path);
            let assets =
                collect_assets(&self.export_dir, &self.assets_dest_dir(platform), &bundle)?;
            file_metadata.insert(
                platform.as_str().to_string(),
                PlatformBundle { bundle, assets },
            );
        }

        let metadata = UpdateMetadata {
            version: 0,
            bundler: "react-native".to_string(),
            file_metadata,
        };

        output.progress("Writing metadata file");
        metadata.save(&self.export_dir)?;

        Ok(metadata)
    }

    /// Runtime version from package.json, prompting only when it has none
    pub fn resolve_runtime_version(&self) -> Result<String> {
        if let Some(version) = self.package_json_version() {
            return Ok(version);
        }
        Ok(prompt::input_with_default("Runtime version", "1.0.0")?)
    }

    fn package_json_version(&self) -> Option<String> {
        let path = self.project_dir.join("package.json");
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                debug!("failed to read {}: {}", path.display(), e);
                return None;
            }
        };

        let package: Value = match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                debug!("failed to parse {}: {}", path.display(), e);
                return None;
            }
        };

        package
            .get("version")
            .and_then(Value::as_str)
            .filter(|version| !version.is_empty())
            .map(str::to_string)
    }

    /// Bare React Native updates carry no extra request parameters
    pub fn extra_update_params(&self) -> serde_json::Map<String, Value> {
        serde_json::Map::new()
    }
}

/// Walk a platform's assets directory in name order, skipping the bundle and
/// metadata files.
fn collect_assets(export_dir: &Path, assets_dir: &Path, bundle_rel: &str) -> Result<Vec<AssetRef>> {
    let mut assets = Vec::new();
    if !assets_dir.exists() {
        return Ok(assets);
    }

    for entry in WalkDir::new(assets_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = relative_unix_path(export_dir, entry.path());
        if rel == bundle_rel || rel == METADATA_FILE_NAME {
            continue;
        }

        let ext = entry
            .path()
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        assets.push(AssetRef { path: rel, ext });
    }

    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn exporter_for(dir: &Path) -> ReactNativeExporter {
        ReactNativeExporter::new(dir, dir.join("node_modules/react-native/cli.js"))
    }

    #[test]
    fn entry_file_prefers_shared_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.js"), "").unwrap();
        fs::write(dir.path().join("index.ios.js"), "").unwrap();

        let exporter = exporter_for(dir.path());
        assert_eq!(
            exporter.resolve_entry_file(Platform::Ios),
            Some(dir.path().join("index.js"))
        );
    }

    #[test]
    fn entry_file_falls_back_to_platform_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.android.js"), "").unwrap();

        let exporter = exporter_for(dir.path());
        assert_eq!(
            exporter.resolve_entry_file(Platform::Android),
            Some(dir.path().join("index.android.js"))
        );
        assert_eq!(exporter.resolve_entry_file(Platform::Ios), None);
    }

    #[test]
    fn assets_walk_is_sorted_and_skips_directories() {
        let dir = tempfile::tempdir().unwrap();
        let export_dir = dir.path().join("dist");
        let android = export_dir.join("android");
        fs::create_dir_all(android.join("img")).unwrap();
        fs::create_dir_all(android.join("raw")).unwrap();
        fs::write(android.join("img/b.png"), "b").unwrap();
        fs::write(android.join("img/a.png"), "a").unwrap();
        fs::write(android.join("raw/sound.mp3"), "s").unwrap();
        fs::write(android.join("LICENSE"), "l").unwrap();

        let assets = collect_assets(&export_dir, &android, "index.android.bundle").unwrap();
        let paths: Vec<&str> = assets.iter().map(|a| a.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "android/LICENSE",
                "android/img/a.png",
                "android/img/b.png",
                "android/raw/sound.mp3",
            ]
        );
        assert_eq!(assets[0].ext, "");
        assert_eq!(assets[1].ext, ".png");
    }

    #[test]
    fn metadata_covers_every_exported_platform() {
        let dir = tempfile::tempdir().unwrap();
        let exporter_dir = dir.path();
        let export_dir = exporter_dir.join("dist");
        fs::create_dir_all(export_dir.join("ios")).unwrap();
        fs::create_dir_all(export_dir.join("android")).unwrap();
        fs::write(export_dir.join("main.jsbundle"), "ios bundle").unwrap();
        fs::write(export_dir.join("index.android.bundle"), "android bundle").unwrap();
        fs::write(export_dir.join("ios/logo.png"), "png").unwrap();

        let mut exporter = exporter_for(exporter_dir);
        for platform in PLATFORMS {
            exporter
                .exported_bundles
                .insert(platform, export_dir.join(platform.bundle_name()));
        }

        let output = OutputManager::new(true);
        let metadata = exporter.resolve_bundle_and_assets(&output).unwrap();
        assert_eq!(metadata.bundler, "react-native");
        assert_eq!(metadata.file_metadata["ios"].bundle, "main.jsbundle");
        assert_eq!(metadata.file_metadata["ios"].assets.len(), 1);
        assert_eq!(
            metadata.file_metadata["android"].bundle,
            "index.android.bundle"
        );
        assert!(metadata.file_metadata["android"].assets.is_empty());

        assert!(export_dir.join(METADATA_FILE_NAME).exists());
    }

    #[test]
    fn resolving_twice_writes_identical_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let export_dir = dir.path().join("dist");
        fs::create_dir_all(export_dir.join("ios")).unwrap();
        fs::create_dir_all(export_dir.join("android")).unwrap();
        fs::write(export_dir.join("main.jsbundle"), "ios bundle").unwrap();
        fs::write(export_dir.join("index.android.bundle"), "android bundle").unwrap();
        fs::write(export_dir.join("ios/logo.png"), "png").unwrap();
        fs::write(export_dir.join("android/logo.png"), "png").unwrap();

        let mut exporter = exporter_for(dir.path());
        for platform in PLATFORMS {
            exporter
                .exported_bundles
                .insert(platform, export_dir.join(platform.bundle_name()));
        }

        let output = OutputManager::new(true);
        let first = exporter.resolve_bundle_and_assets(&output).unwrap();
        let first_bytes = fs::read(export_dir.join(METADATA_FILE_NAME)).unwrap();
        let second = exporter.resolve_bundle_and_assets(&output).unwrap();
        let second_bytes = fs::read(export_dir.join(METADATA_FILE_NAME)).unwrap();

        assert_eq!(second, first);
        assert_eq!(second_bytes, first_bytes);
    }

    #[test]
    fn partial_exports_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = exporter_for(dir.path());
        exporter
            .exported_bundles
            .insert(Platform::Ios, dir.path().join("dist/main.jsbundle"));

        let output = OutputManager::new(true);
        let err = exporter.resolve_bundle_and_assets(&output).unwrap_err();
        assert!(err.to_string().contains("android"));
    }

    #[test]
    fn skipped_export_reuses_previous_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let export_dir = dir.path().join("dist");
        fs::create_dir_all(&export_dir).unwrap();
        let previous = UpdateMetadata {
            version: 0,
            bundler: "react-native".to_string(),
            file_metadata: BTreeMap::new(),
        };
        previous.save(&export_dir).unwrap();

        let mut exporter = exporter_for(dir.path());
        let output = OutputManager::new(true);
        let metadata = exporter.resolve_bundle_and_assets(&output).unwrap();
        assert_eq!(metadata, previous);
    }

    #[test]
    fn runtime_version_comes_from_package_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"version": "4.2.0"}"#).unwrap();

        let exporter = exporter_for(dir.path());
        assert_eq!(exporter.resolve_runtime_version().unwrap(), "4.2.0");
    }

    #[test]
    fn empty_package_version_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("package.json"), r#"{"version": ""}"#).unwrap();

        let exporter = exporter_for(dir.path());
        assert_eq!(exporter.package_json_version(), None);
    }
}
