//! Locates project-installed toolchain binaries.
//!
//! Everything resolves relative to the project's `node_modules` directories
//! the way Node's own resolution does, walking up from the project root.
//! `$PATH` is never consulted: the CLI must run the project's pinned tools.

use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{Result, ToolchainError};

/// Environment variable pointing at a locally built Hermes distribution
pub const HERMES_OVERRIDE_ENV: &str = "REACT_NATIVE_OVERRIDE_HERMES_DIR";

/// Resolve a module-relative path against the project's `node_modules`.
///
/// Checks `<dir>/node_modules/<module_path>` for the project directory and
/// each ancestor, returning the first hit. Absolute candidates are checked
/// as plain paths.
pub fn resolve_from(project_dir: &Path, module_path: &str) -> Option<PathBuf> {
    let candidate = Path::new(module_path);
    if candidate.is_absolute() {
        return candidate.exists().then(|| candidate.to_path_buf());
    }

    for dir in project_dir.ancestors() {
        let resolved = dir.join("node_modules").join(candidate);
        if resolved.exists() {
            debug!("resolved {} to {}", module_path, resolved.display());
            return Some(resolved);
        }
    }

    None
}

/// Try each candidate in order and return the first that resolves
pub fn locate<'a>(
    project_dir: &Path,
    tool: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Result<PathBuf> {
    for candidate in candidates {
        if let Some(path) = resolve_from(project_dir, candidate) {
            return Ok(path);
        }
    }

    Err(ToolchainError::ToolNotFound {
        tool: tool.to_string(),
        project_dir: project_dir.to_path_buf(),
    }
    .into())
}

/// Locate the Expo CLI entry point installed in the project
pub fn resolve_expo_cli(project_dir: &Path) -> Result<PathBuf> {
    locate(project_dir, "Expo CLI", ["expo/bin/cli", "expo/bin/cli.js"])
}

/// Locate the React Native CLI entry point installed in the project
pub fn resolve_react_native_cli(project_dir: &Path) -> Result<PathBuf> {
    locate(project_dir, "React Native CLI", ["react-native/cli.js"])
}

/// Locate the Hermes compiler shipped with the project's react-native.
///
/// The override environment variable wins when set; otherwise the candidates
/// cover the locations react-native has shipped hermesc in over the years.
pub fn resolve_hermesc(project_dir: &Path) -> Result<PathBuf> {
    let host_bin = hermesc_host_bin()?;

    let mut candidates: Vec<String> = Vec::new();
    if let Ok(dir) = std::env::var(HERMES_OVERRIDE_ENV)
        && !dir.is_empty()
    {
        candidates.push(format!("{}/build/bin/hermesc", dir));
    }
    candidates.push("react-native/ReactAndroid/hermes-engine/build/hermes/bin/hermesc".to_string());
    candidates.push(format!("react-native/sdks/hermesc/{}", host_bin));
    candidates.push(format!("hermes-engine/{}", host_bin));

    locate(project_dir, "hermesc", candidates.iter().map(String::as_str))
}

fn hermesc_host_bin() -> Result<&'static str> {
    if cfg!(target_os = "macos") {
        Ok("osx-bin/hermesc")
    } else if cfg!(target_os = "linux") {
        Ok("linux64-bin/hermesc")
    } else if cfg!(target_os = "windows") {
        Ok("win64-bin/hermesc.exe")
    } else {
        Err(ToolchainError::UnsupportedHostPlatform {
            os: std::env::consts::OS.to_string(),
        }
        .into())
    }
}
