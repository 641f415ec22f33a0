//! Hermes engine detection for bare React Native projects.
//!
//! Whether a project ships Hermes bytecode is buried in per-platform build
//! config: the iOS Podfile and the Android `gradle.properties`. Detection is
//! best-effort; when the files don't say, the caller asks the user.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::Platform;

/// React Native version that flipped the Podfile default to Hermes on
const HERMES_DEFAULT_VERSION: &str = "0.70.0";

static PODFILE_HERMES_DISABLED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*:hermes_enabled\s*=>\s*false,?\s+")
        .expect("Podfile hermes-disabled regex is valid")
});

static PODFILE_HERMES_ENABLED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\s*:hermes_enabled\s*=>\s*true,?\s+")
        .expect("Podfile hermes-enabled regex is valid")
});

/// Determine from build config whether a platform uses Hermes.
///
/// `None` means the config doesn't say, not that Hermes is off.
pub fn hermes_enabled(project_dir: &Path, platform: Platform) -> Option<bool> {
    match platform {
        Platform::Ios => podfile_hermes_enabled(project_dir),
        Platform::Android => gradle_hermes_enabled(project_dir),
    }
}

/// iOS: the Podfile toggles Hermes with a `:hermes_enabled` flag, and the
/// default without the flag depends on the React Native version.
fn podfile_hermes_enabled(project_dir: &Path) -> Option<bool> {
    let podfile_path = project_dir.join("ios").join("Podfile");
    if !podfile_path.exists() {
        return None;
    }

    let podfile = match std::fs::read_to_string(&podfile_path) {
        Ok(content) => content,
        Err(e) => {
            debug!("failed to read {}: {}", podfile_path.display(), e);
            return None;
        }
    };

    let rn_version = react_native_version(project_dir)?;
    if compare_versions(&rn_version, HERMES_DEFAULT_VERSION) >= 0 {
        // Hermes by default unless explicitly disabled.
        Some(!PODFILE_HERMES_DISABLED_RE.is_match(&podfile))
    } else if PODFILE_HERMES_ENABLED_RE.is_match(&podfile) {
        Some(true)
    } else {
        None
    }
}

/// Android: `gradle.properties` only answers when it says `hermesEnabled=true`
fn gradle_hermes_enabled(project_dir: &Path) -> Option<bool> {
    let properties_path = project_dir.join("android").join("gradle.properties");
    if !properties_path.exists() {
        return None;
    }

    let content = match std::fs::read_to_string(&properties_path) {
        Ok(content) => content,
        Err(e) => {
            debug!("failed to read {}: {}", properties_path.display(), e);
            return None;
        }
    };

    let properties = parse_gradle_properties(&content);
    match properties.get("hermesEnabled") {
        Some(value) if value == "true" => Some(true),
        _ => None,
    }
}

/// React Native version declared in the project's package.json dependencies
fn react_native_version(project_dir: &Path) -> Option<String> {
    let package_json_path = project_dir.join("package.json");
    let content = match std::fs::read_to_string(&package_json_path) {
        Ok(content) => content,
        Err(e) => {
            debug!("failed to read {}: {}", package_json_path.display(), e);
            return None;
        }
    };

    let package: serde_json::Value = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            debug!("failed to parse {}: {}", package_json_path.display(), e);
            return None;
        }
    };

    package
        .pointer("/dependencies/react-native")
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

/// Parse `key=value` lines, skipping comments and blank lines.
///
/// Values keep their whitespace and any further `=` characters.
fn parse_gradle_properties(content: &str) -> HashMap<String, String> {
    let mut properties = HashMap::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = trimmed.split_once('=') {
            properties.insert(key.to_string(), value.to_string());
        }
    }
    properties
}

/// Compare dotted versions numerically, ignoring range operators like `^`.
///
/// Missing segments count as zero, so `"0.70"` equals `"0.70.0"`.
fn compare_versions(a: &str, b: &str) -> i32 {
    let a_parts = numeric_parts(a);
    let b_parts = numeric_parts(b);
    let len = a_parts.len().max(b_parts.len());

    for i in 0..len {
        let x = a_parts.get(i).copied().unwrap_or(0);
        let y = b_parts.get(i).copied().unwrap_or(0);
        if x != y {
            return if x > y { 1 } else { -1 };
        }
    }
    0
}

fn numeric_parts(version: &str) -> Vec<u64> {
    version
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect::<String>()
        .split('.')
        .map(|part| part.parse().unwrap_or(0))
        .collect()
}
