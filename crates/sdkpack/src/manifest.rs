//! Target manifest (`sdkpack.toml`) parsing and validation.
//!
//! The built-in targets cover the stock SDK families; a manifest lets a
//! deployment declare additional families or override the identity
//! constants of a built-in one without touching code.

use crate::recipe::Target;
use crate::settings::Settings;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// The manifest filename.
pub const MANIFEST_FILE: &str = "sdkpack.toml";

/// Errors that can occur when working with manifests.
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid target name '{0}': {1}")]
    InvalidName(String, &'static str),

    #[error("duplicate target '{0}'")]
    DuplicateTarget(String),

    #[error("invalid install subdir '{0}' for target '{1}': {2}")]
    InvalidInstallSubdir(String, String, &'static str),
}

/// The complete sdkpack.toml manifest.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Declared targets.
    #[serde(default, rename = "target")]
    pub targets: Vec<TargetEntry>,

    /// Default build settings applied when the host supplies none.
    #[serde(default)]
    pub defaults: Settings,
}

/// One target declaration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetEntry {
    /// Package name, e.g. `s5d9_sdk`.
    pub name: String,

    /// Source repository location.
    pub url: String,

    /// Short human-readable description.
    #[serde(default)]
    pub description: String,

    /// License identifier.
    #[serde(default = "default_license")]
    pub license: String,

    /// Install subdirectory; defaults to `lib/cmake/<name>`.
    #[serde(default, rename = "install-subdir")]
    pub install_subdir: Option<String>,
}

fn default_license() -> String {
    String::from("Proprietary")
}

impl Manifest {
    /// Load a manifest from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse a manifest from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a target is malformed.
    pub fn parse(content: &str) -> Result<Self, ManifestError> {
        let manifest: Self = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest.
    fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = std::collections::BTreeSet::new();

        for entry in &self.targets {
            validate_name(&entry.name)?;

            if !seen.insert(entry.name.as_str()) {
                return Err(ManifestError::DuplicateTarget(entry.name.clone()));
            }

            if let Some(subdir) = &entry.install_subdir {
                validate_install_subdir(subdir, &entry.name)?;
            }
        }

        Ok(())
    }

    /// Serialize the manifest to a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// The built-in targets merged with this manifest's declarations.
    ///
    /// A manifest entry with the same name as a built-in target replaces
    /// it; other entries are appended in declaration order.
    #[must_use]
    pub fn merged_targets(&self) -> Vec<Target> {
        let mut targets = crate::recipe::builtin_targets();

        for entry in &self.targets {
            let target = entry.to_target();
            match targets.iter_mut().find(|t| t.name == target.name) {
                Some(existing) => *existing = target,
                None => targets.push(target),
            }
        }

        targets
    }
}

impl TargetEntry {
    /// Convert the entry into an identity record.
    #[must_use]
    pub fn to_target(&self) -> Target {
        let mut target = Target::new(
            &self.name,
            &self.url,
            &self.description,
            &self.license,
        );
        if let Some(subdir) = &self.install_subdir {
            target.install_subdir = subdir.clone();
        }
        target
    }
}

fn validate_name(name: &str) -> Result<(), ManifestError> {
    if name.is_empty() {
        return Err(ManifestError::InvalidName(
            name.to_string(),
            "name cannot be empty",
        ));
    }

    if name.len() > 64 {
        return Err(ManifestError::InvalidName(
            name.to_string(),
            "name cannot exceed 64 characters",
        ));
    }

    // Must start with a letter
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphabetic()) {
        return Err(ManifestError::InvalidName(
            name.to_string(),
            "name must start with a letter",
        ));
    }

    // Only alphanumeric, hyphens, and underscores
    for c in name.chars() {
        if !c.is_ascii_alphanumeric() && c != '-' && c != '_' {
            return Err(ManifestError::InvalidName(
                name.to_string(),
                "name can only contain letters, numbers, hyphens, and underscores",
            ));
        }
    }

    Ok(())
}

fn validate_install_subdir(subdir: &str, target: &str) -> Result<(), ManifestError> {
    if subdir.is_empty() {
        return Err(ManifestError::InvalidInstallSubdir(
            subdir.to_string(),
            target.to_string(),
            "subdir cannot be empty",
        ));
    }

    let path = Path::new(subdir);
    if path.is_absolute() {
        return Err(ManifestError::InvalidInstallSubdir(
            subdir.to_string(),
            target.to_string(),
            "subdir must be relative",
        ));
    }

    if path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
        return Err(ManifestError::InvalidInstallSubdir(
            subdir.to_string(),
            target.to_string(),
            "subdir cannot traverse upward",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_manifest() {
        let manifest = Manifest::parse("").unwrap();
        assert!(manifest.targets.is_empty());
        // Built-ins survive an empty manifest.
        assert_eq!(manifest.merged_targets().len(), 2);
    }

    #[test]
    fn parse_full_manifest() {
        let toml = r#"
[defaults]
os = "baremetal"
compiler = "arm-gcc"

[[target]]
name = "s3a7_sdk"
url = "https://git.example.com/sdk/s3a7_sdk.git"
description = "SDK for Renesas S3A7"
license = "Proprietary"

[[target]]
name = "custom_sdk"
url = "https://git.example.com/sdk/custom_sdk.git"
install-subdir = "share/cmake/custom_sdk"
"#;
        let manifest = Manifest::parse(toml).unwrap();
        assert_eq!(manifest.targets.len(), 2);
        assert_eq!(manifest.defaults.compiler.as_str(), "arm-gcc");

        let merged = manifest.merged_targets();
        assert_eq!(merged.len(), 4);
        let custom = merged.iter().find(|t| t.name == "custom_sdk").unwrap();
        assert_eq!(custom.install_subdir, "share/cmake/custom_sdk");
        let s3a7 = merged.iter().find(|t| t.name == "s3a7_sdk").unwrap();
        assert_eq!(s3a7.install_subdir, "lib/cmake/s3a7_sdk");
    }

    #[test]
    fn manifest_overrides_builtin() {
        let toml = r#"
[[target]]
name = "s5d9_sdk"
url = "ssh://git@git.internal/sdk/s5d9_sdk.git"
description = "SDK for Renesas S5D9 (internal mirror)"
"#;
        let merged = Manifest::parse(toml).unwrap().merged_targets();
        assert_eq!(merged.len(), 2);
        let s5d9 = merged.iter().find(|t| t.name == "s5d9_sdk").unwrap();
        assert_eq!(s5d9.url, "ssh://git@git.internal/sdk/s5d9_sdk.git");
    }

    #[test]
    fn invalid_name_starts_with_number() {
        let toml = r#"
[[target]]
name = "5d9_sdk"
url = "https://example.com"
"#;
        let err = Manifest::parse(toml).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidName(..)));
    }

    #[test]
    fn duplicate_target_rejected() {
        let toml = r#"
[[target]]
name = "dup_sdk"
url = "https://example.com/a"

[[target]]
name = "dup_sdk"
url = "https://example.com/b"
"#;
        let err = Manifest::parse(toml).unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateTarget(..)));
    }

    #[test]
    fn absolute_install_subdir_rejected() {
        let toml = r#"
[[target]]
name = "abs_sdk"
url = "https://example.com"
install-subdir = "/usr/lib/cmake/abs_sdk"
"#;
        let err = Manifest::parse(toml).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidInstallSubdir(..)));
    }

    #[test]
    fn traversing_install_subdir_rejected() {
        let toml = r#"
[[target]]
name = "esc_sdk"
url = "https://example.com"
install-subdir = "lib/../../escape"
"#;
        let err = Manifest::parse(toml).unwrap_err();
        assert!(matches!(err, ManifestError::InvalidInstallSubdir(..)));
    }

    #[test]
    fn unknown_field_rejected() {
        let toml = r#"
[[target]]
name = "x_sdk"
url = "https://example.com"
revision = "main"
"#;
        let err = Manifest::parse(toml).unwrap_err();
        assert!(matches!(err, ManifestError::Parse(..)));
    }

    #[test]
    fn round_trip_to_toml() {
        let toml = r#"
[[target]]
name = "s3a7_sdk"
url = "https://git.example.com/sdk/s3a7_sdk.git"
"#;
        let manifest = Manifest::parse(toml).unwrap();
        let rendered = manifest.to_toml_string().unwrap();
        let reparsed = Manifest::parse(&rendered).unwrap();
        assert_eq!(reparsed.targets[0].name, "s3a7_sdk");
    }
}
