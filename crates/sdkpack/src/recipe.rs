//! Packaging recipes: identity metadata plus the build lifecycle.
//!
//! A recipe is the adapter between the host package manager's lifecycle
//! contract and the build driver's configure/build/test/install
//! sequence. One recipe instance exists per host invocation; nothing is
//! persisted across invocations. The supported SDK families share the
//! same lifecycle and differ only in their identity constants, so they
//! are expressed as [`Target`] records rather than per-family code.

use crate::driver::{BuildContext, BuildDriver, ConfiguredBuild, DriverError};
use crate::scm::Scm;
use crate::settings::{Generator, Settings};
use crate::version::VersionPattern;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Identity constants for one packaged SDK family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Package name, e.g. `s5d9_sdk`.
    pub name: String,

    /// Source repository location.
    pub url: String,

    /// Short human-readable description.
    pub description: String,

    /// License identifier.
    pub license: String,

    /// Relative path where installed CMake config files land, declared
    /// to downstream consumers by `package_info`.
    pub install_subdir: String,
}

impl Target {
    /// Create a target whose install subdirectory follows the
    /// `lib/cmake/<name>` convention.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        description: impl Into<String>,
        license: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let install_subdir = format!("lib/cmake/{name}");
        Self {
            name,
            url: url.into(),
            description: description.into(),
            license: license.into(),
            install_subdir,
        }
    }
}

/// The SDK families packaged out of the box.
#[must_use]
pub fn builtin_targets() -> Vec<Target> {
    vec![
        Target::new(
            "s5d9_sdk",
            "https://git.example.com/sdk/s5d9_sdk.git",
            "SDK for Renesas S5D9",
            "Proprietary",
        ),
        Target::new(
            "s7g2_sdk",
            "https://git.example.com/sdk/s7g2_sdk.git",
            "SDK for Renesas S7G2",
            "Proprietary",
        ),
    ]
}

/// Look up a target by package name.
#[must_use]
pub fn find_target<'a>(targets: &'a [Target], name: &str) -> Option<&'a Target> {
    targets.iter().find(|t| t.name == name)
}

/// Post-install metadata declared for downstream consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    /// Relative paths where build-system integration files are
    /// installed.
    pub builddirs: Vec<String>,
}

/// Identity summary of a recipe, as reported to the host.
#[derive(Debug, Clone, Serialize)]
pub struct Metadata {
    pub name: String,
    pub version: Option<String>,
    pub license: String,
    pub url: String,
    pub description: String,
    pub settings: Settings,
    pub generator: String,
    pub short_paths: bool,
}

/// A package recipe bound to one target and one settings record.
///
/// Construction binds the identity constants and ambient settings; the
/// version is resolved lazily from the project file on first access and
/// is the only field computed after construction.
#[derive(Debug)]
pub struct Recipe {
    target: Target,
    settings: Settings,
    generator: Generator,
    short_paths: bool,
    scm: Scm,
    source_dir: PathBuf,
    build_dir: PathBuf,
    install_dir: Option<PathBuf>,
    pattern: VersionPattern,
    version: OnceLock<Option<String>>,
}

impl Recipe {
    /// Create a recipe for `target` with sources in `source_dir`.
    pub fn new(target: Target, source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        let build_dir = source_dir.join("build");
        Self {
            target,
            settings: Settings::default(),
            generator: Generator::default(),
            short_paths: true,
            scm: Scm::default(),
            source_dir,
            build_dir,
            install_dir: None,
            pattern: VersionPattern::default(),
            version: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_build_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    /// Override the version-extraction pattern.
    #[must_use]
    pub fn with_version_pattern(mut self, pattern: VersionPattern) -> Self {
        self.pattern = pattern;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.target.name
    }

    #[must_use]
    pub fn license(&self) -> &str {
        &self.target.license
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.target.url
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.target.description
    }

    #[must_use]
    pub fn settings(&self) -> Settings {
        self.settings
    }

    #[must_use]
    pub fn generator(&self) -> Generator {
        self.generator
    }

    #[must_use]
    pub fn short_paths(&self) -> bool {
        self.short_paths
    }

    #[must_use]
    pub fn scm(&self) -> &Scm {
        &self.scm
    }

    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// The recipe version, extracted from the project file on first
    /// access. Absent when extraction fails for any reason.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version
            .get_or_init(|| {
                self.pattern.extract_from_file(
                    self.source_dir.join(crate::version::CMAKE_PROJECT_FILE),
                )
            })
            .as_deref()
    }

    /// The version as a strict semantic version, when it parses as one.
    #[must_use]
    pub fn semver(&self) -> Option<semver::Version> {
        self.version().and_then(|v| semver::Version::parse(v).ok())
    }

    /// The source-control binding with `auto` fields resolved from the
    /// working copy, best-effort.
    #[must_use]
    pub fn resolved_scm(&self) -> Scm {
        self.scm.resolve(&self.source_dir)
    }

    /// Identity summary for the host.
    #[must_use]
    pub fn metadata(&self) -> Metadata {
        Metadata {
            name: self.target.name.clone(),
            version: self.version().map(str::to_string),
            license: self.target.license.clone(),
            url: self.target.url.clone(),
            description: self.target.description.clone(),
            settings: self.settings,
            generator: self.generator.to_string(),
            short_paths: self.short_paths,
        }
    }

    /// The configure inputs derived from this recipe's bound state.
    #[must_use]
    pub fn build_context(&self) -> BuildContext {
        let mut ctx = BuildContext::new(&self.source_dir, &self.build_dir)
            .with_settings(self.settings);
        if let Some(install_dir) = &self.install_dir {
            ctx = ctx.with_install_dir(install_dir);
        }
        ctx.generator = self.generator;
        ctx
    }

    /// Configure, then compile.
    ///
    /// Configure is re-derived on every lifecycle call; it is never
    /// cached across calls.
    pub fn build<D: BuildDriver>(&self, driver: &D) -> Result<(), DriverError> {
        let handle = driver.configure(&self.build_context())?;
        handle.build()
    }

    /// Configure, then run the SDK's test suite.
    pub fn test<D: BuildDriver>(&self, driver: &D) -> Result<(), DriverError> {
        let handle = driver.configure(&self.build_context())?;
        handle.test()
    }

    /// Configure, then install artifacts into the staging layout.
    pub fn package<D: BuildDriver>(&self, driver: &D) -> Result<(), DriverError> {
        let handle = driver.configure(&self.build_context())?;
        handle.install()
    }

    /// Declare where installed CMake config files can be found.
    ///
    /// Metadata only, no filesystem action: exactly one build directory,
    /// `lib/cmake/<name>` for this target.
    #[must_use]
    pub fn package_info(&self) -> PackageInfo {
        PackageInfo {
            builddirs: vec![self.target.install_subdir.clone()],
        }
    }
}
