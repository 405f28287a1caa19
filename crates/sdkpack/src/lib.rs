//! Packaging recipes for CMake-based vendor SDKs.
//!
//! This crate provides:
//! - Recipe descriptors for the packaged SDK families (identity
//!   metadata plus the build/test/package lifecycle)
//! - Best-effort version extraction from `CMakeLists.txt`
//! - The build-driver contract and a process-spawning CMake driver
//! - Parsing and validation of `sdkpack.toml` target manifests

mod driver;
mod manifest;
mod recipe;
mod scm;
mod settings;
mod version;

pub use driver::{
    BuildContext, BuildDriver, CmakeBuild, CmakeDriver, ConfiguredBuild, DriverError,
};
pub use manifest::{Manifest, ManifestError, TargetEntry, MANIFEST_FILE};
pub use recipe::{builtin_targets, find_target, Metadata, PackageInfo, Recipe, Target};
pub use scm::{Scm, ScmKind, AUTO};
pub use settings::{
    Arch, BuildType, Compiler, Generator, Os, Settings, SettingsError,
};
pub use version::{
    resolve_version, VersionPattern, CMAKE_PROJECT_FILE, DEFAULT_VERSION_PATTERN,
};
