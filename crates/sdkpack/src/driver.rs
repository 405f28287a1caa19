//! External build-driver contract and its CMake implementation.
//!
//! A driver offers exactly one entry point, `configure`, which yields a
//! handle exposing the three follow-up steps: `build`, `test`, and
//! `install`. Driver failures are reported as-is; nothing in this crate
//! retries or translates them.

use crate::settings::{Generator, Settings};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Errors from the build driver.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The driver executable could not be spawned at all.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// The driver ran and reported failure.
    #[error("{tool} failed with {status}")]
    Failed {
        tool: String,
        status: std::process::ExitStatus,
    },

    /// The build directory could not be created.
    #[error("failed to create build directory {path}: {source}")]
    BuildDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ambient inputs to a configure step: directories, settings, and any
/// extra cache definitions supplied by the host.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub install_dir: Option<PathBuf>,
    pub settings: Settings,
    pub generator: Generator,
    pub defines: Vec<(String, String)>,
}

impl BuildContext {
    /// Create a context for `source_dir`, building into `build_dir`.
    pub fn new(source_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            build_dir: build_dir.into(),
            install_dir: None,
            settings: Settings::default(),
            generator: Generator::default(),
            defines: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_install_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.install_dir = Some(dir.into());
        self
    }

    /// Add an extra cache definition (`-D<key>=<value>`).
    #[must_use]
    pub fn with_define(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defines.push((key.into(), value.into()));
        self
    }
}

/// A configured build, ready for one of the three follow-up steps.
pub trait ConfiguredBuild {
    /// Compile the project.
    fn build(&self) -> Result<(), DriverError>;

    /// Run the project's test suite.
    fn test(&self) -> Result<(), DriverError>;

    /// Install build artifacts into the staging layout.
    fn install(&self) -> Result<(), DriverError>;
}

/// The external build driver: configure, then act on the handle.
pub trait BuildDriver {
    type Handle: ConfiguredBuild;

    /// Run the configure step for `ctx` and return a handle for the
    /// follow-up steps.
    fn configure(&self, ctx: &BuildContext) -> Result<Self::Handle, DriverError>;
}

/// Driver that shells out to `cmake` and `ctest`.
#[derive(Debug, Clone)]
pub struct CmakeDriver {
    cmake: PathBuf,
    ctest: PathBuf,
}

impl Default for CmakeDriver {
    fn default() -> Self {
        Self {
            cmake: PathBuf::from("cmake"),
            ctest: PathBuf::from("ctest"),
        }
    }
}

impl CmakeDriver {
    /// Use specific `cmake`/`ctest` executables instead of the ones on
    /// `PATH`.
    pub fn with_executables(cmake: impl Into<PathBuf>, ctest: impl Into<PathBuf>) -> Self {
        Self {
            cmake: cmake.into(),
            ctest: ctest.into(),
        }
    }
}

impl BuildDriver for CmakeDriver {
    type Handle = CmakeBuild;

    fn configure(&self, ctx: &BuildContext) -> Result<CmakeBuild, DriverError> {
        std::fs::create_dir_all(&ctx.build_dir).map_err(|source| DriverError::BuildDir {
            path: ctx.build_dir.clone(),
            source,
        })?;

        let mut cmd = Command::new(&self.cmake);
        cmd.args(configure_args(ctx));
        run_checked(&self.cmake, &mut cmd)?;

        Ok(CmakeBuild {
            cmake: self.cmake.clone(),
            ctest: self.ctest.clone(),
            build_dir: ctx.build_dir.clone(),
        })
    }
}

/// Handle to a configured CMake build tree.
#[derive(Debug, Clone)]
pub struct CmakeBuild {
    cmake: PathBuf,
    ctest: PathBuf,
    build_dir: PathBuf,
}

impl CmakeBuild {
    /// The configured build tree.
    #[must_use]
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }
}

impl ConfiguredBuild for CmakeBuild {
    fn build(&self) -> Result<(), DriverError> {
        let mut cmd = Command::new(&self.cmake);
        cmd.arg("--build").arg(&self.build_dir);
        run_checked(&self.cmake, &mut cmd)
    }

    fn test(&self) -> Result<(), DriverError> {
        let mut cmd = Command::new(&self.ctest);
        cmd.arg("--test-dir")
            .arg(&self.build_dir)
            .arg("--output-on-failure");
        run_checked(&self.ctest, &mut cmd)
    }

    fn install(&self) -> Result<(), DriverError> {
        let mut cmd = Command::new(&self.cmake);
        cmd.arg("--install").arg(&self.build_dir);
        run_checked(&self.cmake, &mut cmd)
    }
}

/// Assemble the argument list for a configure invocation.
fn configure_args(ctx: &BuildContext) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        OsString::from("-S"),
        ctx.source_dir.clone().into_os_string(),
        OsString::from("-B"),
        ctx.build_dir.clone().into_os_string(),
    ];

    let mut define = |key: &str, value: &str| {
        args.push(OsString::from(format!("-D{key}={value}")));
    };

    define("CMAKE_BUILD_TYPE", ctx.settings.build_type.cmake_value());

    if let Some((cc, cxx)) = ctx.settings.compiler.executables() {
        define("CMAKE_C_COMPILER", cc);
        define("CMAKE_CXX_COMPILER", cxx);
    }

    // Cross builds for bare-metal targets need the system name pinned so
    // CMake skips host-executable checks.
    if ctx.settings.os == crate::settings::Os::Baremetal {
        define("CMAKE_SYSTEM_NAME", "Generic");
        define("CMAKE_SYSTEM_PROCESSOR", ctx.settings.arch.as_str());
    }

    for (key, value) in &ctx.defines {
        args.push(OsString::from(format!("-D{key}={value}")));
    }

    if let Some(install_dir) = &ctx.install_dir {
        let mut arg = OsString::from("-DCMAKE_INSTALL_PREFIX=");
        arg.push(install_dir);
        args.push(arg);
    }

    args
}

fn run_checked(tool: &Path, cmd: &mut Command) -> Result<(), DriverError> {
    let status = cmd.status().map_err(|source| DriverError::Spawn {
        tool: tool.display().to_string(),
        source,
    })?;

    if !status.success() {
        return Err(DriverError::Failed {
            tool: tool.display().to_string(),
            status,
        });
    }

    Ok(())
}
