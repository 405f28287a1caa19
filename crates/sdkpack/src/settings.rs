//! Build settings consumed by the build driver.
//!
//! Settings are the enumerated axes a host package manager binds to a
//! recipe before invoking its lifecycle: operating system, compiler,
//! build type, and architecture. This crate consumes them; it does not
//! decide them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing a settings axis value.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("unknown {axis} '{value}', expected one of: {expected}")]
    UnknownValue {
        axis: &'static str,
        value: String,
        expected: &'static str,
    },
}

/// Target operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    #[default]
    Linux,
    Windows,
    Macos,
    /// No operating system (bare-metal firmware targets).
    Baremetal,
}

impl Os {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Macos => "macos",
            Self::Baremetal => "baremetal",
        }
    }
}

impl std::fmt::Display for Os {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Os {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            "macos" => Ok(Self::Macos),
            "baremetal" => Ok(Self::Baremetal),
            _ => Err(SettingsError::UnknownValue {
                axis: "os",
                value: s.to_string(),
                expected: "linux, windows, macos, baremetal",
            }),
        }
    }
}

/// Compiler toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Compiler {
    #[default]
    Gcc,
    Clang,
    /// GNU Arm Embedded (`arm-none-eabi-gcc`), used for the MCU SDKs.
    #[serde(rename = "arm-gcc")]
    ArmGcc,
    Msvc,
}

impl Compiler {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Clang => "clang",
            Self::ArmGcc => "arm-gcc",
            Self::Msvc => "msvc",
        }
    }

    /// C and C++ compiler executables for this toolchain, when the
    /// choice maps to concrete executables rather than a generator.
    #[must_use]
    pub fn executables(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Gcc => Some(("gcc", "g++")),
            Self::Clang => Some(("clang", "clang++")),
            Self::ArmGcc => Some(("arm-none-eabi-gcc", "arm-none-eabi-g++")),
            Self::Msvc => None,
        }
    }
}

impl std::fmt::Display for Compiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Compiler {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gcc" => Ok(Self::Gcc),
            "clang" => Ok(Self::Clang),
            "arm-gcc" => Ok(Self::ArmGcc),
            "msvc" => Ok(Self::Msvc),
            _ => Err(SettingsError::UnknownValue {
                axis: "compiler",
                value: s.to_string(),
                expected: "gcc, clang, arm-gcc, msvc",
            }),
        }
    }
}

/// CMake build type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

impl BuildType {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
            Self::RelWithDebInfo => "relwithdebinfo",
            Self::MinSizeRel => "minsizerel",
        }
    }

    /// The value passed to `CMAKE_BUILD_TYPE`.
    #[must_use]
    pub fn cmake_value(&self) -> &'static str {
        match self {
            Self::Debug => "Debug",
            Self::Release => "Release",
            Self::RelWithDebInfo => "RelWithDebInfo",
            Self::MinSizeRel => "MinSizeRel",
        }
    }
}

impl std::fmt::Display for BuildType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BuildType {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "relwithdebinfo" => Ok(Self::RelWithDebInfo),
            "minsizerel" => Ok(Self::MinSizeRel),
            _ => Err(SettingsError::UnknownValue {
                axis: "build_type",
                value: s.to_string(),
                expected: "debug, release, relwithdebinfo, minsizerel",
            }),
        }
    }
}

/// Target architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    #[default]
    X86_64,
    Aarch64,
    Armv7,
    /// Cortex-M4 class cores (the S5D9/S7G2 families).
    Armv7em,
}

impl Arch {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86_64 => "x86_64",
            Self::Aarch64 => "aarch64",
            Self::Armv7 => "armv7",
            Self::Armv7em => "armv7em",
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Arch {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x86_64" => Ok(Self::X86_64),
            "aarch64" => Ok(Self::Aarch64),
            "armv7" => Ok(Self::Armv7),
            "armv7em" => Ok(Self::Armv7em),
            _ => Err(SettingsError::UnknownValue {
                axis: "arch",
                value: s.to_string(),
                expected: "x86_64, aarch64, armv7, armv7em",
            }),
        }
    }
}

/// The full settings record bound to a recipe instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Settings {
    pub os: Os,
    pub compiler: Compiler,
    #[serde(rename = "build-type")]
    pub build_type: BuildType,
    pub arch: Arch,
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "os={} compiler={} build_type={} arch={}",
            self.os, self.compiler, self.build_type, self.arch
        )
    }
}

/// Generator declaration: which build-system integration files the host
/// must emit for this package before configuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Generator {
    /// Path-translation file mapping dependency locations into CMake
    /// variables (`cmake_paths` style).
    #[default]
    CmakePaths,
}

impl Generator {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CmakePaths => "cmake_paths",
        }
    }
}

impl std::fmt::Display for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_round_trips() {
        for os in ["linux", "windows", "macos", "baremetal"] {
            assert_eq!(os.parse::<Os>().unwrap().as_str(), os);
        }
        for compiler in ["gcc", "clang", "arm-gcc", "msvc"] {
            assert_eq!(compiler.parse::<Compiler>().unwrap().as_str(), compiler);
        }
        for arch in ["x86_64", "aarch64", "armv7", "armv7em"] {
            assert_eq!(arch.parse::<Arch>().unwrap().as_str(), arch);
        }
    }

    #[test]
    fn unknown_axis_value() {
        let err = "solaris".parse::<Os>().unwrap_err();
        assert!(err.to_string().contains("unknown os 'solaris'"));
    }

    #[test]
    fn build_type_cmake_values() {
        assert_eq!(BuildType::Release.cmake_value(), "Release");
        assert_eq!(
            "relwithdebinfo".parse::<BuildType>().unwrap().cmake_value(),
            "RelWithDebInfo"
        );
    }

    #[test]
    fn settings_from_toml() {
        let settings: Settings = toml::from_str(
            r#"
os = "baremetal"
compiler = "arm-gcc"
build-type = "minsizerel"
arch = "armv7em"
"#,
        )
        .unwrap();
        assert_eq!(settings.os, Os::Baremetal);
        assert_eq!(settings.compiler, Compiler::ArmGcc);
        assert_eq!(settings.build_type, BuildType::MinSizeRel);
        assert_eq!(settings.arch, Arch::Armv7em);
    }

    #[test]
    fn settings_default_fields_from_toml() {
        let settings: Settings = toml::from_str(r#"compiler = "clang""#).unwrap();
        assert_eq!(settings.compiler, Compiler::Clang);
        assert_eq!(settings.os, Os::Linux);
    }
}
