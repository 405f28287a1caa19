//! Best-effort version extraction from CMake project files.
//!
//! Vendor SDK trees carry their version inside the top-level
//! `CMakeLists.txt` (`project(x VERSION 1.2.3 LANGUAGES CXX)`), so the
//! recipe reads it out with a regular expression instead of duplicating
//! it in a manifest. Version metadata is descriptive, not load-bearing:
//! every failure in this path resolves to `None`, never an error.

use regex::Regex;
use std::path::Path;

/// The conventional CMake project file name.
pub const CMAKE_PROJECT_FILE: &str = "CMakeLists.txt";

/// Default extraction pattern, matching the `project()` form used by the
/// packaged SDKs. Requires the `LANGUAGES` clause to follow the version.
pub const DEFAULT_VERSION_PATTERN: &str = "VERSION (.*) LANGUAGES";

/// A configurable version-extraction pattern.
///
/// The pattern is an ordinary regex whose first capture group is the
/// version value. It is compiled at extraction time so that an invalid
/// pattern degrades to "no version" like every other failure here.
#[derive(Debug, Clone)]
pub struct VersionPattern {
    pattern: String,
}

impl VersionPattern {
    /// Create a pattern from a regex with one capture group.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// The underlying regex source.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Extract a version from project-file content.
    ///
    /// Returns the first capture group with surrounding whitespace
    /// stripped, or `None` if the pattern is invalid, does not match, or
    /// captures only whitespace.
    #[must_use]
    pub fn extract(&self, content: &str) -> Option<String> {
        let re = Regex::new(&self.pattern).ok()?;
        let captures = re.captures(content)?;
        let value = captures.get(1)?.as_str().trim();
        if value.is_empty() {
            return None;
        }
        Some(value.to_string())
    }

    /// Extract a version from a project file on disk.
    ///
    /// A missing or unreadable file yields `None`.
    #[must_use]
    pub fn extract_from_file(&self, path: impl AsRef<Path>) -> Option<String> {
        let content = std::fs::read_to_string(path).ok()?;
        self.extract(&content)
    }
}

impl Default for VersionPattern {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION_PATTERN)
    }
}

/// Resolve the version of the project rooted at `dir` using the default
/// pattern against `CMakeLists.txt`.
#[must_use]
pub fn resolve_version(dir: impl AsRef<Path>) -> Option<String> {
    VersionPattern::default().extract_from_file(dir.as_ref().join(CMAKE_PROJECT_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn extract_from_project_line() {
        let content = "cmake_minimum_required(VERSION 3.16)\nproject(x VERSION 1.2.3 LANGUAGES CXX)\n";
        let version = VersionPattern::default().extract(content);
        assert_eq!(version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn extract_strips_whitespace() {
        let content = "project(sdk VERSION   2.0.0-rc1   LANGUAGES C)";
        let version = VersionPattern::default().extract(content);
        assert_eq!(version.as_deref(), Some("2.0.0-rc1"));
    }

    #[test]
    fn no_version_clause_is_absent() {
        let content = "cmake_minimum_required(VERSION 3.16)\nproject(x)\n";
        assert_eq!(VersionPattern::default().extract(content), None);
    }

    #[test]
    fn whitespace_only_capture_is_absent() {
        let content = "VERSION  LANGUAGES";
        assert_eq!(VersionPattern::default().extract(content), None);
    }

    #[test]
    fn invalid_pattern_is_absent() {
        let pattern = VersionPattern::new("VERSION ([unclosed");
        assert_eq!(pattern.extract("VERSION 1.0 LANGUAGES"), None);
    }

    #[test]
    fn custom_pattern_without_languages_clause() {
        // Some project files omit LANGUAGES; callers can widen the pattern.
        let pattern = VersionPattern::new(r"VERSION\s+([0-9][^\s)]*)");
        let content = "project(sdk VERSION 3.1.4)";
        assert_eq!(pattern.extract(content).as_deref(), Some("3.1.4"));
    }

    #[test]
    fn resolve_from_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CMAKE_PROJECT_FILE),
            "project(s5d9_sdk VERSION 1.7.8 LANGUAGES C CXX ASM)",
        )
        .unwrap();
        assert_eq!(resolve_version(tmp.path()).as_deref(), Some("1.7.8"));
    }

    #[test]
    fn resolve_missing_file_is_absent() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(resolve_version(tmp.path()), None);
    }
}
