//! Test fixtures for common test scenarios.
//!
//! This module provides pre-built package manifests and source trees
//! for tests that need a package on disk.

use std::path::{Path, PathBuf};

/// A basic package manifest with one runtime dependency.
pub const PACKAGE_JSON: &str = r#"{
  "name": "my-lib",
  "version": "1.0.0",
  "description": "A library",
  "scripts": {
    "build": "shipwright build --cjs"
  },
  "dependencies": {
    "lodash": "^4.17.21"
  },
  "devDependencies": {
    "typescript": "^5.4.0"
  }
}
"#;

/// Minimal TypeScript module body.
pub const MODULE_SOURCE: &str = "export const value = 1\n";

/// Write `package.json` with `contents` into `dir` and return its path.
pub fn write_package(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("package.json");
    std::fs::write(&path, contents).expect("failed to write package.json fixture");
    path
}

/// Create each of `paths` (relative to `root`) as a small module.
pub fn write_sources(root: &Path, paths: &[&str]) {
    for path in paths {
        let full = root.join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("failed to create source directory");
        }
        std::fs::write(&full, MODULE_SOURCE).expect("failed to write source fixture");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_package_fixture_is_valid_json() {
        let value: serde_json::Value = serde_json::from_str(PACKAGE_JSON).unwrap();
        assert_eq!(value["name"], "my-lib");
    }

    #[test]
    fn test_write_sources_creates_dirs() {
        let tmp = TempDir::new().unwrap();
        write_sources(tmp.path(), &["src/a/b/index.ts"]);
        assert!(tmp.path().join("src/a/b/index.ts").is_file());
    }
}
