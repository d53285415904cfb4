//! Build event types for JSON output.
//!
//! This module defines the JSON schema for machine-readable build output.
//! These events are emitted when using `--message-format=json`.
//!
//! # Event Types
//!
//! - `build-started`: The pipeline started for a package
//! - `source-file`: A source module was classified
//! - `modules-compiled`: One bundler pass finished
//! - `declarations-emitted`: The declaration pass finished
//! - `manifest-updated`: The manifest was synthesized
//! - `build-finished`: Build completed (success or failure)
//!
//! New fields may be added, but existing fields should not be removed or renamed.

use std::path::PathBuf;

use serde::Serialize;

/// A build event emitted during the build process.
///
/// Each event is serialized as a single JSON object per line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    /// Build started event with metadata.
    #[serde(rename = "build-started")]
    BuildStarted {
        /// Package name from the manifest
        #[serde(skip_serializing_if = "Option::is_none")]
        package: Option<String>,
        /// Output directory
        out_dir: String,
        /// Whether a CommonJS tree is produced next to the ESM tree
        dual: bool,
    },

    /// A classified source module.
    #[serde(rename = "source-file")]
    SourceFile {
        /// Path relative to the package root
        path: String,
        /// Excluded from the build
        ignored: bool,
    },

    /// A bundler pass finished.
    #[serde(rename = "modules-compiled")]
    ModulesCompiled {
        /// `es` or `cjs`
        format: String,
        /// Output tree
        out_dir: PathBuf,
        /// Number of entry modules
        inputs: usize,
    },

    /// Declarations were emitted.
    #[serde(rename = "declarations-emitted")]
    DeclarationsEmitted {
        /// Types tree
        out_dir: PathBuf,
    },

    /// The manifest was synthesized.
    #[serde(rename = "manifest-updated")]
    ManifestUpdated {
        /// Manifest path
        path: PathBuf,
        /// Whether the file contents changed
        changed: bool,
        /// Number of `exports` entries
        exports: usize,
    },

    /// Build completed (success or failure).
    #[serde(rename = "build-finished")]
    BuildFinished {
        /// Whether the build succeeded
        success: bool,
        /// Total build duration in milliseconds
        duration_ms: u64,
    },
}

impl BuildEvent {
    /// Create a build started event.
    pub fn started(package: Option<&str>, out_dir: impl Into<String>, dual: bool) -> Self {
        BuildEvent::BuildStarted {
            package: package.map(str::to_string),
            out_dir: out_dir.into(),
            dual,
        }
    }

    /// Create a source file event.
    pub fn source(path: impl Into<String>, ignored: bool) -> Self {
        BuildEvent::SourceFile {
            path: path.into(),
            ignored,
        }
    }

    /// Create a modules compiled event.
    pub fn compiled(format: impl Into<String>, out_dir: impl Into<PathBuf>, inputs: usize) -> Self {
        BuildEvent::ModulesCompiled {
            format: format.into(),
            out_dir: out_dir.into(),
            inputs,
        }
    }

    /// Create a declarations emitted event.
    pub fn declarations(out_dir: impl Into<PathBuf>) -> Self {
        BuildEvent::DeclarationsEmitted {
            out_dir: out_dir.into(),
        }
    }

    /// Create a manifest updated event.
    pub fn manifest(path: impl Into<PathBuf>, changed: bool, exports: usize) -> Self {
        BuildEvent::ManifestUpdated {
            path: path.into(),
            changed,
            exports,
        }
    }

    /// Create a build finished event.
    pub fn finished(success: bool, duration_ms: u64) -> Self {
        BuildEvent::BuildFinished {
            success,
            duration_ms,
        }
    }

    /// Convert to a JSON value for [`Shell::json_event`](crate::util::shell::Shell::json_event).
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
