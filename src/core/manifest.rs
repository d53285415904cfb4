//! `package.json` handling.
//!
//! The manifest is kept as an ordered JSON object so that a rewrite touches
//! only the fields we own. Indentation, line endings and the trailing newline
//! of the original file are carried through to the rewritten file.

use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use miette::Diagnostic as MietteDiagnostic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "package.json";

/// Indentation used when the manifest has no indented line.
pub const DEFAULT_INDENT: &str = "  ";

/// Fields computed from the build layout. They are removed and rebuilt on
/// every synthesis, never merged.
pub const DERIVED_FIELDS: [&str; 5] = ["main", "module", "types", "exports", "typesVersions"];

/// Error locating or loading a manifest.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum ManifestError {
    #[error("could not find `package.json` in `{}` or any parent directory", dir.display())]
    #[diagnostic(
        code(shipwright::manifest::not_found),
        help("Run from inside a package or pass `--package-json <file>`")
    )]
    NotFound { dir: PathBuf },

    #[error("failed to read `{}`", path.display())]
    #[diagnostic(code(shipwright::manifest::read))]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse `{}`", path.display())]
    #[diagnostic(code(shipwright::manifest::parse))]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{}` does not contain a JSON object", path.display())]
    #[diagnostic(code(shipwright::manifest::not_an_object))]
    NotAnObject { path: PathBuf },
}

/// Dependency tables of a package.
///
/// Every name listed here stays an external import of the compiled output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DependencyTables {
    #[serde(default)]
    pub dependencies: HashMap<String, String>,
    #[serde(default, rename = "optionalDependencies")]
    pub optional_dependencies: HashMap<String, String>,
    #[serde(default, rename = "peerDependencies")]
    pub peer_dependencies: HashMap<String, String>,
}

/// A parsed `package.json`.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    doc: Map<String, Value>,
    indent: String,
    crlf: bool,
    trailing_newline: bool,
}

impl Manifest {
    /// Read and parse the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &contents)
    }

    /// Parse manifest contents that were read from `path`.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_str(contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let Value::Object(doc) = value else {
            return Err(ManifestError::NotAnObject {
                path: path.to_path_buf(),
            });
        };

        Ok(Manifest {
            path: path.to_path_buf(),
            doc,
            indent: detect_indent(contents),
            crlf: contents.contains("\r\n"),
            trailing_newline: contents.ends_with('\n'),
        })
    }

    /// Path the manifest was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Package name, if any.
    pub fn name(&self) -> Option<&str> {
        self.doc.get("name").and_then(Value::as_str)
    }

    /// Get a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.doc.get(key)
    }

    /// Set a top-level field. New keys are appended at the end.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.doc.insert(key.to_string(), value.into());
    }

    /// Remove a top-level field, keeping the order of the remaining keys.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.doc.shift_remove(key)
    }

    /// Top-level keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.doc.keys().map(String::as_str)
    }

    /// Names of all runtime dependencies, sorted and deduplicated.
    pub fn external_dependencies(&self) -> Result<Vec<String>> {
        let tables: DependencyTables = serde_json::from_value(Value::Object(self.doc.clone()))
            .with_context(|| format!("invalid dependency tables in {}", self.path.display()))?;

        let names: BTreeSet<String> = tables
            .dependencies
            .into_keys()
            .chain(tables.optional_dependencies.into_keys())
            .chain(tables.peer_dependencies.into_keys())
            .collect();

        Ok(names.into_iter().collect())
    }

    /// Serialize with the original indentation and line endings.
    pub fn render(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.doc
            .serialize(&mut ser)
            .with_context(|| format!("failed to serialize {}", self.path.display()))?;

        let mut rendered = String::from_utf8(buf).context("serialized manifest is not UTF-8")?;
        if self.trailing_newline {
            rendered.push('\n');
        }
        // serde_json escapes newlines inside strings, so every raw `\n` is a line break
        if self.crlf {
            rendered = rendered.replace('\n', "\r\n");
        }
        Ok(rendered)
    }
}

/// Detect the indentation of a JSON document from its first indented line.
pub fn detect_indent(contents: &str) -> String {
    contents
        .lines()
        .find_map(|line| {
            let rest = line.trim_start_matches([' ', '\t']);
            let indent = &line[..line.len() - rest.len()];
            (!indent.is_empty() && !rest.is_empty()).then(|| indent.to_string())
        })
        .unwrap_or_else(|| DEFAULT_INDENT.to_string())
}

/// Find `package.json` in `start` or the closest ancestor.
pub fn find_manifest(start: &Path) -> Result<PathBuf, ManifestError> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(ManifestError::NotFound {
                dir: start.to_path_buf(),
            });
        }
    }
}
