//! Subpath export declarations (`exportPath[:modulePath]`).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Export path reserved for the package root.
pub const ROOT_EXPORT: &str = ".";

/// Error parsing an export declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportSpecError {
    #[error("empty export declaration")]
    Empty,

    #[error("export declaration `{token}` has an empty export path")]
    EmptyExportPath { token: String },

    #[error("export declaration `{token}` has an empty module path")]
    EmptyModulePath { token: String },
}

/// One public subpath mapping.
///
/// `export_path` is what consumers import (`foo/*`, `bar`, or `.` for the
/// package root). `module_path` is the file inside each output tree, without
/// extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSpec {
    pub export_path: String,
    pub module_path: String,
}

impl ExportSpec {
    /// Create an export that maps `export_path` to `module_path`.
    pub fn new(export_path: impl Into<String>, module_path: impl Into<String>) -> Self {
        ExportSpec {
            export_path: export_path.into(),
            module_path: module_path.into(),
        }
    }

    /// Parse a single `exportPath[:modulePath]` token.
    ///
    /// A leading `./` on either side is dropped so `./foo:./lib/foo` and
    /// `foo:lib/foo` mean the same thing.
    pub fn parse(token: &str) -> Result<Self, ExportSpecError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ExportSpecError::Empty);
        }

        let (export_part, module_part) = match token.split_once(':') {
            Some((export, module)) => (export, Some(module)),
            None => (token, None),
        };

        let export_path = normalize(export_part);
        if export_path.is_empty() {
            return Err(ExportSpecError::EmptyExportPath {
                token: token.to_string(),
            });
        }

        let module_path = match module_part {
            Some(module) => {
                let module = normalize(module);
                if module.is_empty() {
                    return Err(ExportSpecError::EmptyModulePath {
                        token: token.to_string(),
                    });
                }
                module
            }
            None => export_path.clone(),
        };

        Ok(ExportSpec {
            export_path,
            module_path,
        })
    }

    /// Parse a comma-separated list of export declarations.
    ///
    /// An empty (or all-whitespace) list yields no exports. Empty tokens
    /// between commas are rejected; a single trailing comma is tolerated.
    pub fn parse_list(list: &str) -> Result<Vec<Self>, ExportSpecError> {
        let list = list.trim();
        if list.is_empty() {
            return Ok(Vec::new());
        }

        let list = list.strip_suffix(',').unwrap_or(list);
        list.split(',').map(ExportSpec::parse).collect()
    }

    /// Whether this export targets the package root.
    pub fn is_root(&self) -> bool {
        self.export_path == ROOT_EXPORT
    }

    /// The key used in the `exports` map (`.` or `./<exportPath>`).
    pub fn exports_key(&self) -> String {
        exports_key(&self.export_path)
    }
}

/// The `exports` key for an export path.
pub fn exports_key(export_path: &str) -> String {
    if export_path == ROOT_EXPORT {
        ROOT_EXPORT.to_string()
    } else {
        format!("./{}", export_path)
    }
}

fn normalize(part: &str) -> String {
    let part = part.trim();
    if part == ROOT_EXPORT {
        return part.to_string();
    }
    part.strip_prefix("./").unwrap_or(part).to_string()
}

impl FromStr for ExportSpec {
    type Err = ExportSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ExportSpec::parse(s)
    }
}

impl fmt::Display for ExportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.export_path == self.module_path {
            write!(f, "{}", self.export_path)
        } else {
            write!(f, "{}:{}", self.export_path, self.module_path)
        }
    }
}
