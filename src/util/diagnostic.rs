//! User-friendly diagnostic messages.
//!
//! Every error shown to the user carries its root cause, any relevant
//! context and suggested fixes.

use std::fmt;
use std::path::PathBuf;

use crate::builder::errors::ToolchainError;
use crate::core::{ExportSpecError, ManifestError};

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no manifest file is found.
    pub const NO_MANIFEST: &str = "Run from inside a package or pass `--package-json <file>`";

    /// Suggestion when a tool binary is missing.
    pub const INSTALL_TOOLS: &str =
        "Install the build tools: `npm install -D rollup rollup-plugin-swc3 @swc/core typescript`";

    /// Suggestion when a build step fails.
    pub const BUILD_FAILED: &str = "Run `shipwright build --verbose` for more details";

    /// Suggestion for malformed export declarations.
    pub const EXPORT_SYNTAX: &str =
        "Use `exportPath[:modulePath]`, e.g. `--exports-map foo/*,bar:some/other/file`";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related location (file path)
    pub location: Option<PathBuf>,
    /// Verbatim output of a failed tool
    pub output: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
            output: None,
        }
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add a file location.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Attach the raw output of a failed tool.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity_str = match (color, self.severity) {
            (true, Severity::Error) => "\x1b[1;31merror\x1b[0m",
            (true, Severity::Warning) => "\x1b[1;33mwarning\x1b[0m",
            (false, Severity::Error) => "error",
            (false, Severity::Warning) => "warning",
        };

        output.push_str(&format!("{}: {}\n", severity_str, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if let Some(ref raw) = self.output {
            output.push('\n');
            output.push_str(raw.trim_end());
            output.push('\n');
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help_prefix = if color {
                "\x1b[1;32mhelp\x1b[0m"
            } else {
                "help"
            };
            output.push_str(&format!("{}: consider:\n", help_prefix));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Build a diagnostic for a known error type anywhere in the chain.
pub fn from_error(err: &anyhow::Error) -> Option<Diagnostic> {
    let outer: Vec<String> = err
        .chain()
        .take_while(|cause| !is_known(*cause))
        .map(|cause| cause.to_string())
        .collect();

    let mut diag = err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<ToolchainError>() {
            Some(e.to_diagnostic())
        } else if let Some(e) = cause.downcast_ref::<ManifestError>() {
            Some(manifest_diagnostic(e))
        } else {
            cause
                .downcast_ref::<ExportSpecError>()
                .map(export_spec_diagnostic)
        }
    })?;

    for ctx in outer {
        diag = diag.with_context(ctx);
    }
    Some(diag)
}

fn is_known(cause: &(dyn std::error::Error + 'static)) -> bool {
    cause.is::<ToolchainError>() || cause.is::<ManifestError>() || cause.is::<ExportSpecError>()
}

fn manifest_diagnostic(err: &ManifestError) -> Diagnostic {
    match err {
        ManifestError::NotFound { dir } => Diagnostic::error(err.to_string())
            .with_location(dir)
            .with_suggestion(suggestions::NO_MANIFEST),
        ManifestError::Read { path, source } => Diagnostic::error(err.to_string())
            .with_location(path)
            .with_context(source.to_string()),
        ManifestError::Parse { path, source } => Diagnostic::error(err.to_string())
            .with_location(path)
            .with_context(format!(
                "{} (line {}, column {})",
                source,
                source.line(),
                source.column()
            ))
            .with_suggestion("Fix the JSON syntax; the file was not modified"),
        ManifestError::NotAnObject { path } => {
            Diagnostic::error(err.to_string()).with_location(path)
        }
    }
}

fn export_spec_diagnostic(err: &ExportSpecError) -> Diagnostic {
    Diagnostic::error(format!("invalid export declaration: {}", err))
        .with_suggestion(suggestions::EXPORT_SYNTAX)
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
