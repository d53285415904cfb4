//! Toolchain error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error from an external build tool.
#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("could not find `{tool}`")]
    NotFound { tool: String, searched: Vec<PathBuf> },

    #[error("`{command}` failed with exit code {}", .code.map_or_else(|| "none".to_string(), |c| c.to_string()))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl ToolchainError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ToolchainError::NotFound { tool, searched } => {
                let mut diag = Diagnostic::error(format!("could not find `{}`", tool));
                if let Some(first) = searched.first() {
                    diag = diag.with_context(format!("searched {} and PATH", first.display()));
                }
                diag.with_suggestion(suggestions::INSTALL_TOOLS)
                    .with_suggestion(format!(
                        "Or set `{} = \"...\"` under [tools] in `.shipwright/config.toml`",
                        tool
                    ))
            }

            ToolchainError::Failed { stderr, .. } => Diagnostic::error(self.to_string())
                .with_output(stderr.clone())
                .with_suggestion(suggestions::BUILD_FAILED),
        }
    }
}
