//! Test utilities and mocks for Shipwright unit tests.
//!
//! [`RecordingToolchain`] stands in for rollup and tsc: it records every
//! request, creates the output directories a real run would, and can be told
//! to fail a pass.
//!
//! # Example
//!
//! ```rust,ignore
//! let toolchain = RecordingToolchain::new();
//! compile(&shell, &toolchain, &opts)?;
//! assert_eq!(toolchain.bundles().len(), 2);
//! ```

pub mod fixtures;

use std::sync::Mutex;

use anyhow::Result;

use crate::builder::errors::ToolchainError;
use crate::builder::toolchain::{BundleRequest, DeclarationRequest, Toolchain};
use crate::core::layout::ModuleFormat;

/// Toolchain that records requests instead of running tools.
#[derive(Debug, Default)]
pub struct RecordingToolchain {
    bundles: Mutex<Vec<BundleRequest>>,
    declarations: Mutex<Vec<DeclarationRequest>>,
    fail_bundle: Option<ModuleFormat>,
    fail_declarations: bool,
}

impl RecordingToolchain {
    /// Create a toolchain where every pass succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a toolchain whose bundler pass for `format` exits with status 1.
    pub fn failing_bundle(format: ModuleFormat) -> Self {
        RecordingToolchain {
            fail_bundle: Some(format),
            ..Self::default()
        }
    }

    /// Create a toolchain whose declaration pass exits with status 1.
    pub fn failing_declarations() -> Self {
        RecordingToolchain {
            fail_declarations: true,
            ..Self::default()
        }
    }

    /// Bundler requests received so far.
    pub fn bundles(&self) -> Vec<BundleRequest> {
        self.bundles.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Declaration requests received so far.
    pub fn declarations(&self) -> Vec<DeclarationRequest> {
        self.declarations
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

fn failed(command: &str, stderr: &str) -> anyhow::Error {
    ToolchainError::Failed {
        command: command.to_string(),
        code: Some(1),
        stderr: stderr.to_string(),
    }
    .into()
}

impl Toolchain for RecordingToolchain {
    fn name(&self) -> &str {
        "recording"
    }

    fn bundle(&self, request: &BundleRequest) -> Result<()> {
        if let Ok(mut bundles) = self.bundles.lock() {
            bundles.push(request.clone());
        }
        if self.fail_bundle == Some(request.format) {
            return Err(failed("rollup", "[!] Error: Unexpected token\n"));
        }
        std::fs::create_dir_all(&request.out_dir)?;
        Ok(())
    }

    fn emit_declarations(&self, request: &DeclarationRequest) -> Result<()> {
        if let Ok(mut declarations) = self.declarations.lock() {
            declarations.push(request.clone());
        }
        if self.fail_declarations {
            return Err(failed("tsc", "src/index.ts(1,7): error TS2322\n"));
        }
        std::fs::create_dir_all(&request.out_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_recording_toolchain_records_and_fails() {
        let tmp = TempDir::new().unwrap();
        let toolchain = RecordingToolchain::failing_bundle(ModuleFormat::CommonJs);

        let mut request = BundleRequest {
            cwd: tmp.path().to_path_buf(),
            inputs: vec!["src/index.ts".to_string()],
            out_dir: tmp.path().join("dist/esm"),
            format: ModuleFormat::Esm,
            target: "es2022".to_string(),
            externals: Vec::new(),
        };
        toolchain.bundle(&request).unwrap();
        assert!(tmp.path().join("dist/esm").is_dir());

        request.format = ModuleFormat::CommonJs;
        request.out_dir = tmp.path().join("dist/cjs");
        assert!(toolchain.bundle(&request).is_err());
        assert_eq!(toolchain.bundles().len(), 2);
    }

    #[test]
    fn test_failing_declarations() {
        let toolchain = RecordingToolchain::failing_declarations();
        let err = toolchain
            .emit_declarations(&DeclarationRequest {
                cwd: PathBuf::from("."),
                tsconfig: PathBuf::from("tsconfig.json"),
                inputs: Vec::new(),
                out_dir: PathBuf::from("dist/types"),
            })
            .unwrap_err();
        assert!(err.downcast_ref::<ToolchainError>().is_some());
        assert_eq!(toolchain.declarations().len(), 1);
    }
}
