//! Declaration build through the TypeScript compiler.
//!
//! tsc has no flag to restrict a project to a file list, so each run writes a
//! throwaway tsconfig that extends the project's own and pins `include` to the
//! buildable modules. The file is deleted when the run ends, pass or fail.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::builder::toolchain::DeclarationRequest;
use crate::util::process::ProcessBuilder;

/// The project tsconfig looked up in the package root by default.
pub const DEFAULT_TSCONFIG: &str = "tsconfig.json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeclarationConfig {
    extends: String,
    compiler_options: CompilerOptions,
    include: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompilerOptions {
    no_emit: bool,
    declaration: bool,
    declaration_map: bool,
    emit_declaration_only: bool,
}

/// The tsc CLI.
#[derive(Debug, Clone)]
pub struct Tsc {
    program: PathBuf,
}

impl Tsc {
    /// Wrap the tsc binary at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Tsc {
            program: program.into(),
        }
    }

    /// Path of the tsc binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Write the temporary tsconfig next to the project tsconfig.
    pub fn write_config(&self, request: &DeclarationRequest) -> Result<NamedTempFile> {
        let dir = request
            .tsconfig
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(&request.cwd);

        let config = declaration_config(&request.tsconfig, &request.inputs);
        let contents = serde_json::to_string_pretty(&config)
            .context("failed to serialize declaration tsconfig")?;

        let mut file = tempfile::Builder::new()
            .prefix("tsconfig.tmp")
            .suffix(".json")
            .tempfile_in(dir)
            .with_context(|| format!("failed to create temporary tsconfig in {}", dir.display()))?;
        file.write_all(contents.as_bytes())
            .context("failed to write temporary tsconfig")?;
        file.flush().context("failed to write temporary tsconfig")?;

        tracing::debug!("wrote {}", file.path().display());
        Ok(file)
    }

    /// Build the command line for a written temporary config.
    pub fn command(&self, request: &DeclarationRequest, config: &Path) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .cwd(&request.cwd)
            .arg("--project")
            .arg(config)
            .arg("--outDir")
            .arg(&request.out_dir)
    }

    /// Run the declaration build to completion.
    pub fn run(&self, request: &DeclarationRequest) -> Result<()> {
        let config = self.write_config(request)?;
        let result = self.command(request, config.path()).exec_and_check();

        // Dropping the handle deletes the file; close() reports failures.
        if let Err(e) = config.close() {
            tracing::warn!("failed to remove temporary tsconfig: {}", e);
        }

        result.context("failed to build type declarations")?;
        Ok(())
    }
}

fn declaration_config(tsconfig: &Path, inputs: &[PathBuf]) -> DeclarationConfig {
    DeclarationConfig {
        extends: tsconfig.to_string_lossy().into_owned(),
        compiler_options: CompilerOptions {
            no_emit: false,
            declaration: true,
            declaration_map: true,
            emit_declaration_only: true,
        },
        include: inputs
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
    }
}
