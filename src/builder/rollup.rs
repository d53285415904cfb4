//! rollup invocation.
//!
//! Each pass runs the rollup CLI once with module-per-file output, source maps
//! and the swc transpiler plugin.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::builder::toolchain::BundleRequest;
use crate::util::process::ProcessBuilder;

/// Package name suffix of the swc plugin (`rollup-plugin-swc3`).
const SWC_PLUGIN: &str = "swc3";

/// The rollup CLI.
#[derive(Debug, Clone)]
pub struct Rollup {
    program: PathBuf,
}

impl Rollup {
    /// Wrap the rollup binary at `program`.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Rollup {
            program: program.into(),
        }
    }

    /// Path of the rollup binary.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the command line for one pass.
    pub fn command(&self, request: &BundleRequest) -> ProcessBuilder {
        let mut cmd = ProcessBuilder::new(&self.program)
            .cwd(&request.cwd)
            .env("FORCE_COLOR", "0")
            .arg("--format")
            .arg(request.format.bundler_format())
            .arg("--dir")
            .arg(&request.out_dir)
            .arg("--preserveModules")
            .arg("--sourcemap")
            .arg("--plugin")
            .arg(swc_plugin_arg(&request.target));

        if !request.externals.is_empty() {
            cmd = cmd.arg("--external").arg(request.externals.join(","));
        }

        for input in &request.inputs {
            cmd = cmd.arg("--input").arg(input);
        }

        cmd
    }

    /// Run one pass to completion.
    pub fn run(&self, request: &BundleRequest) -> Result<()> {
        self.command(request)
            .exec_and_check()
            .with_context(|| format!("failed to compile {} modules", request.format))?;
        Ok(())
    }
}

/// `swc3={"jsc":{"target":"es2022"}}`
fn swc_plugin_arg(target: &str) -> String {
    let options = serde_json::json!({ "jsc": { "target": target } });
    format!("{}={}", SWC_PLUGIN, options)
}
