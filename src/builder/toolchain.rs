//! Toolchain abstraction for the JavaScript build tools.
//!
//! The orchestrator talks to the bundler and the declaration compiler only
//! through the [`Toolchain`] trait, so tests can substitute a recording
//! implementation and never spawn Node.
//!
//! Tool detection priority:
//! 1. `[tools]` in `.shipwright/config.toml` or `~/.shipwright/config.toml`
//! 2. `node_modules/.bin` of the package root and its ancestors
//! 3. PATH

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::errors::ToolchainError;
use crate::builder::rollup::Rollup;
use crate::builder::tsc::Tsc;
use crate::core::layout::ModuleFormat;
use crate::util::config::ToolsConfig;
use crate::util::process::find_node_bin;

/// Language target handed to the transpiler when none is configured.
pub const DEFAULT_TARGET: &str = "es2022";

/// Input for one bundler pass.
#[derive(Debug, Clone)]
pub struct BundleRequest {
    /// Package root; the bundler runs here
    pub cwd: PathBuf,
    /// Entry modules, relative to `cwd`
    pub inputs: Vec<String>,
    /// Output tree for this format
    pub out_dir: PathBuf,
    /// Module convention to emit
    pub format: ModuleFormat,
    /// Language target (e.g. `es2022`)
    pub target: String,
    /// Module names left as imports instead of being bundled
    pub externals: Vec<String>,
}

/// Input for the declaration pass.
#[derive(Debug, Clone)]
pub struct DeclarationRequest {
    /// Package root; the compiler runs here
    pub cwd: PathBuf,
    /// Project tsconfig the temporary config extends
    pub tsconfig: PathBuf,
    /// Absolute paths of the modules to declare
    pub inputs: Vec<PathBuf>,
    /// Types tree
    pub out_dir: PathBuf,
}

/// Trait for toolchain implementations.
///
/// Both passes block until the tool exits. A non-zero exit is an error
/// carrying the tool's captured output.
pub trait Toolchain: Send + Sync {
    /// Short name used in status output.
    fn name(&self) -> &str;

    /// Transpile `inputs` module-per-file into `out_dir`.
    fn bundle(&self, request: &BundleRequest) -> Result<()>;

    /// Emit `.d.ts` files and declaration maps into `out_dir`.
    fn emit_declarations(&self, request: &DeclarationRequest) -> Result<()>;
}

/// rollup + swc for modules, tsc for declarations.
#[derive(Debug, Clone)]
pub struct NodeToolchain {
    rollup: Rollup,
    tsc: Tsc,
}

impl NodeToolchain {
    /// Create a toolchain from known binary paths.
    pub fn new(rollup: impl Into<PathBuf>, tsc: impl Into<PathBuf>) -> Self {
        NodeToolchain {
            rollup: Rollup::new(rollup),
            tsc: Tsc::new(tsc),
        }
    }

    /// Locate `rollup` and `tsc` for the package at `root`.
    pub fn detect(root: &Path, tools: &ToolsConfig) -> Result<Self, ToolchainError> {
        let rollup = locate(root, "rollup", tools.rollup.as_deref())?;
        let tsc = locate(root, "tsc", tools.tsc.as_deref())?;

        tracing::debug!(
            "using rollup at {} and tsc at {}",
            rollup.display(),
            tsc.display()
        );

        Ok(Self::new(rollup, tsc))
    }

    /// The bundler adapter.
    pub fn rollup(&self) -> &Rollup {
        &self.rollup
    }

    /// The declaration compiler adapter.
    pub fn tsc(&self) -> &Tsc {
        &self.tsc
    }
}

impl Toolchain for NodeToolchain {
    fn name(&self) -> &str {
        "rollup+tsc"
    }

    fn bundle(&self, request: &BundleRequest) -> Result<()> {
        self.rollup.run(request)
    }

    fn emit_declarations(&self, request: &DeclarationRequest) -> Result<()> {
        self.tsc.run(request)
    }
}

/// Resolve a tool: an explicit path must exist, otherwise search Node bins.
fn locate(root: &Path, name: &str, configured: Option<&Path>) -> Result<PathBuf, ToolchainError> {
    match configured {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(ToolchainError::NotFound {
            tool: name.to_string(),
            searched: vec![path.to_path_buf()],
        }),
        None => find_node_bin(root, name),
    }
}
