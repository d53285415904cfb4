//! Output tree layout.
//!
//! A build produces either one flat tree (`dist`) serving every role, or, in
//! dual-build mode, three sibling trees:
//!
//! ```text
//! dist/
//!   cjs/     CommonJS modules      ({"type": "commonjs"})
//!   esm/     ES modules            ({"type": "module"})
//!   types/   .d.ts declarations
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

/// Default output directory.
pub const DEFAULT_OUT_DIR: &str = "dist";

/// Extension of compiled modules.
pub const MODULE_EXT: &str = "js";

/// Extension of type declarations.
pub const DECLARATION_EXT: &str = "d.ts";

/// Module format of an output tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleFormat {
    /// Legacy `require` loading.
    CommonJs,
    /// `import` loading.
    Esm,
}

impl ModuleFormat {
    /// Value of the `type` field in the tree's marker `package.json`.
    pub fn package_type(&self) -> &'static str {
        match self {
            ModuleFormat::CommonJs => "commonjs",
            ModuleFormat::Esm => "module",
        }
    }

    /// Subdirectory name used in dual-build mode.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ModuleFormat::CommonJs => "cjs",
            ModuleFormat::Esm => "esm",
        }
    }

    /// Format name understood by the bundler.
    pub fn bundler_format(&self) -> &'static str {
        match self {
            ModuleFormat::CommonJs => "cjs",
            ModuleFormat::Esm => "es",
        }
    }
}

impl fmt::Display for ModuleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleFormat::CommonJs => write!(f, "CommonJS"),
            ModuleFormat::Esm => write!(f, "ESM"),
        }
    }
}

/// Output directories, relative to the package root, with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    cjs: String,
    esm: String,
    types: String,
    dual: bool,
}

impl BuildLayout {
    /// Compute the layout for `out_dir`.
    pub fn new(out_dir: &str, dual: bool) -> Self {
        let out_dir = normalize_dir(out_dir);
        if dual {
            BuildLayout {
                cjs: join(&out_dir, ModuleFormat::CommonJs.dir_name()),
                esm: join(&out_dir, ModuleFormat::Esm.dir_name()),
                types: join(&out_dir, "types"),
                dual,
            }
        } else {
            BuildLayout {
                cjs: out_dir.clone(),
                esm: out_dir.clone(),
                types: out_dir,
                dual,
            }
        }
    }

    /// Whether separate per-convention trees are produced.
    pub fn is_dual(&self) -> bool {
        self.dual
    }

    /// CommonJS tree (the flat tree when not dual).
    pub fn cjs(&self) -> &str {
        &self.cjs
    }

    /// ES module tree (the flat tree when not dual).
    pub fn esm(&self) -> &str {
        &self.esm
    }

    /// Declarations tree (the flat tree when not dual).
    pub fn types(&self) -> &str {
        &self.types
    }

    /// Tree for a module format.
    pub fn tree(&self, format: ModuleFormat) -> &str {
        match format {
            ModuleFormat::CommonJs => &self.cjs,
            ModuleFormat::Esm => &self.esm,
        }
    }

    /// Module formats compiled for this layout, CommonJS first.
    pub fn formats(&self) -> Vec<ModuleFormat> {
        if self.dual {
            vec![ModuleFormat::CommonJs, ModuleFormat::Esm]
        } else {
            vec![ModuleFormat::Esm]
        }
    }

    /// `./<tree>/<module>.js`
    pub fn module_path(&self, format: ModuleFormat, module: &str) -> String {
        format!("./{}/{}.{}", self.tree(format), module, MODULE_EXT)
    }

    /// `./<types>/<module>.d.ts`
    pub fn declaration_path(&self, module: &str) -> String {
        format!("./{}/{}.{}", self.types, module, DECLARATION_EXT)
    }

    /// Absolute directory of a tree under `root`.
    pub fn resolve(root: &Path, tree: &str) -> PathBuf {
        tree.split('/').fold(root.to_path_buf(), |p, c| p.join(c))
    }
}

/// Reject output directories that manifest paths cannot express.
///
/// Entry points are written as `./<dir>/...`, so the directory has to be
/// relative to the package root.
pub fn validate_out_dir(dir: &str) -> Result<()> {
    let trimmed = dir.trim();
    if trimmed.is_empty() {
        bail!("output directory must not be empty");
    }
    if Path::new(trimmed).is_absolute() || trimmed.starts_with(['/', '\\']) {
        bail!(
            "output directory `{}` must be relative to the package root",
            dir
        );
    }
    Ok(())
}

fn normalize_dir(dir: &str) -> String {
    let dir = dir.trim().replace('\\', "/");
    let dir = dir.strip_prefix("./").unwrap_or(&dir);
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        ".".to_string()
    } else {
        dir.to_string()
    }
}

fn join(base: &str, child: &str) -> String {
    if base == "." {
        child.to_string()
    } else {
        format!("{}/{}", base, child)
    }
}
