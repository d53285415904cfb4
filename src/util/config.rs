//! Configuration file support for Shipwright.
//!
//! Shipwright reads two configuration file locations:
//! - Global: `~/.shipwright/config.toml` - User-wide defaults
//! - Project: `.shipwright/config.toml` - Package-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the per-user and per-package configuration directory.
pub const CONFIG_DIR: &str = ".shipwright";

/// Name of the configuration file inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.toml";

/// Shipwright configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Build settings
    pub build: BuildConfig,

    /// External tool settings
    pub tools: ToolsConfig,
}

/// Build-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Output directory (default: `dist`)
    pub out_dir: Option<String>,

    /// Primary entry module, without extension (default: `index`)
    pub main: Option<String>,

    /// Subpath exports in `exportPath[:modulePath]` form
    #[serde(default)]
    pub exports: Vec<String>,

    /// Emit a CommonJS tree next to the ESM tree
    #[serde(default)]
    pub cjs: bool,

    /// Language target handed to the transpiler (default: `es2022`)
    pub target: Option<String>,

    /// Glob selecting source modules
    pub source_glob: Option<String>,

    /// Regex matched against file names to exclude test and story files
    pub ignore_pattern: Option<String>,
}

/// Paths to external tools.
///
/// Unset tools are looked up in `node_modules/.bin` and then in PATH.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Path to the `rollup` binary
    pub rollup: Option<PathBuf>,

    /// Path to the `tsc` binary
    pub tsc: Option<PathBuf>,

    /// tsconfig used as the base of the declaration build
    pub tsconfig: Option<PathBuf>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration, or defaults if the file doesn't exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.build.out_dir.is_some() {
            self.build.out_dir = other.build.out_dir;
        }
        if other.build.main.is_some() {
            self.build.main = other.build.main;
        }
        if !other.build.exports.is_empty() {
            self.build.exports = other.build.exports;
        }
        if other.build.cjs {
            self.build.cjs = true;
        }
        if other.build.target.is_some() {
            self.build.target = other.build.target;
        }
        if other.build.source_glob.is_some() {
            self.build.source_glob = other.build.source_glob;
        }
        if other.build.ignore_pattern.is_some() {
            self.build.ignore_pattern = other.build.ignore_pattern;
        }

        if other.tools.rollup.is_some() {
            self.tools.rollup = other.tools.rollup;
        }
        if other.tools.tsc.is_some() {
            self.tools.tsc = other.tools.tsc;
        }
        if other.tools.tsconfig.is_some() {
            self.tools.tsconfig = other.tools.tsconfig;
        }
    }

    /// Resolve relative tool paths against the directory holding `config_path`.
    ///
    /// A config file at `<dir>/.shipwright/config.toml` resolves against `<dir>`.
    fn anchor_paths(&mut self, config_path: &Path) {
        let base = config_path
            .parent()
            .and_then(|dir| dir.parent())
            .unwrap_or_else(|| Path::new("."));

        for path in [
            &mut self.tools.rollup,
            &mut self.tools.tsc,
            &mut self.tools.tsconfig,
        ]
        .into_iter()
        .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.shipwright/config.toml)
/// 2. Global config (~/.shipwright/config.toml)
/// 3. Defaults
///
/// A file that exists but cannot be parsed is an error.
pub fn load_config(global_path: &Path, project_path: &Path) -> Result<Config> {
    let mut config = Config::default();

    for path in [global_path, project_path] {
        if path.as_os_str().is_empty() || !path.exists() {
            continue;
        }
        let mut layer = Config::load_or_default(path)?;
        layer.anchor_paths(path);
        tracing::debug!("loaded config from {}", path.display());
        config.merge(layer);
    }

    Ok(config)
}

/// Get the global shipwright config directory (~/.shipwright).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR))
}

/// Get the project config path (.shipwright/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR).join(CONFIG_FILE)
}
