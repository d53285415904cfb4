//! Command implementations

pub mod build;
pub mod completions;
pub mod files;
pub mod manifest;

use std::path::{Path, PathBuf};

use anyhow::Result;

use shipwright::core::layout::{validate_out_dir, DEFAULT_OUT_DIR};
use shipwright::core::ExportSpec;
use shipwright::util::config::Config;
use shipwright::util::GlobalContext;

use crate::cli::PackageArgs;

/// Entry module used when neither the command line nor config names one.
const DEFAULT_MAIN: &str = "index";

/// A package located on disk with its merged configuration.
pub struct Package {
    pub manifest_path: PathBuf,
    pub root: PathBuf,
    pub config: Config,
}

/// Locate package.json (explicit or nearest) and load its configuration.
pub fn locate_package(ctx: &GlobalContext, package_json: Option<&Path>) -> Result<Package> {
    let manifest_path = match package_json {
        Some(path) => ctx.resolve(path),
        None => ctx.find_manifest()?,
    };
    let root = shipwright::ops::shipwright_build::package_root(&manifest_path);
    let config = ctx.load_config(&root)?;

    tracing::debug!("using manifest {}", manifest_path.display());

    Ok(Package {
        manifest_path,
        root,
        config,
    })
}

/// Synthesis settings after applying CLI > config > defaults.
#[derive(Debug)]
pub struct PackageSettings {
    pub out_dir: String,
    pub main: String,
    pub exports: Vec<ExportSpec>,
    pub dual: bool,
}

impl PackageSettings {
    pub fn resolve(args: &PackageArgs, config: &Config) -> Result<Self> {
        let out_dir = args
            .out_dir
            .clone()
            .or_else(|| config.build.out_dir.clone())
            .unwrap_or_else(|| DEFAULT_OUT_DIR.to_string());
        validate_out_dir(&out_dir)?;

        let main = args
            .main
            .clone()
            .or_else(|| config.build.main.clone())
            .unwrap_or_else(|| DEFAULT_MAIN.to_string());

        let lists = if args.exports_map.is_empty() {
            &config.build.exports
        } else {
            &args.exports_map
        };
        let mut exports = Vec::new();
        for list in lists {
            exports.extend(ExportSpec::parse_list(list)?);
        }

        Ok(PackageSettings {
            out_dir,
            main,
            exports,
            dual: if args.no_cjs {
                false
            } else {
                args.cjs || config.build.cjs
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_precedence() {
        let mut config = Config::default();
        config.build.out_dir = Some("lib".to_string());
        config.build.main = Some("main".to_string());
        config.build.exports = vec!["foo".to_string()];

        let args = PackageArgs {
            main: Some("entry".to_string()),
            exports_map: vec!["bar:x,baz".to_string()],
            ..PackageArgs::default()
        };

        let settings = PackageSettings::resolve(&args, &config).unwrap();
        assert_eq!(settings.out_dir, "lib");
        assert_eq!(settings.main, "entry");
        let paths: Vec<_> = settings.exports.iter().map(|e| e.export_path.as_str()).collect();
        assert_eq!(paths, vec!["bar", "baz"]);
        assert!(!settings.dual);
    }

    #[test]
    fn test_settings_defaults() {
        let settings =
            PackageSettings::resolve(&PackageArgs::default(), &Config::default()).unwrap();
        assert_eq!(settings.out_dir, "dist");
        assert_eq!(settings.main, "index");
        assert!(settings.exports.is_empty());
    }

    #[test]
    fn test_no_cjs_overrides_config() {
        let mut config = Config::default();
        config.build.cjs = true;

        let settings = PackageSettings::resolve(&PackageArgs::default(), &config).unwrap();
        assert!(settings.dual);

        let args = PackageArgs {
            no_cjs: true,
            ..PackageArgs::default()
        };
        assert!(!PackageSettings::resolve(&args, &config).unwrap().dual);
    }

    #[test]
    fn test_absolute_out_dir_rejected() {
        let args = PackageArgs {
            out_dir: Some("/abs/out".to_string()),
            ..PackageArgs::default()
        };
        let err = PackageSettings::resolve(&args, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("must be relative"));
    }

    #[test]
    fn test_settings_invalid_export() {
        let args = PackageArgs {
            exports_map: vec!["foo,,bar".to_string()],
            ..PackageArgs::default()
        };
        assert!(PackageSettings::resolve(&args, &Config::default()).is_err());
    }
}
