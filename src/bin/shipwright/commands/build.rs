//! `shipwright build` command

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::BuildArgs;
use crate::commands::{locate_package, PackageSettings};
use shipwright::builder::tsc::DEFAULT_TSCONFIG;
use shipwright::builder::{NodeToolchain, DEFAULT_TARGET};
use shipwright::core::source::{DEFAULT_IGNORE_PATTERN, DEFAULT_SOURCE_GLOB};
use shipwright::ops::shipwright_build::{build, BuildOptions};
use shipwright::ops::terminal_columns;
use shipwright::util::shell::{Shell, Status};
use shipwright::util::GlobalContext;

pub fn execute(args: BuildArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let package = locate_package(&ctx, args.package.package_json.as_deref())?;
    let config = &package.config;

    // CLI > config > defaults
    let settings = PackageSettings::resolve(&args.package, config)?;

    let target = args
        .target
        .or_else(|| config.build.target.clone())
        .unwrap_or_else(|| DEFAULT_TARGET.to_string());

    let tsconfig = args
        .tsconfig
        .map(|p| ctx.resolve(&p))
        .or_else(|| config.tools.tsconfig.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_TSCONFIG));

    let toolchain = NodeToolchain::detect(&package.root, &config.tools)?;

    let opts = BuildOptions {
        manifest_path: package.manifest_path.clone(),
        out_dir: settings.out_dir,
        main: settings.main,
        exports: settings.exports,
        dual: settings.dual,
        target,
        source_glob: config
            .build
            .source_glob
            .clone()
            .unwrap_or_else(|| DEFAULT_SOURCE_GLOB.to_string()),
        ignore_pattern: config
            .build
            .ignore_pattern
            .clone()
            .unwrap_or_else(|| DEFAULT_IGNORE_PATTERN.to_string()),
        tsconfig,
        columns: terminal_columns(),
        color: shell.report_color(),
    };

    let result = if shell.is_json() {
        build(shell, &toolchain, &opts, &mut io::sink())?
    } else {
        build(shell, &toolchain, &opts, &mut io::stdout().lock())?
    };

    if result.manifest.changed {
        shell.status(
            Status::Updated,
            format!(
                "{} ({} exports)",
                result.manifest.manifest_path.display(),
                result.manifest.export_count
            ),
        );
    } else {
        shell.status(
            Status::Fresh,
            format!("{} is up to date", result.manifest.manifest_path.display()),
        );
    }

    Ok(())
}
