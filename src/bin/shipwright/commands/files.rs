//! `shipwright files` command

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::FilesArgs;
use crate::commands::locate_package;
use shipwright::builder::BuildEvent;
use shipwright::core::source::{classify, DEFAULT_IGNORE_PATTERN, DEFAULT_SOURCE_GLOB};
use shipwright::ops::{terminal_columns, write_file_report};
use shipwright::util::shell::Shell;
use shipwright::util::GlobalContext;

pub fn execute(args: FilesArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let package = locate_package(&ctx, args.package_json.as_deref())?;
    let build = &package.config.build;

    let entries = classify(
        &package.root,
        build.source_glob.as_deref().unwrap_or(DEFAULT_SOURCE_GLOB),
        build.ignore_pattern.as_deref().unwrap_or(DEFAULT_IGNORE_PATTERN),
    )?;

    if shell.is_json() {
        for entry in &entries {
            shell.json_event(&BuildEvent::source(&entry.path, entry.ignored).to_value());
        }
        return Ok(());
    }

    write_file_report(
        &mut io::stdout().lock(),
        &entries,
        terminal_columns(),
        shell.report_color(),
    )
    .context("failed to write build file report")?;

    Ok(())
}
