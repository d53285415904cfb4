//! `shipwright manifest` command
//!
//! Rewrites package.json for an output layout produced by other means.

use std::sync::Arc;

use anyhow::Result;

use crate::cli::ManifestArgs;
use crate::commands::{locate_package, PackageSettings};
use shipwright::builder::BuildEvent;
use shipwright::core::BuildLayout;
use shipwright::ops::synthesize::{synthesize, SynthesizeOptions};
use shipwright::util::shell::{Shell, Status};
use shipwright::util::GlobalContext;

pub fn execute(args: ManifestArgs, shell: &Arc<Shell>) -> Result<()> {
    let ctx = GlobalContext::new()?;
    let package = locate_package(&ctx, args.package.package_json.as_deref())?;
    let settings = PackageSettings::resolve(&args.package, &package.config)?;

    let layout = BuildLayout::new(&settings.out_dir, settings.dual);
    for format in layout.formats() {
        let tree = layout.tree(format);
        if !BuildLayout::resolve(&package.root, tree).is_dir() {
            shell.warn(format!("`{}` does not exist yet; run `shipwright build` to fill it", tree));
        }
    }
    let result = synthesize(
        &package.manifest_path,
        &SynthesizeOptions {
            main: settings.main,
            exports: settings.exports,
            layout,
        },
    )?;

    shell.json_event(
        &BuildEvent::manifest(&result.manifest_path, result.changed, result.export_count)
            .to_value(),
    );

    if result.changed {
        shell.status(
            Status::Updated,
            format!(
                "{} ({} exports)",
                result.manifest_path.display(),
                result.export_count
            ),
        );
    } else {
        shell.status(
            Status::Fresh,
            format!("{} is up to date", result.manifest_path.display()),
        );
    }

    Ok(())
}
