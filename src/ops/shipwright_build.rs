//! Implementation of `shipwright build`.
//!
//! Pipeline: classify sources and print the report, compile each module
//! convention, write the tree markers, emit declarations, then rewrite the
//! manifest. The manifest is only touched once everything before it
//! succeeded.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::builder::events::BuildEvent;
use crate::builder::toolchain::{BundleRequest, DeclarationRequest, Toolchain};
use crate::core::export_spec::ExportSpec;
use crate::core::layout::{BuildLayout, ModuleFormat};
use crate::core::manifest::{Manifest, MANIFEST_NAME};
use crate::core::source::{self, SourceEntry};
use crate::ops::report::write_file_report;
use crate::ops::synthesize::{synthesize, SynthesizeOptions, SynthesizeResult};
use crate::util::fs;
use crate::util::shell::{Shell, Status};

/// Options for the build command.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Manifest to rewrite; its directory is the package root
    pub manifest_path: PathBuf,

    /// Output directory, relative to the package root
    pub out_dir: String,

    /// Primary entry module, without extension
    pub main: String,

    /// Declared subpath exports
    pub exports: Vec<ExportSpec>,

    /// Also emit a CommonJS tree
    pub dual: bool,

    /// Language target for the transpiler
    pub target: String,

    /// Glob selecting source modules
    pub source_glob: String,

    /// Regex matched against file names to exclude
    pub ignore_pattern: String,

    /// Project tsconfig for the declaration pass
    pub tsconfig: PathBuf,

    /// Width of the file report
    pub columns: usize,

    /// Color the file report
    pub color: bool,
}

/// Inputs for [`compile`].
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Package root
    pub root: PathBuf,
    /// Output directory, relative to `root`
    pub out_dir: String,
    /// Buildable modules, relative to `root`
    pub inputs: Vec<String>,
    /// Language target for the transpiler
    pub target: String,
    /// Also emit a CommonJS tree
    pub dual: bool,
    /// Module names not to bundle
    pub externals: Vec<String>,
    /// Project tsconfig for the declaration pass
    pub tsconfig: PathBuf,
}

/// Result of a build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Every classified source module
    pub entries: Vec<SourceEntry>,
    /// Trees that were produced
    pub layout: BuildLayout,
    /// Manifest synthesis outcome
    pub manifest: SynthesizeResult,
    /// Wall time of the whole pipeline
    pub duration: Duration,
}

/// Run the full pipeline.
///
/// The file report is written to `report`; status lines go through `shell`.
pub fn build<W: Write>(
    shell: &Arc<Shell>,
    toolchain: &dyn Toolchain,
    opts: &BuildOptions,
    report: &mut W,
) -> Result<BuildResult> {
    let root = package_root(&opts.manifest_path);

    // Fail on a bad manifest before anything is spawned.
    let manifest = Manifest::load(&opts.manifest_path)?;
    let externals = manifest.external_dependencies()?;

    shell.json_event(&BuildEvent::started(manifest.name(), &opts.out_dir, opts.dual).to_value());

    let entries = source::classify(&root, &opts.source_glob, &opts.ignore_pattern)?;
    write_file_report(report, &entries, opts.columns, opts.color)
        .context("failed to write build file report")?;
    for entry in &entries {
        shell.json_event(&BuildEvent::source(&entry.path, entry.ignored).to_value());
    }

    let inputs: Vec<String> = source::buildable(&entries)
        .into_iter()
        .map(|e| e.path.clone())
        .collect();
    if inputs.is_empty() {
        bail!(
            "no buildable source files matched `{}` in {}",
            opts.source_glob,
            root.display()
        );
    }

    let span = shell.span(
        Status::Compiling,
        format!(
            "{} ({} modules, {})",
            manifest.name().unwrap_or(MANIFEST_NAME),
            inputs.len(),
            toolchain.name()
        ),
    );

    let compile_opts = CompileOptions {
        root: root.clone(),
        out_dir: opts.out_dir.clone(),
        inputs,
        target: opts.target.clone(),
        dual: opts.dual,
        externals,
        tsconfig: opts.tsconfig.clone(),
    };

    let layout = match compile(shell, toolchain, &compile_opts) {
        Ok(layout) => layout,
        Err(e) => {
            let elapsed = span.elapsed().as_millis() as u64;
            shell.json_event(&BuildEvent::finished(false, elapsed).to_value());
            return Err(e);
        }
    };

    let manifest = synthesize(
        &opts.manifest_path,
        &SynthesizeOptions {
            main: opts.main.clone(),
            exports: opts.exports.clone(),
            layout: layout.clone(),
        },
    )?;
    shell.json_event(
        &BuildEvent::manifest(&manifest.manifest_path, manifest.changed, manifest.export_count)
            .to_value(),
    );

    let duration = span.elapsed();
    shell.json_event(&BuildEvent::finished(true, duration.as_millis() as u64).to_value());
    span.finish_with_message(format!("built `{}`", layout.esm()));

    Ok(BuildResult {
        entries,
        layout,
        manifest,
        duration,
    })
}

/// Compile the buildable modules into the output trees.
///
/// The ESM pass always runs; the CommonJS pass runs alongside it in dual
/// mode. Each produced tree gets a `package.json` marker declaring its module
/// type, then declarations are emitted into the types tree.
pub fn compile(
    shell: &Arc<Shell>,
    toolchain: &dyn Toolchain,
    opts: &CompileOptions,
) -> Result<BuildLayout> {
    let layout = BuildLayout::new(&opts.out_dir, opts.dual);
    let formats = layout.formats();
    let mut progress = shell.progress(formats.len() as u64 + 1, "Compiling");

    let request = |format: ModuleFormat| BundleRequest {
        cwd: opts.root.clone(),
        inputs: opts.inputs.clone(),
        out_dir: BuildLayout::resolve(&opts.root, layout.tree(format)),
        format,
        target: opts.target.clone(),
        externals: opts.externals.clone(),
    };

    if layout.is_dual() {
        let cjs = request(ModuleFormat::CommonJs);
        let esm = request(ModuleFormat::Esm);
        let (cjs_result, esm_result) =
            rayon::join(|| toolchain.bundle(&cjs), || toolchain.bundle(&esm));
        cjs_result?;
        esm_result?;
    } else {
        toolchain.bundle(&request(ModuleFormat::Esm))?;
    }

    for format in &formats {
        let tree = BuildLayout::resolve(&opts.root, layout.tree(*format));
        write_type_marker(&tree, *format)?;
        progress.inc(1, format);
        shell.json_event(
            &BuildEvent::compiled(format.bundler_format(), &tree, opts.inputs.len()).to_value(),
        );
    }

    let types = BuildLayout::resolve(&opts.root, layout.types());
    shell.status(Status::Emitting, format!("declarations into `{}`", layout.types()));
    toolchain.emit_declarations(&DeclarationRequest {
        cwd: opts.root.clone(),
        tsconfig: absolute(&opts.root, &opts.tsconfig),
        inputs: opts.inputs.iter().map(|p| opts.root.join(p)).collect(),
        out_dir: types.clone(),
    })?;
    progress.inc(1, "declarations");
    progress.finish();
    shell.json_event(&BuildEvent::declarations(&types).to_value());

    Ok(layout)
}

/// Write `<tree>/package.json` declaring the tree's module type.
pub fn write_type_marker(tree: &Path, format: ModuleFormat) -> Result<()> {
    let marker = serde_json::json!({ "type": format.package_type() });
    let contents = serde_json::to_string_pretty(&marker)?;
    let path = tree.join(MANIFEST_NAME);
    fs::write_string(&path, &contents)?;
    tracing::debug!("wrote {}", path.display());
    Ok(())
}

/// Directory holding the manifest.
pub fn package_root(manifest_path: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn absolute(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
