//! Manifest synthesis.
//!
//! Rewrites the entry-point fields of `package.json` (`main`, `module`,
//! `types`, `exports`, `typesVersions`) from a build layout. Everything else
//! in the document is left alone. Running it twice with the same inputs
//! produces the same bytes.
//!
//! For `--cjs --exportsMap foo/*,bar:some/other/file` the result is:
//!
//! ```json
//! "main": "./dist/cjs/index.js",
//! "module": "./dist/esm/index.js",
//! "types": "./dist/types/index.d.ts",
//! "exports": {
//!   ".": { "types": "...", "require": "./dist/cjs/index.js", "default": "./dist/esm/index.js" },
//!   "./dist/cjs/*": { "types": "./dist/types/*.d.ts", "default": "./dist/cjs/*.js" },
//!   "./dist/esm/*": { "types": "./dist/types/*.d.ts", "default": "./dist/esm/*.js" },
//!   "./foo/*": { ... },
//!   "./bar": { ... }
//! },
//! "typesVersions": { "*": { "dist/types/*": [...], ..., "*": ["./dist/types/*.d.ts"] } }
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use serde_json::{Map, Value};

use crate::core::export_spec::{exports_key, ExportSpec, ROOT_EXPORT};
use crate::core::layout::{BuildLayout, ModuleFormat, DECLARATION_EXT, MODULE_EXT};
use crate::core::manifest::{Manifest, ManifestError, DERIVED_FIELDS};
use crate::util::fs;

/// Condition key for type declarations.
pub const COND_TYPES: &str = "types";
/// Condition key for `require` loading.
pub const COND_REQUIRE: &str = "require";
/// Fallback condition key.
pub const COND_DEFAULT: &str = "default";

/// Value of one `exports` entry.
///
/// Collapses to a scalar whenever a single condition would remain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportValue {
    Scalar(String),
    Conditional(Vec<(&'static str, String)>),
}

impl ExportValue {
    fn from_conditions(mut conditions: Vec<(&'static str, String)>) -> Self {
        if conditions.len() == 1 {
            let (_, path) = conditions.remove(0);
            ExportValue::Scalar(path)
        } else {
            ExportValue::Conditional(conditions)
        }
    }

    fn into_json(self) -> Value {
        match self {
            ExportValue::Scalar(path) => Value::String(path),
            ExportValue::Conditional(conditions) => Value::Object(
                conditions
                    .into_iter()
                    .map(|(cond, path)| (cond.to_string(), Value::String(path)))
                    .collect(),
            ),
        }
    }
}

/// Inputs for a synthesis run.
#[derive(Debug, Clone)]
pub struct SynthesizeOptions {
    /// Module name (without extension) of the package root entry.
    pub main: String,
    /// Declared subpath exports.
    pub exports: Vec<ExportSpec>,
    /// Output layout.
    pub layout: BuildLayout,
}

/// Outcome of a synthesis run.
#[derive(Debug, Clone)]
pub struct SynthesizeResult {
    /// Manifest that was rewritten.
    pub manifest_path: PathBuf,
    /// Number of `exports` entries written (0 when no map was written).
    pub export_count: usize,
    /// Whether `typesVersions` was written.
    pub types_versions: bool,
    /// Whether the file content changed.
    pub changed: bool,
}

/// Rewrite the manifest at `manifest_path` for the given layout.
pub fn synthesize(manifest_path: &Path, opts: &SynthesizeOptions) -> Result<SynthesizeResult> {
    let original =
        std::fs::read_to_string(manifest_path).map_err(|source| ManifestError::Read {
            path: manifest_path.to_path_buf(),
            source,
        })?;
    let mut manifest = Manifest::parse(manifest_path, &original)?;

    apply(&mut manifest, opts);

    let rendered = manifest.render()?;
    let changed = rendered != original;
    if changed {
        fs::write_atomic(manifest.path(), &rendered)?;
    } else {
        tracing::debug!("{} is up to date", manifest.path().display());
    }

    Ok(SynthesizeResult {
        manifest_path: manifest.path().to_path_buf(),
        export_count: manifest
            .get("exports")
            .and_then(Value::as_object)
            .map_or(0, Map::len),
        types_versions: manifest.get("typesVersions").is_some(),
        changed,
    })
}

/// Replace the derived fields of an in-memory manifest.
pub fn apply(manifest: &mut Manifest, opts: &SynthesizeOptions) {
    let layout = &opts.layout;

    for field in DERIVED_FIELDS {
        manifest.remove(field);
    }

    manifest.set("main", layout.module_path(ModuleFormat::CommonJs, &opts.main));
    manifest.set("module", layout.module_path(ModuleFormat::Esm, &opts.main));
    manifest.set("types", layout.declaration_path(&opts.main));

    if opts.exports.is_empty() && !layout.is_dual() {
        return;
    }

    manifest.set("exports", exports_map(&opts.main, &opts.exports, layout));

    if layout.is_dual() {
        let mut types_versions = Map::new();
        types_versions.insert(
            "*".to_string(),
            Value::Object(types_versions_map(&opts.exports, layout)),
        );
        manifest.set("typesVersions", Value::Object(types_versions));
    }
}

/// Build the ordered `exports` map.
pub fn exports_map(main: &str, exports: &[ExportSpec], layout: &BuildLayout) -> Map<String, Value> {
    let mut map = Map::new();

    let root = create_export(ROOT_EXPORT, main, layout);
    map.insert(root.0, root.1.into_json());

    for format in layout.formats() {
        let (key, value) = deep_passthrough(format, layout);
        map.insert(key, value.into_json());
    }

    for spec in exports {
        let (key, value) = create_export(&spec.export_path, &spec.module_path, layout);
        if map.contains_key(&key) && !spec.is_root() {
            tracing::warn!(
                "export `{}` declared more than once; the last declaration wins",
                key
            );
        }
        map.insert(key, value.into_json());
    }

    map
}

/// Entry for one export path: `types`, `require` (dual only), `default`.
pub fn create_export(
    export_path: &str,
    module_path: &str,
    layout: &BuildLayout,
) -> (String, ExportValue) {
    let mut conditions = Vec::with_capacity(3);
    if layout.is_dual() {
        conditions.push((COND_TYPES, layout.declaration_path(module_path)));
        conditions.push((
            COND_REQUIRE,
            layout.module_path(ModuleFormat::CommonJs, module_path),
        ));
    }
    conditions.push((COND_DEFAULT, layout.module_path(ModuleFormat::Esm, module_path)));

    (exports_key(export_path), ExportValue::from_conditions(conditions))
}

/// Wildcard entry exposing every compiled file of a module tree.
fn deep_passthrough(format: ModuleFormat, layout: &BuildLayout) -> (String, ExportValue) {
    let tree = layout.tree(format);
    let key = format!("./{}/*", tree);
    let target = format!("./{}/*.{}", tree, MODULE_EXT);

    let mut conditions = Vec::with_capacity(2);
    if layout.is_dual() {
        conditions.push((COND_TYPES, layout.declaration_path("*")));
    }
    conditions.push((COND_DEFAULT, target));

    (key, ExportValue::from_conditions(conditions))
}

/// Build the ordered `typesVersions["*"]` map.
///
/// Resolvers take the first matching pattern, so the catch-all `*` always
/// comes last.
pub fn types_versions_map(exports: &[ExportSpec], layout: &BuildLayout) -> Map<String, Value> {
    let types = layout.types();
    let fallback = |path: String| Value::Array(vec![Value::String(path)]);
    let any_declaration = format!("./{}/*.{}", types, DECLARATION_EXT);

    let mut map = Map::new();
    map.insert(format!("{}/*", types), fallback(format!("./{}/*", types)));

    for format in layout.formats() {
        map.insert(
            format!("{}/*", layout.tree(format)),
            fallback(any_declaration.clone()),
        );
    }

    for spec in exports.iter().filter(|s| !s.is_root()) {
        map.insert(
            spec.export_path.clone(),
            fallback(layout.declaration_path(&spec.module_path)),
        );
    }

    map.shift_remove("*");
    map.insert("*".to_string(), fallback(any_declaration));

    map
}
