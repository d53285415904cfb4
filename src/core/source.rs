//! Source discovery and classification.

use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;

use crate::util::fs;

/// Default glob for buildable sources.
pub const DEFAULT_SOURCE_GLOB: &str = "src/**/*.{ts,tsx}";

/// Default pattern for test and story files that must not be built.
pub const DEFAULT_IGNORE_PATTERN: &str = r"\.(spec|stories|test)\.\w+$";

/// One discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Path relative to the package root, `/`-separated.
    pub path: String,
    /// Whether the file is a test/story artifact.
    pub ignored: bool,
}

/// Enumerate sources under `root` matching `source_glob` and mark the ones
/// whose file name matches `ignore_pattern`.
///
/// Entries are sorted by path.
pub fn classify(root: &Path, source_glob: &str, ignore_pattern: &str) -> Result<Vec<SourceEntry>> {
    let ignore = Regex::new(ignore_pattern)
        .with_context(|| format!("invalid ignore pattern: {}", ignore_pattern))?;

    let mut entries = Vec::new();
    for pattern in expand_braces(source_glob) {
        for path in fs::glob_files(root, &[pattern])? {
            let rel = fs::relative_path(root, &path);
            let rel = rel.to_string_lossy().replace('\\', "/");
            let ignored = is_ignored(&ignore, &path);
            entries.push(SourceEntry { path: rel, ignored });
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    entries.dedup_by(|a, b| a.path == b.path);

    tracing::debug!(
        "classified {} source file(s), {} ignored",
        entries.len(),
        entries.iter().filter(|e| e.ignored).count()
    );

    Ok(entries)
}

/// Entries that go into the build.
pub fn buildable(entries: &[SourceEntry]) -> Vec<&SourceEntry> {
    entries.iter().filter(|e| !e.ignored).collect()
}

fn is_ignored(ignore: &Regex, path: &Path) -> bool {
    path.file_name()
        .map(|name| ignore.is_match(&name.to_string_lossy()))
        .unwrap_or(false)
}

/// Expand one level of `{a,b}` alternatives, which the `glob` crate lacks.
fn expand_braces(pattern: &str) -> Vec<String> {
    let (Some(open), Some(close)) = (pattern.find('{'), pattern.find('}')) else {
        return vec![pattern.to_string()];
    };
    if close < open {
        return vec![pattern.to_string()];
    }

    let (head, tail) = (&pattern[..open], &pattern[close + 1..]);
    pattern[open + 1..close]
        .split(',')
        .flat_map(|alt| expand_braces(&format!("{}{}{}", head, alt, tail)))
        .collect()
}
