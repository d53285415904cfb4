//! CLI integration tests for Shipwright.
//!
//! These tests drive the binary against packages in temporary directories.
//! They stick to the commands that do not need Node installed.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const PACKAGE_JSON: &str = r#"{
  "name": "my-lib",
  "version": "1.0.0",
  "dependencies": {
    "lodash": "^4.17.21"
  }
}
"#;

/// Get the shipwright binary command, isolated from the user's config.
fn shipwright(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("shipwright").unwrap();
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("COLUMNS", "60")
        .env_remove("RUST_LOG");
    cmd
}

/// Create a package with a manifest and the given source files.
fn package(sources: &[&str]) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("pkg");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("package.json"), PACKAGE_JSON).unwrap();
    for source in sources {
        let path = root.join(source);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "export const value = 1\n").unwrap();
    }
    (tmp, root)
}

fn read_manifest(root: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(root.join("package.json")).unwrap()).unwrap()
}

// ============================================================================
// shipwright manifest
// ============================================================================

#[test]
fn test_manifest_dual_build() {
    let (tmp, root) = package(&[]);

    shipwright(tmp.path())
        .args(["manifest", "--cjs", "--exports-map", "foo/*,bar:some/other/file"])
        .current_dir(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("Updated"));

    let pkg = read_manifest(&root);
    assert_eq!(pkg["name"], "my-lib");
    assert_eq!(pkg["main"], "./dist/cjs/index.js");
    assert_eq!(pkg["module"], "./dist/esm/index.js");
    assert_eq!(pkg["types"], "./dist/types/index.d.ts");
    assert_eq!(pkg["exports"]["."]["require"], "./dist/cjs/index.js");
    assert_eq!(pkg["exports"]["./bar"]["types"], "./dist/types/some/other/file.d.ts");
    assert_eq!(
        pkg["typesVersions"]["*"]["foo/*"][0],
        "./dist/types/foo/*.d.ts"
    );
}

#[test]
fn test_manifest_is_idempotent() {
    let (tmp, root) = package(&[]);
    let args = ["manifest", "--cjs", "--exports-map", "foo"];

    shipwright(tmp.path())
        .args(args)
        .current_dir(&root)
        .assert()
        .success();
    let first = fs::read(root.join("package.json")).unwrap();

    shipwright(tmp.path())
        .args(args)
        .current_dir(&root)
        .assert()
        .success()
        .stderr(predicate::str::contains("up to date"));
    let second = fs::read(root.join("package.json")).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_manifest_single_tree() {
    let (tmp, root) = package(&[]);

    shipwright(tmp.path())
        .args(["manifest", "--out-dir", "lib", "--main", "main", "--exports-map", "foo"])
        .current_dir(&root)
        .assert()
        .success();

    let pkg = read_manifest(&root);
    assert_eq!(pkg["main"], "./lib/main.js");
    assert_eq!(pkg["exports"]["."], "./lib/main.js");
    assert_eq!(pkg["exports"]["./foo"], "./lib/foo.js");
    assert!(pkg.get("typesVersions").is_none());
}

#[test]
fn test_manifest_explicit_package_json() {
    let (tmp, root) = package(&[]);

    shipwright(tmp.path())
        .args(["manifest", "--package-json"])
        .arg(root.join("package.json"))
        .current_dir(tmp.path())
        .assert()
        .success();

    assert_eq!(read_manifest(&root)["main"], "./dist/index.js");
}

#[test]
fn test_manifest_reads_project_config() {
    let (tmp, root) = package(&[]);
    fs::create_dir_all(root.join(".shipwright")).unwrap();
    fs::write(
        root.join(".shipwright/config.toml"),
        "[build]\nout_dir = \"build\"\ncjs = true\nexports = [\"foo\"]\n",
    )
    .unwrap();

    shipwright(tmp.path())
        .arg("manifest")
        .current_dir(&root)
        .assert()
        .success();

    let pkg = read_manifest(&root);
    assert_eq!(pkg["module"], "./build/esm/index.js");
    assert_eq!(pkg["exports"]["./foo"]["default"], "./build/esm/foo.js");
}

#[test]
fn test_manifest_no_cjs_overrides_config() {
    let (tmp, root) = package(&[]);
    fs::create_dir_all(root.join(".shipwright")).unwrap();
    fs::write(root.join(".shipwright/config.toml"), "[build]\ncjs = true\n").unwrap();

    shipwright(tmp.path())
        .args(["manifest", "--no-cjs"])
        .current_dir(&root)
        .assert()
        .success();

    let pkg = read_manifest(&root);
    assert_eq!(pkg["main"], "./dist/index.js");
    assert!(pkg.get("typesVersions").is_none());
}

#[test]
fn test_manifest_rejects_absolute_out_dir() {
    let (tmp, root) = package(&[]);

    shipwright(tmp.path())
        .args(["manifest", "--out-dir", "/abs/out"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be relative"));

    assert_eq!(
        fs::read_to_string(root.join("package.json")).unwrap(),
        PACKAGE_JSON
    );
}

#[test]
fn test_manifest_malformed_is_untouched() {
    let (tmp, root) = package(&[]);
    fs::write(root.join("package.json"), "{ \"name\": ").unwrap();

    shipwright(tmp.path())
        .args(["manifest", "--cjs"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse"));

    assert_eq!(
        fs::read_to_string(root.join("package.json")).unwrap(),
        "{ \"name\": "
    );
}

#[test]
fn test_manifest_invalid_export() {
    let (tmp, root) = package(&[]);

    shipwright(tmp.path())
        .args(["manifest", "--exports-map", "foo,,bar"])
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid export declaration"));

    assert_eq!(
        fs::read_to_string(root.join("package.json")).unwrap(),
        PACKAGE_JSON
    );
}

#[test]
fn test_manifest_missing_package_json() {
    let tmp = TempDir::new().unwrap();

    shipwright(tmp.path())
        .args(["manifest", "--package-json", "nope/package.json"])
        .current_dir(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// ============================================================================
// shipwright files
// ============================================================================

#[test]
fn test_files_report() {
    let (tmp, root) = package(&["src/index.ts", "src/a/b/index.test.ts", "src/a/b/index.ts"]);

    shipwright(tmp.path())
        .args(["files", "--color", "never"])
        .current_dir(&root)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("build files:\n"))
        .stdout(predicate::str::contains(format!(
            "  {:<48}{:>10}\n",
            "src/a/b/index.test.ts", "[ignore]"
        )))
        .stdout(predicate::str::contains(format!(
            "  {:<48}{:>10}\n",
            "src/a/b/index.ts", "[build]"
        )))
        .stdout(predicate::str::contains("\x1B[").not());
}

#[test]
fn test_files_json() {
    let (tmp, root) = package(&["src/index.ts", "src/index.stories.tsx"]);

    shipwright(tmp.path())
        .args(["files", "--message-format", "json"])
        .current_dir(&root)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"{"reason":"source-file","path":"src/index.stories.tsx","ignored":true}"#,
        ))
        .stdout(predicate::str::contains(
            r#"{"reason":"source-file","path":"src/index.ts","ignored":false}"#,
        ));
}

// ============================================================================
// shipwright build
// ============================================================================

#[test]
fn test_build_without_tools_fails_cleanly() {
    let (tmp, root) = package(&["src/index.ts"]);
    let empty_path = tmp.path().join("empty-bin");
    fs::create_dir_all(&empty_path).unwrap();

    shipwright(tmp.path())
        .args(["build", "--cjs"])
        .env("PATH", &empty_path)
        .current_dir(&root)
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not find `rollup`"));

    assert_eq!(
        fs::read_to_string(root.join("package.json")).unwrap(),
        PACKAGE_JSON
    );
    assert!(!root.join("dist").exists());
}

// ============================================================================
// shipwright completions
// ============================================================================

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();

    shipwright(tmp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shipwright"));
}
