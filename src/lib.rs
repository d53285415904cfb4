//! Shipwright - dual-convention library builds for TypeScript packages
//!
//! This crate compiles a package's sources into ESM (and optionally
//! CommonJS) trees plus type declarations, then rewrites the entry-point
//! fields of `package.json` to match the produced layout.

pub mod builder;
pub mod core;
pub mod ops;
pub mod util;

/// Test utilities and mocks for Shipwright unit tests.
///
/// This module is only available when compiling with `--cfg test`. It
/// provides package fixtures and a toolchain that records requests
/// instead of running Node.
#[cfg(test)]
pub mod test_support;

pub use core::{BuildLayout, ExportSpec, Manifest, ModuleFormat, SourceEntry};
pub use util::context::GlobalContext;
