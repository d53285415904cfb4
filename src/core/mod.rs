//! Core data structures for Shipwright.
//!
//! - Source entries and their classification
//! - Output tree layout
//! - Export declarations
//! - The `package.json` document

pub mod export_spec;
pub mod layout;
pub mod manifest;
pub mod source;

pub use export_spec::{ExportSpec, ExportSpecError};
pub use layout::{BuildLayout, ModuleFormat};
pub use manifest::{find_manifest, Manifest, ManifestError, MANIFEST_NAME};
pub use source::{classify, SourceEntry};
