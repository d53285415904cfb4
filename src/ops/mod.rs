//! High-level operations.
//!
//! This module contains the implementation of Shipwright commands.

pub mod report;
pub mod shipwright_build;
pub mod synthesize;

pub use report::{terminal_columns, write_file_report};
pub use shipwright_build::{build, compile, BuildOptions, BuildResult, CompileOptions};
pub use synthesize::{synthesize, ExportValue, SynthesizeOptions, SynthesizeResult};
