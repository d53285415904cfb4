//! JavaScript build toolchain.
//!
//! Adapters for the external bundler (rollup + swc) and declaration compiler
//! (tsc), behind the [`Toolchain`] trait.

pub mod errors;
pub mod events;
pub mod rollup;
pub mod toolchain;
pub mod tsc;

pub use errors::ToolchainError;
pub use events::BuildEvent;
pub use toolchain::{BundleRequest, DeclarationRequest, NodeToolchain, Toolchain, DEFAULT_TARGET};
