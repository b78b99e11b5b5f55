//! Compilation pipeline.
//!
//! This module provides a [`Pipeline`] orchestrator that manages the phases
//! from a parsed manifest to the state emitters render from. The pipeline provides:
//!
//! - Explicit phase boundaries (validate → lower → aggregate)
//! - Plugin hooks for extensibility (before/after each phase)
//! - Unified diagnostics collection
//! - Shared state via [`CompilationContext`]
//!
//! # Example
//!
//! ```ignore
//! use kiln_codegen::pipeline::Pipeline;
//!
//! let mut exposure = Exposure::new();
//! exposure.expose_all("web");
//!
//! let ctx = Pipeline::new().exposure(exposure).run(manifest)?;
//!
//! for diag in ctx.warnings() {
//!     eprintln!("warning: {}", diag.message);
//! }
//! ```

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod plugin;
mod runner;

pub use context::CompilationContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::{Phase, PhaseInfo};
pub use plugin::Plugin;
pub use runner::Pipeline;
