//! Built-in pipeline phases.
//!
//! This module provides the standard phases that run in every pipeline:
//!
//! - [`ValidatePhase`] - runs lints on the manifest and collects diagnostics
//! - [`LowerPhase`] - builds the resource graph and applies the exposure
//! - [`AggregatePhase`] - derives shared platform resources from the graph

mod aggregate;
mod lower;
mod validate;

pub use aggregate::AggregatePhase;
pub use lower::LowerPhase;
pub use validate::{IngressPortLint, Lint, LintInfo, UnknownTypeLint, ValidatePhase};
