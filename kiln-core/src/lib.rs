//! Core utilities and types for the kiln manifest compiler.
//!
//! This crate provides fundamental types and utilities used across
//! the kiln crates.

mod file;
mod output;
mod types;
mod utils;

// File operations
pub use file::{File, FileRules, GeneratedFile, Overwrite, WriteResult};
pub use output::GeneratedOutput;
// Fundamental types
pub use types::{Protocol, Scheme, Transport};
// String utilities
pub use utils::{alpha_snake_upper, to_bicep_identifier, to_secret_name};

/// Header placed at the top of every generated artifact.
pub const GENERATED_HEADER: &str = "Generated by kiln. DO NOT EDIT.";
