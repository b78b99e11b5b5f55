//! Compilation pipeline and shared code generation utilities for kiln.
//!
//! This crate turns a parsed manifest into the state the emitters consume.
//!
//! # Module Organization
//!
//! - [`pipeline`] - Phases (validate → lower → aggregate) and plugin hooks
//! - [`resolve`] - Reference expression scanning and the rewrite rule table
//! - [`builder`] - Indentation-aware text building for rendered templates

pub mod builder;
mod error;
mod generator;
pub mod pipeline;
pub mod resolve;

pub use error::{Error, Result};
pub use generator::Generator;
