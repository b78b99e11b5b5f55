//! App host manifest parsing and validation.
//!
//! The manifest is the JSON document an app host publishes to describe every
//! resource of a distributed application and how those resources are wired
//! together. This crate turns its bytes into a validated [`Manifest`], or a
//! [`miette`] diagnostic pointing at the offending part of the document.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod error;
mod manifest;
mod resource;

pub use error::{Error, Result, SourceContext};
pub use manifest::{Manifest, ParseContext};
pub use resource::{BindingEntry, InputEntry, ResourceEntry};
