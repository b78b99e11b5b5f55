//! Intermediate representation types for the kiln compiler.
//!
//! This crate provides the in-memory model every later stage works on.
//!
//! # Architecture
//!
//! ```text
//! manifest.json → kiln-manifest (parsing) → kiln-ir (graph, catalog, registry) → emitters
//! ```
//!
//! - [`ResourceGraph`] holds every declared resource by name, in declaration order
//! - [`TypeCatalog`] maps resource names to their [`PlatformType`]
//! - [`PlatformRegistry`] collects the shared platform resources derived from the graph

mod catalog;
mod error;
mod exposure;
mod graph;
mod registry;
mod resource;
mod types;

pub use catalog::TypeCatalog;
pub use error::{ExposureError, UnknownBinding, UnknownResource};
pub use exposure::{ExposedBindings, Exposure};
pub use graph::ResourceGraph;
pub use registry::{EnvironmentService, PlatformRegistry, ServiceBusNamespace, StorageAccount};
pub use resource::{Binding, Payload, Resource};
pub use types::{PlatformType, ResourceKind};
