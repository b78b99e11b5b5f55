//! Azure Container Apps service manifest emitter.
//!
//! Renders one `containerApp.tmpl.yaml` per deployable resource. Reference
//! expressions in environment values and container arguments are resolved
//! into deploy-time template expressions while the template is built.

mod context;
mod emitter;
mod generator;

pub mod files;

pub use context::{EnvValue, Ingress, Secret, ServiceManifestContext};
pub use emitter::{ServiceManifestEmitter, TEMPLATE_FILE};
pub use generator::Generator;
