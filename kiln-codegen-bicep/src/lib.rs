//! Bicep infrastructure emitter.
//!
//! Renders `main.bicep`, `main.parameters.json` and one module under
//! `modules/` for each kind of platform resource present in the
//! [`PlatformRegistry`](kiln_ir::PlatformRegistry).

mod emitter;
mod generator;
mod naming;

pub mod files;

pub use emitter::InfraEmitter;
pub use generator::Generator;
