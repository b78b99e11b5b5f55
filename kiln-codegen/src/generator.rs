//! Target-agnostic generator trait.

use kiln_core::GeneratedOutput;

use crate::Result;

/// A generator renders one deployment target from a compiled context.
///
/// Implement this trait to add a new target (e.g., another IaC language).
pub trait Generator {
    /// Target identifier (e.g., "aca", "bicep")
    fn target(&self) -> &'static str;

    /// Render every file of the target, keyed by path relative to the target root.
    fn preview(&self) -> Result<GeneratedOutput>;
}
