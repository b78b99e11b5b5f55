//! The unit of work the pipeline runs.

use super::CompilationContext;
use crate::Result;

/// Name and summary of a phase, as listed by `kiln explain`.
#[derive(Debug, Clone)]
pub struct PhaseInfo {
    pub name: &'static str,
    pub description: &'static str,
}

/// One step from manifest to platform registry.
///
/// The built-in order is validate (lints into diagnostics), lower (manifest
/// into [`ResourceGraph`](kiln_ir::ResourceGraph), exposure applied) and
/// aggregate (graph into [`PlatformRegistry`](kiln_ir::PlatformRegistry)).
/// Phases added with [`Pipeline::phase`](super::Pipeline::phase) run after
/// aggregate and can read both.
pub trait Phase: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Fails only when the manifest cannot be compiled any further; findings
    /// that leave the graph usable go to `ctx.diagnostics`.
    fn run(&self, ctx: &mut CompilationContext) -> Result<()>;

    fn info(&self) -> PhaseInfo {
        PhaseInfo {
            name: self.name(),
            description: self.description(),
        }
    }
}
