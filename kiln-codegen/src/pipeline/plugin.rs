//! Hooks around each pipeline phase.

use super::CompilationContext;
use crate::Result;

/// Observer called around every phase, built-in or added.
///
/// A plugin sees the context as the phase found it and as it left it, so it
/// can adjust inputs before `lower` (exposure, manifest) or inspect the graph
/// and registry afterwards. Returning an error stops the pipeline.
///
/// ```ignore
/// struct PublicFrontend;
///
/// impl Plugin for PublicFrontend {
///     fn name(&self) -> &'static str { "public-frontend" }
///
///     fn on_before_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
///         if phase == "lower" {
///             ctx.exposure.expose_binding("frontend", "https");
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: Send + Sync {
    fn name(&self) -> &'static str;

    #[allow(unused_variables)]
    fn on_before_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
        Ok(())
    }

    #[allow(unused_variables)]
    fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
        Ok(())
    }
}
