//! Compilation context passed through pipeline phases.

use kiln_ir::{Exposure, PlatformRegistry, ResourceGraph};
use kiln_manifest::Manifest;

use super::diagnostic::{Diagnostic, Severity};
use crate::{Error, Result, resolve::Resolver};

/// Context passed through all pipeline phases.
///
/// This struct carries the state of compilation through each phase,
/// accumulating results and diagnostics along the way. Once the pipeline has
/// run it is only read, so emitters can share it across threads.
#[derive(Debug)]
pub struct CompilationContext {
    /// The original manifest being compiled.
    pub manifest: Manifest,
    /// Caller decision on externally exposed bindings (applied by LowerPhase).
    pub exposure: Exposure,
    /// The resource graph (populated by LowerPhase).
    pub graph: Option<ResourceGraph>,
    /// Shared platform resources (populated by AggregatePhase).
    pub registry: Option<PlatformRegistry>,
    /// Diagnostics collected during compilation.
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    /// Create a new compilation context from a manifest.
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            exposure: Exposure::default(),
            graph: None,
            registry: None,
            diagnostics: Vec::new(),
        }
    }

    /// The resource graph, if LowerPhase has run.
    pub fn graph(&self) -> Result<&ResourceGraph> {
        self.graph
            .as_ref()
            .ok_or(Error::PhaseOrder { phase: "lower" })
    }

    /// The platform registry, if AggregatePhase has run.
    pub fn registry(&self) -> Result<&PlatformRegistry> {
        self.registry
            .as_ref()
            .ok_or(Error::PhaseOrder { phase: "aggregate" })
    }

    /// A resolver over the lowered graph.
    pub fn resolver(&self) -> Result<Resolver<'_>> {
        self.graph().map(Resolver::with_graph)
    }

    /// Check if any error diagnostics have been recorded.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    /// Check if any warning diagnostics have been recorded.
    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    /// Count the number of error diagnostics.
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    /// Count the number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Add an error diagnostic.
    pub fn add_error(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(phase, message));
    }

    /// Add a warning diagnostic.
    pub fn add_warning(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::warning(phase, message));
    }

    /// Add an info diagnostic.
    pub fn add_info(&mut self, phase: &str, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::info(phase, message));
    }

    /// Add a diagnostic with a location.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Get all error diagnostics.
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Error))
    }

    /// Get all warning diagnostics.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d.severity, Severity::Warning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_manifest() -> Manifest {
        Manifest::from_str_with_filename(
            r#"{ "resources": { "cache": { "type": "redis.v0" } } }"#,
            "manifest.json",
        )
        .expect("Failed to parse test manifest")
    }

    #[test]
    fn test_context_creation() {
        let ctx = CompilationContext::new(make_test_manifest());

        assert!(ctx.graph.is_none());
        assert!(ctx.registry.is_none());
        assert!(ctx.diagnostics.is_empty());
        assert!(ctx.exposure.is_empty());
    }

    #[test]
    fn test_accessors_before_phases() {
        let ctx = CompilationContext::new(make_test_manifest());

        assert!(matches!(
            ctx.graph(),
            Err(Error::PhaseOrder { phase: "lower" })
        ));
        assert!(matches!(
            ctx.registry(),
            Err(Error::PhaseOrder { phase: "aggregate" })
        ));
        assert!(ctx.resolver().is_err());
    }

    #[test]
    fn test_context_diagnostics() {
        let mut ctx = CompilationContext::new(make_test_manifest());

        ctx.add_error("test", "test error");
        ctx.add_warning("test", "test warning");
        ctx.add_info("test", "just info");

        assert!(ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);
    }

    #[test]
    fn test_context_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompilationContext>();
    }
}
