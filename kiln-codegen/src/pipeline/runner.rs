//! Pipeline orchestrator.

use kiln_ir::Exposure;
use kiln_manifest::Manifest;
use tracing::debug;

use super::{
    CompilationContext, Phase, PhaseInfo, Plugin,
    phases::{AggregatePhase, LowerPhase, ValidatePhase},
};
use crate::Result;

/// The compilation pipeline orchestrator.
///
/// The pipeline manages the execution of compilation phases and plugin hooks.
/// It runs built-in phases (validate, lower, aggregate) followed by any user
/// phases, calling plugin hooks before and after each phase.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::new()
///     .exposure(exposure)
///     .plugin(MyPlugin::new())
///     .phase(MyCustomPhase);
///
/// let ctx = pipeline.run(manifest)?;
/// ```
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
    exposure: Exposure,
}

impl Pipeline {
    /// Create a new pipeline with default built-in phases.
    pub fn new() -> Self {
        Self {
            phases: Vec::new(),
            plugins: Vec::new(),
            exposure: Exposure::default(),
        }
    }

    /// Set which bindings are externally exposed.
    pub fn exposure(mut self, exposure: Exposure) -> Self {
        self.exposure = exposure;
        self
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    /// Add a plugin to receive phase lifecycle hooks.
    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Parse manifest bytes and run the pipeline on them.
    pub fn compile(&self, bytes: &[u8]) -> Result<CompilationContext> {
        let manifest = Manifest::from_slice(bytes)?;
        self.run(manifest)
    }

    /// Run the pipeline on a manifest.
    ///
    /// Executes all phases in order:
    /// 1. ValidatePhase - runs lints, collects diagnostics
    /// 2. LowerPhase - builds the resource graph, applies the exposure
    /// 3. AggregatePhase - derives the platform registry
    /// 4. User phases (if any)
    ///
    /// Plugin hooks are called before and after each phase.
    ///
    /// # Errors
    ///
    /// Returns an error if any phase fails fatally.
    pub fn run(&self, manifest: Manifest) -> Result<CompilationContext> {
        let mut ctx = CompilationContext::new(manifest);
        ctx.exposure = self.exposure.clone();

        // Run built-in phases, then user phases
        for phase in builtin_phases().iter().chain(self.phases.iter()) {
            self.run_phase(phase.as_ref(), &mut ctx)?;
        }

        Ok(ctx)
    }

    /// Name and description of every phase, in execution order.
    pub fn phase_info(&self) -> Vec<PhaseInfo> {
        builtin_phases()
            .iter()
            .chain(self.phases.iter())
            .map(|phase| phase.info())
            .collect()
    }

    /// Run a single phase with plugin hooks.
    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
        let phase_name = phase.name();

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        debug!(phase = phase_name, "running phase");
        phase.run(ctx)?;

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

/// Built-in phases in execution order.
fn builtin_phases() -> Vec<Box<dyn Phase>> {
    vec![
        Box::new(ValidatePhase::new()),
        Box::new(LowerPhase),
        Box::new(AggregatePhase),
    ]
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::Error;

    const MANIFEST: &str = r#"{
      "resources": {
        "storage": { "type": "azure.storage.v0" },
        "blobs": { "type": "azure.storage.blob.v0", "parent": "storage" },
        "web": {
          "type": "project.v0",
          "path": "Web.csproj",
          "env": { "BLOBS": "{blobs.connectionString}" },
          "bindings": { "http": { "scheme": "http", "protocol": "tcp", "transport": "http" } }
        }
      }
    }"#;

    struct CountingPlugin {
        before_count: Arc<AtomicUsize>,
        after_count: Arc<AtomicUsize>,
    }

    impl CountingPlugin {
        fn new() -> (Self, Arc<AtomicUsize>, Arc<AtomicUsize>) {
            let before = Arc::new(AtomicUsize::new(0));
            let after = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    before_count: before.clone(),
                    after_count: after.clone(),
                },
                before,
                after,
            )
        }
    }

    impl Plugin for CountingPlugin {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn on_before_phase(&self, _phase: &str, _ctx: &mut CompilationContext) -> Result<()> {
            self.before_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn on_after_phase(&self, _phase: &str, _ctx: &mut CompilationContext) -> Result<()> {
            self.after_count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct RecordingPhase(Arc<Mutex<Vec<String>>>);

    impl Phase for RecordingPhase {
        fn name(&self) -> &'static str {
            "record"
        }

        fn description(&self) -> &'static str {
            "Record deployable names"
        }

        fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
            let names = ctx.graph()?.deployables().map(|r| r.name.clone());
            self.0.lock().unwrap().extend(names);
            Ok(())
        }
    }

    #[test]
    fn test_pipeline_runs_phases() {
        let ctx = Pipeline::new()
            .compile(MANIFEST.as_bytes())
            .expect("pipeline should succeed");

        assert_eq!(ctx.graph().unwrap().len(), 3);
        let registry = ctx.registry().unwrap();
        assert_eq!(registry.storage("storage").unwrap().blobs.len(), 1);
        assert!(registry.needs_environment());
    }

    #[test]
    fn test_pipeline_plugin_hooks() {
        let (plugin, before_count, after_count) = CountingPlugin::new();

        let _ = Pipeline::new()
            .plugin(plugin)
            .compile(MANIFEST.as_bytes())
            .expect("pipeline should succeed");

        // 3 built-in phases = 3 before + 3 after hooks
        assert_eq!(before_count.load(Ordering::SeqCst), 3);
        assert_eq!(after_count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_user_phase_runs_last() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        Pipeline::new()
            .phase(RecordingPhase(seen.clone()))
            .compile(MANIFEST.as_bytes())
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["web".to_string()]);
    }

    #[test]
    fn test_phase_info_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let names: Vec<_> = Pipeline::new()
            .phase(RecordingPhase(seen))
            .phase_info()
            .into_iter()
            .map(|info| info.name)
            .collect();

        assert_eq!(names, vec!["validate", "lower", "aggregate", "record"]);
    }

    #[test]
    fn test_exposure_applied() {
        let mut exposure = Exposure::new();
        exposure.expose_all("web");

        let ctx = Pipeline::new()
            .exposure(exposure)
            .compile(MANIFEST.as_bytes())
            .unwrap();

        let web = ctx.graph().unwrap().get("web").unwrap();
        assert!(web.has_external_binding());
    }

    #[test]
    fn test_unknown_exposure_fails() {
        let mut exposure = Exposure::new();
        exposure.expose_all("ghost");

        let err = Pipeline::new()
            .exposure(exposure)
            .compile(MANIFEST.as_bytes())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownResource { name } if name == "ghost"));
    }

    #[test]
    fn test_structural_error() {
        let err = Pipeline::new().compile(b"{ not json").unwrap_err();
        assert!(matches!(err, Error::Manifest(_)));
    }
}
