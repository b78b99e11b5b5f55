//! Check operation - manifest validation.

use eyre::Result;
use kiln_codegen::pipeline::{
    CompilationContext, Phase, Pipeline, Severity, phases::ValidatePhase,
};
use kiln_codegen_aca::Generator as AcaGenerator;
use kiln_manifest::Manifest;
use tracing::debug;

use super::describe;
use crate::{
    config::Project,
    reports::{CheckReport, ServiceCheck},
};

/// Execute the check operation.
///
/// Runs the lints, then compiles the manifest and renders every service
/// manifest in memory, recording each failure instead of stopping at the first.
pub fn check(manifest: Manifest, project: &Project) -> Result<CheckReport> {
    let resource_count = manifest.len();

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut infos = Vec::new();

    // Lints run on their own context so their diagnostics survive a failed compile.
    let mut lint_ctx = CompilationContext::new(manifest.clone());
    if let Err(err) = ValidatePhase::new().run(&mut lint_ctx) {
        debug!(%err, "lints reported errors");
    }

    for diag in &lint_ctx.diagnostics {
        let msg = match &diag.location {
            Some(loc) => format!("{}\n  --> {}", diag.message, loc),
            None => diag.message.clone(),
        };

        match diag.severity {
            Severity::Error => errors.push(msg),
            Severity::Warning => warnings.push(msg),
            Severity::Info => infos.push(msg),
        }
    }

    let mut services = Vec::new();
    if !lint_ctx.has_errors() {
        match Pipeline::new()
            .exposure(project.exposure.clone())
            .run(manifest)
        {
            Ok(ctx) => {
                services = AcaGenerator::new(ctx.graph()?)
                    .emit_each()
                    .into_iter()
                    .map(|(name, file)| ServiceCheck {
                        name: name.to_string(),
                        error: file.err().map(|err| describe(&err)),
                    })
                    .collect();
            }
            Err(err) => errors.push(describe(&err)),
        }
    }

    Ok(CheckReport {
        manifest_path: project.manifest_path.clone(),
        resource_count,
        errors,
        warnings,
        infos,
        services,
    })
}
