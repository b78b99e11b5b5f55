//! Generate operation - artifacts from a manifest.

use std::path::Path;

use eyre::{Context, Result, bail};
use kiln_codegen::{Generator as _, pipeline::Pipeline};
use kiln_codegen_aca::Generator as AcaGenerator;
use kiln_codegen_bicep::Generator as BicepGenerator;
use kiln_core::GeneratedOutput;
use kiln_manifest::Manifest;
use tracing::info;

use super::describe;
use crate::{
    config::Project,
    reports::{GenerateReport, GenerationResult, PreviewFile, PreviewResult, WrittenResult},
};

/// Options for the generate operation.
pub struct GenerateOptions<'a> {
    /// Directory the artifacts are written below.
    pub output_dir: &'a Path,
    /// Whether to preview without writing files.
    pub dry_run: bool,
}

/// Execute the generate operation.
///
/// Compiles the manifest, renders the infrastructure and every service
/// manifest, then writes them unless this is a dry run. Nothing is written
/// if any service fails to render.
pub fn generate(
    manifest: Manifest,
    project: &Project,
    opts: GenerateOptions<'_>,
) -> Result<GenerateReport> {
    let ctx = Pipeline::new()
        .exposure(project.exposure.clone())
        .run(manifest)
        .wrap_err("Pipeline failed")?;

    let warnings = ctx.warnings().map(|d| d.message.clone()).collect();

    let mut output = BicepGenerator::new(ctx.registry()?).preview()?;

    let mut services = Vec::new();
    let mut failures = Vec::new();
    for (name, file) in AcaGenerator::new(ctx.graph()?).emit_each() {
        match file {
            Ok(file) => {
                output.insert(file);
                services.push(name.to_string());
            }
            Err(err) => failures.push(format!("{}: {}", name, describe(&err))),
        }
    }
    if !failures.is_empty() {
        bail!(
            "failed to emit {} service manifest(s):\n  {}",
            failures.len(),
            failures.join("\n  ")
        );
    }

    let result = if opts.dry_run {
        GenerationResult::Preview(preview(&output))
    } else {
        let files = output
            .write_all(opts.output_dir)
            .wrap_err("Failed to write artifacts")?;
        info!(count = files.len(), dir = %opts.output_dir.display(), "wrote artifacts");
        GenerationResult::Written(WrittenResult {
            output_dir: opts.output_dir.to_path_buf(),
            files,
        })
    };

    Ok(GenerateReport {
        project_name: project.name.clone(),
        manifest_path: project.manifest_path.clone(),
        warnings,
        services,
        result,
    })
}

fn preview(output: &GeneratedOutput) -> PreviewResult {
    let files = output
        .iter()
        .map(|(path, file)| PreviewFile {
            path: path.to_string(),
            content: file.content().to_string(),
        })
        .collect();
    PreviewResult { files }
}
