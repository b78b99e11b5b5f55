//! Explain operation - pipeline explanation.

use eyre::{Context, Result};
use kiln_codegen::{
    Generator as _,
    pipeline::{Pipeline, phases::ValidatePhase},
};
use kiln_codegen_aca::TEMPLATE_FILE;
use kiln_codegen_bicep::Generator as BicepGenerator;
use kiln_ir::PlatformRegistry;
use kiln_manifest::Manifest;

use crate::{
    config::Project,
    reports::{ExplainReport, LintInfo, PhaseInfo, RegistryEntry, ResourceInfo},
};

/// Execute the explain operation.
///
/// Runs the pipeline and returns what it did with the manifest.
pub fn explain(manifest: Manifest, project: &Project) -> Result<ExplainReport> {
    let pipeline = Pipeline::new().exposure(project.exposure.clone());

    let phases = pipeline
        .phase_info()
        .into_iter()
        .map(|p| PhaseInfo {
            name: p.name.to_string(),
            description: p.description.to_string(),
        })
        .collect();

    let lints = ValidatePhase::new()
        .lint_info()
        .into_iter()
        .map(|l| LintInfo {
            name: l.name.to_string(),
            description: l.description.to_string(),
        })
        .collect();

    let ctx = pipeline.run(manifest).wrap_err("Pipeline failed")?;
    let graph = ctx.graph()?;
    let registry = ctx.registry()?;

    let resources = graph
        .iter()
        .map(|r| ResourceInfo {
            name: r.name.clone(),
            platform_type: r.platform_type.tag().to_string(),
            deployable: r.is_deployable(),
            external: r
                .bindings
                .iter()
                .filter(|(_, b)| b.external)
                .map(|(name, _)| name.clone())
                .collect(),
        })
        .collect();

    let catalog = graph
        .catalog()
        .iter()
        .map(|(name, ty)| (name.to_string(), ty.tag().to_string()))
        .collect();

    let mut files: Vec<String> = BicepGenerator::new(registry)
        .preview()?
        .paths()
        .map(str::to_string)
        .collect();
    files.extend(
        graph
            .deployables()
            .map(|r| format!("{}/{}", r.name, TEMPLATE_FILE)),
    );

    Ok(ExplainReport {
        manifest_path: project.manifest_path.clone(),
        config_path: project.config_path.clone(),
        phases,
        lints,
        resources,
        catalog,
        registry: registry_entries(registry),
        files,
    })
}

fn registry_entries(registry: &PlatformRegistry) -> Vec<RegistryEntry> {
    let mut entries = Vec::new();
    let mut push = |kind: &str, items: Vec<String>| {
        if !items.is_empty() {
            entries.push(RegistryEntry {
                kind: kind.to_string(),
                items,
            });
        }
    };

    if registry.needs_environment() {
        let mut items = vec!["container apps environment".to_string()];
        items.extend(
            registry
                .environment_services()
                .iter()
                .map(|(name, service)| format!("{} ({})", name, service.as_str())),
        );
        push("environment", items);
    }

    push(
        "storage",
        registry
            .storage_accounts()
            .iter()
            .map(|(name, account)| {
                format!(
                    "{} (blobs: {}; queues: {}; tables: {})",
                    name,
                    join(&account.blobs),
                    join(&account.queues),
                    join(&account.tables)
                )
            })
            .collect(),
    );

    push(
        "servicebus",
        registry
            .service_buses()
            .iter()
            .map(|(name, bus)| {
                format!(
                    "{} (queues: {}; topics: {})",
                    name,
                    join(&bus.queues),
                    join(&bus.topics)
                )
            })
            .collect(),
    );

    push("keyvault", registry.key_vaults().iter().cloned().collect());
    push("appinsights", registry.app_insights().iter().cloned().collect());

    entries
}

fn join<'a>(names: impl IntoIterator<Item = &'a String>) -> String {
    let names: Vec<&str> = names.into_iter().map(String::as_str).collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(", ")
    }
}
