//! Explain command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from pipeline explanation.
#[derive(Debug)]
pub struct ExplainReport {
    /// Path to the manifest.
    pub manifest_path: PathBuf,
    /// Config file, if one was read.
    pub config_path: Option<PathBuf>,
    /// Pipeline phases.
    pub phases: Vec<PhaseInfo>,
    /// Validation lints.
    pub lints: Vec<LintInfo>,
    /// Resources in declaration order.
    pub resources: Vec<ResourceInfo>,
    /// Type catalog entries, sorted by name.
    pub catalog: Vec<(String, String)>,
    /// Shared platform resources derived by the aggregate phase.
    pub registry: Vec<RegistryEntry>,
    /// Paths that `generate` would write, relative to the output directory.
    pub files: Vec<String>,
}

/// Information about a pipeline phase.
#[derive(Debug)]
pub struct PhaseInfo {
    pub name: String,
    pub description: String,
}

/// Information about a validation lint.
#[derive(Debug)]
pub struct LintInfo {
    pub name: String,
    pub description: String,
}

/// One resource of the graph.
#[derive(Debug)]
pub struct ResourceInfo {
    pub name: String,
    pub platform_type: String,
    pub deployable: bool,
    /// Binding names marked external after the exposure was applied.
    pub external: Vec<String>,
}

/// One platform resource kind and its members.
#[derive(Debug)]
pub struct RegistryEntry {
    /// Kind label (e.g., "storage").
    pub kind: String,
    /// Member descriptions.
    pub items: Vec<String>,
}

impl Report for ExplainReport {
    fn render(&self, out: &mut dyn Output) {
        out.title("Kiln Pipeline Explanation");
        out.newline();

        out.key_value("Input", &self.manifest_path.display().to_string());
        if let Some(config) = &self.config_path {
            out.key_value_indented("Config", &config.display().to_string());
        }
        out.newline();

        out.section("Pipeline Phases");
        for (i, phase) in self.phases.iter().enumerate() {
            out.numbered_item(i + 1, &format!("{} - {}", phase.name, phase.description));
        }
        out.newline();

        out.section("Validation Lints");
        for lint in &self.lints {
            out.list_item(&format!("{}: {}", lint.name, lint.description));
        }
        out.newline();

        out.section(&format!("Resources ({})", self.resources.len()));
        for resource in &self.resources {
            let mut line = format!("{} ({})", resource.name, resource.platform_type);
            if resource.deployable {
                line.push_str(" [service]");
            }
            out.list_item(&line);
            if !resource.external.is_empty() {
                out.key_value_indented("    external", &resource.external.join(", "));
            }
        }
        out.newline();

        out.section("Type Catalog");
        for (name, ty) in &self.catalog {
            out.key_value_indented(name, ty);
        }
        out.newline();

        out.section("Platform Resources");
        if self.registry.is_empty() {
            out.list_item("(none)");
        }
        for entry in &self.registry {
            out.list_item(&entry.kind);
            for item in &entry.items {
                out.preformatted(&format!("      {}", item));
            }
        }
        out.newline();

        out.section("Files to Generate");
        for file in &self.files {
            out.list_item(file);
        }
    }
}
