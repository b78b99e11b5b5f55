//! Generate command report data structures.

use std::path::PathBuf;

use kiln_core::WriteResult;

use super::output::{Output, Report};

/// Report data from artifact generation.
#[derive(Debug)]
pub struct GenerateReport {
    /// Project name from kiln.toml.
    pub project_name: Option<String>,
    /// Manifest the artifacts were compiled from.
    pub manifest_path: PathBuf,
    /// Warning messages from the pipeline.
    pub warnings: Vec<String>,
    /// Deployable resources that received a service manifest.
    pub services: Vec<String>,
    /// Generation result (files written or preview).
    pub result: GenerationResult,
}

/// Result of generation.
#[derive(Debug)]
pub enum GenerationResult {
    /// Files were written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(PreviewResult),
}

/// Result when files were written to disk.
#[derive(Debug)]
pub struct WrittenResult {
    pub output_dir: PathBuf,
    /// Outcome per relative path, in path order.
    pub files: Vec<(String, WriteResult)>,
}

/// Result of a dry-run preview.
#[derive(Debug)]
pub struct PreviewResult {
    /// Files that would be generated.
    pub files: Vec<PreviewFile>,
}

/// A file in preview mode.
#[derive(Debug)]
pub struct PreviewFile {
    pub path: String,
    pub content: String,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        match &self.result {
            GenerationResult::Written(written) => self.render_written(out, written),
            GenerationResult::Preview(preview) => Self::render_preview(out, preview),
        }
    }
}

impl GenerateReport {
    fn render_written(&self, out: &mut dyn Output, written: &WrittenResult) {
        let name = self.project_name.as_deref().unwrap_or("kiln");
        out.preformatted(&format!("{} ({})", name, self.manifest_path.display()));
        out.newline();

        out.section(&format!("Services ({})", self.services.len()));
        for service in &self.services {
            out.list_item(service);
        }
        out.newline();

        out.key_value("Generated", &written.output_dir.display().to_string());
        for (path, result) in &written.files {
            match result {
                WriteResult::Written => out.added_item(path),
                WriteResult::Skipped => out.kept_item(&format!("{} (exists, kept)", path)),
            }
        }
    }

    fn render_preview(out: &mut dyn Output, preview: &PreviewResult) {
        for file in &preview.files {
            out.divider(&file.path);
            out.preformatted(&file.content);
        }

        out.divider("Summary");
        out.preformatted(&format!("{} files would be generated", preview.files.len()));
    }
}
