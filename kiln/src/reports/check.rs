//! Check command report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from manifest validation.
#[derive(Debug)]
pub struct CheckReport {
    /// Path to the manifest.
    pub manifest_path: PathBuf,
    /// Number of declared resources.
    pub resource_count: usize,
    /// Error messages.
    pub errors: Vec<String>,
    /// Warning messages.
    pub warnings: Vec<String>,
    /// Info messages.
    pub infos: Vec<String>,
    /// Outcome of emitting each deployable resource, in declaration order.
    pub services: Vec<ServiceCheck>,
}

/// Whether one service manifest could be emitted.
#[derive(Debug)]
pub struct ServiceCheck {
    pub name: String,
    pub error: Option<String>,
}

impl CheckReport {
    /// Whether the check passed (no errors and every service emitted).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && self.services.iter().all(|s| s.error.is_none())
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.error(error);
        }

        for warning in &self.warnings {
            out.warning(warning);
        }

        for info in &self.infos {
            out.preformatted(&format!("info: {}", info));
        }

        for service in &self.services {
            if let Some(error) = &service.error {
                out.error(&format!("service '{}': {}", service.name, error));
            }
        }

        if !self.is_valid() || !self.warnings.is_empty() {
            out.newline();
        }

        if self.is_valid() {
            out.preformatted(&format!("✓ {} is valid", self.manifest_path.display()));
            out.newline();
            out.key_value_indented("Resources", &self.resource_count.to_string());
            out.key_value_indented("Services", &self.services.len().to_string());
        }
    }
}
