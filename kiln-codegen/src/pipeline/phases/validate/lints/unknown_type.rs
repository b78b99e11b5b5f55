//! Lint for resource types the emitters cannot handle.

use kiln_ir::{PlatformType, ResourceKind};
use kiln_manifest::Manifest;

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Lint that warns about resources whose type family is not supported.
///
/// Such resources are kept in the graph (they can still be referenced by
/// name) but no infrastructure or service manifest is generated for them.
pub struct UnknownTypeLint;

impl Lint for UnknownTypeLint {
    fn name(&self) -> &'static str {
        "unknown-type"
    }

    fn description(&self) -> &'static str {
        "Warn about resource types that produce no output"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        for (name, entry) in &manifest.resources {
            let Some(ty) = entry.ty() else {
                continue;
            };

            if PlatformType::new(ty).kind() == ResourceKind::Unknown {
                diagnostics.push(
                    Diagnostic::warning(
                        "validate",
                        format!("resource '{}' has unknown type '{}'", name, ty),
                    )
                    .on_resource(name),
                );
            }
        }
    }
}
