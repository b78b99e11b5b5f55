//! Lint for deployables whose bindings disagree on the container port.

use kiln_ir::{PlatformType, ResourceKind};
use kiln_manifest::Manifest;

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Lint that warns when a deployable declares bindings on different
/// container ports.
///
/// A container app has a single ingress target port, taken from its first
/// external binding (or its first binding), so the other ports are unreachable.
pub struct IngressPortLint;

impl Lint for IngressPortLint {
    fn name(&self) -> &'static str {
        "ingress-port"
    }

    fn description(&self) -> &'static str {
        "Check that a service's bindings share one container port"
    }

    fn check(&self, manifest: &Manifest, diagnostics: &mut Vec<Diagnostic>) {
        for (name, entry) in &manifest.resources {
            let deployable = entry
                .ty()
                .map(|ty| PlatformType::new(ty).kind())
                .is_some_and(|kind: ResourceKind| kind.is_deployable());
            if !deployable {
                continue;
            }

            let mut ports = entry
                .bindings
                .iter()
                .filter_map(|(binding, b)| b.container_port.map(|port| (binding, port)));

            let Some((first_binding, first_port)) = ports.next() else {
                continue;
            };

            for (binding, port) in ports.filter(|(_, port)| *port != first_port) {
                diagnostics.push(
                    Diagnostic::warning(
                        "validate",
                        format!(
                            "binding '{}' of '{}' uses port {} but binding '{}' uses port {}; ingress serves only one",
                            binding, name, port, first_binding, first_port
                        ),
                    )
                    .on_binding(name, binding),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn check(src: &str) -> Vec<Diagnostic> {
        let manifest = Manifest::from_str(src).unwrap();
        let mut diagnostics = Vec::new();
        IngressPortLint.check(&manifest, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn test_shared_port() {
        let diagnostics = check(
            r#"{ "resources": { "web": {
                "type": "project.v0",
                "path": "Web.csproj",
                "bindings": {
                    "http": { "scheme": "http", "containerPort": 8080 },
                    "https": { "scheme": "https", "containerPort": 8080 },
                    "metrics": { "scheme": "http" }
                }
            } } }"#,
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_conflicting_ports() {
        let diagnostics = check(
            r#"{ "resources": { "mongo": {
                "type": "container.v0",
                "image": "mongo:7",
                "bindings": {
                    "tcp": { "scheme": "tcp", "containerPort": 27017 },
                    "admin": { "scheme": "http", "containerPort": 8081 }
                }
            } } }"#,
        );

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].location.as_deref(),
            Some("resources.mongo.bindings.admin")
        );
        assert!(diagnostics[0].message.contains("27017"));
    }

    #[test]
    fn test_ignores_non_deployables() {
        let diagnostics = check(
            r#"{ "resources": { "cache": {
                "type": "redis.v0",
                "bindings": {
                    "a": { "scheme": "tcp", "containerPort": 6379 },
                    "b": { "scheme": "tcp", "containerPort": 6380 }
                }
            } } }"#,
        );
        assert!(diagnostics.is_empty());
    }
}
