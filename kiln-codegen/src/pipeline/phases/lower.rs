//! Lower phase - builds the resource graph from the manifest.
//!
//! Every manifest entry becomes a [`Resource`]; inserting it records its
//! platform type in the graph's catalog. The caller's exposure is applied last,
//! so later phases and emitters only ever see the final binding flags.

use kiln_core::{Protocol, Scheme, Transport};
use kiln_ir::{Binding, Payload, PlatformType, Resource, ResourceGraph, ResourceKind};
use kiln_manifest::{BindingEntry, Manifest, ResourceEntry};
use tracing::debug;

use crate::{
    Error, Result,
    pipeline::{CompilationContext, Phase},
};

/// Phase that transforms the manifest into the resource graph.
pub struct LowerPhase;

impl Phase for LowerPhase {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn description(&self) -> &'static str {
        "Build the resource graph and apply the exposure"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let mut graph = lower_manifest(&ctx.manifest)?;
        graph.apply_exposure(&ctx.exposure)?;

        debug!(
            resources = graph.len(),
            deployables = graph.deployables().count(),
            "lowered manifest"
        );
        ctx.graph = Some(graph);
        Ok(())
    }
}

/// Lower a manifest into a resource graph.
fn lower_manifest(manifest: &Manifest) -> Result<ResourceGraph> {
    manifest
        .resources
        .iter()
        .map(|(name, entry)| lower_resource(name, entry))
        .collect()
}

/// Lower a single manifest entry.
fn lower_resource(name: &str, entry: &ResourceEntry) -> Result<Resource> {
    let ty = entry
        .ty()
        .ok_or_else(|| invalid(name, "missing type"))?;
    let platform_type = PlatformType::new(ty);

    let mut resource = Resource::new(name, platform_type.clone());
    resource.env = entry.env.clone();
    resource.connection_string = entry.connection_string.clone();
    resource.payload = lower_payload(name, platform_type.kind(), entry)?;

    for (binding_name, binding) in &entry.bindings {
        resource
            .bindings
            .insert(binding_name.clone(), lower_binding(name, binding_name, binding)?);
    }

    Ok(resource)
}

/// Lower the type-specific part of an entry.
fn lower_payload(name: &str, kind: ResourceKind, entry: &ResourceEntry) -> Result<Payload> {
    let required = |value: &Option<String>, field: &str| {
        value
            .clone()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| invalid(name, format!("missing '{}'", field)))
    };

    let payload = match kind {
        ResourceKind::Project => Payload::Project {
            path: required(&entry.path, "path")?,
        },
        ResourceKind::Dockerfile => Payload::Dockerfile {
            path: required(&entry.path, "path")?,
            context: required(&entry.context, "context")?,
            build_args: entry.build_args.clone(),
        },
        ResourceKind::Container => Payload::Container {
            image: required(&entry.image, "image")?,
            args: entry.args.clone(),
        },
        ResourceKind::StorageBlob
        | ResourceKind::StorageQueue
        | ResourceKind::StorageTable
        | ResourceKind::PostgresDatabase => Payload::Child {
            parent: required(&entry.parent, "parent")?,
        },
        ResourceKind::ServiceBus => Payload::ServiceBus {
            queues: entry.queues.clone(),
            topics: entry.topics.clone(),
        },
        ResourceKind::Value => Payload::Value {
            value: entry.value.clone().unwrap_or_default(),
        },
        ResourceKind::Parameter => Payload::Parameter {
            value: entry.value.clone(),
            secret: entry.has_secret_input(),
        },
        ResourceKind::Redis
        | ResourceKind::PostgresServer
        | ResourceKind::Storage
        | ResourceKind::KeyVault
        | ResourceKind::AppInsights
        | ResourceKind::Unknown => Payload::None,
    };

    Ok(payload)
}

/// Lower a binding entry, filling protocol and transport from the scheme.
fn lower_binding(resource: &str, name: &str, entry: &BindingEntry) -> Result<Binding> {
    let field = |field: &str, value: Option<&str>| {
        invalid(
            resource,
            format!(
                "binding '{}' has invalid {} '{}'",
                name,
                field,
                value.unwrap_or_default()
            ),
        )
    };

    let scheme = entry
        .scheme
        .as_deref()
        .and_then(Scheme::parse)
        .ok_or_else(|| field("scheme", entry.scheme.as_deref()))?;

    let mut binding = Binding::new(scheme);
    if let Some(protocol) = entry.protocol.as_deref() {
        binding.protocol = Protocol::parse(protocol).ok_or_else(|| field("protocol", Some(protocol)))?;
    }
    if let Some(transport) = entry.transport.as_deref() {
        binding.transport =
            Transport::parse(transport).ok_or_else(|| field("transport", Some(transport)))?;
    }
    binding.container_port = entry.container_port;
    binding.external = entry.external;

    Ok(binding)
}

fn invalid(resource: &str, message: impl Into<String>) -> Error {
    Error::InvalidResource {
        resource: resource.to_string(),
        message: message.into(),
    }
}
