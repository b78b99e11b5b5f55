//! Aggregate phase - derives shared platform resources from the graph.

use std::collections::{BTreeMap, btree_map::Entry};

use kiln_core::{alpha_snake_upper, to_bicep_identifier};
use kiln_ir::{
    EnvironmentService, Payload, PlatformRegistry, Resource, ResourceGraph, ResourceKind,
};
use tracing::{debug, warn};

use crate::{
    Error, Result,
    pipeline::{CompilationContext, Phase},
};

/// Phase that walks the graph in declaration order and fills the
/// [`PlatformRegistry`].
///
/// This phase must run after `LowerPhase` as it requires the graph.
/// Children are registered under their parent; repeated or reordered
/// declarations collapse into the same registry entries. Names that would
/// render to the same Bicep symbol or environment key are rejected.
pub struct AggregatePhase;

impl Phase for AggregatePhase {
    fn name(&self) -> &'static str {
        "aggregate"
    }

    fn description(&self) -> &'static str {
        "Derive shared platform resources from the graph"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let graph = ctx.graph()?;
        check_name_collisions(graph)?;

        let mut registry = PlatformRegistry::new();

        for resource in graph.iter() {
            if !aggregate_resource(graph, resource, &mut registry)? {
                warn!(
                    resource = %resource.name,
                    platform_type = %resource.platform_type,
                    "skipping resource of unsupported type"
                );
            }
        }

        debug!(
            storage_accounts = registry.storage_accounts().len(),
            service_buses = registry.service_buses().len(),
            environment = registry.needs_environment(),
            "aggregated platform resources"
        );

        ctx.registry = Some(registry);
        Ok(())
    }
}

/// Register one resource. Returns false if its type is not supported.
fn aggregate_resource(
    graph: &ResourceGraph,
    resource: &Resource,
    registry: &mut PlatformRegistry,
) -> Result<bool> {
    let name = resource.name.as_str();

    match resource.kind() {
        ResourceKind::Project | ResourceKind::Dockerfile | ResourceKind::Container => {
            registry.require_container_apps();
        }
        ResourceKind::Storage => {
            registry.ensure_storage(name);
        }
        ResourceKind::StorageBlob => registry.add_blob(checked_parent(graph, resource)?, name),
        ResourceKind::StorageQueue => registry.add_queue(checked_parent(graph, resource)?, name),
        ResourceKind::StorageTable => registry.add_table(checked_parent(graph, resource)?, name),
        ResourceKind::PostgresDatabase => {
            checked_parent(graph, resource)?;
        }
        ResourceKind::PostgresServer => {
            registry.add_environment_service(name, EnvironmentService::Postgres);
        }
        ResourceKind::Redis => {
            registry.add_environment_service(name, EnvironmentService::Redis);
        }
        ResourceKind::ServiceBus => {
            if let Payload::ServiceBus { queues, topics } = &resource.payload {
                registry.add_service_bus(name, queues, topics);
            } else {
                registry.add_service_bus(name, Vec::<String>::new(), Vec::<String>::new());
            }
        }
        ResourceKind::KeyVault => registry.add_key_vault(name),
        ResourceKind::AppInsights => registry.add_app_insights(name),
        ResourceKind::Parameter | ResourceKind::Value => {}
        ResourceKind::Unknown => return Ok(false),
    }

    Ok(true)
}

/// The parent of a child resource, checked to exist and to have the right kind.
fn checked_parent<'g>(graph: &'g ResourceGraph, child: &'g Resource) -> Result<&'g str> {
    let parent_name = child.parent().ok_or_else(|| Error::InvalidResource {
        resource: child.name.clone(),
        message: "missing 'parent'".into(),
    })?;
    let parent = graph.get(parent_name)?;

    if let Some(expected) = child.kind().parent_kind()
        && parent.kind() != expected
    {
        return Err(Error::ParentMismatch {
            child: child.name.clone(),
            parent: parent_name.to_string(),
            expected: expected_family(expected).to_string(),
            found: parent.platform_type.tag().to_string(),
        });
    }

    Ok(parent_name)
}

/// Fail if two distinct names normalize to the same generated identifier.
fn check_name_collisions(graph: &ResourceGraph) -> Result<()> {
    let mut symbols = NameTable::new("Bicep symbol suffix");
    let mut env_keys = NameTable::new("environment key");

    for resource in graph.iter() {
        let name = resource.name.as_str();
        symbols.insert(symbol_suffix(name), name)?;
        env_keys.insert(alpha_snake_upper(name), name)?;

        if let Payload::ServiceBus { queues, topics } = &resource.payload {
            for children in [queues, topics] {
                let mut table = NameTable::new("Bicep symbol suffix");
                for child in children {
                    table.insert(symbol_suffix(child), child)?;
                }
            }
        }
    }

    Ok(())
}

/// The part of `to_bicep_identifier("<prefix>-<name>")` that depends on `name`.
fn symbol_suffix(name: &str) -> String {
    to_bicep_identifier(&format!("x-{}", name))[1..].to_string()
}

struct NameTable<'a> {
    target: &'static str,
    seen: BTreeMap<String, &'a str>,
}

impl<'a> NameTable<'a> {
    fn new(target: &'static str) -> Self {
        Self {
            target,
            seen: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: String, name: &'a str) -> Result<()> {
        match self.seen.entry(key) {
            Entry::Occupied(entry) if *entry.get() != name => Err(Error::NameCollision {
                first: entry.get().to_string(),
                second: name.to_string(),
                target: self.target,
                key: entry.key().clone(),
            }),
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(entry) => {
                entry.insert(name);
                Ok(())
            }
        }
    }
}

fn expected_family(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Storage => "azure.storage",
        ResourceKind::PostgresServer => "postgres.server",
        _ => "resource",
    }
}
