use kiln_codegen::{Error, Result, resolve::Resolver};
use kiln_core::{File, GeneratedFile};
use kiln_ir::{Payload, ResourceGraph};
use tracing::debug;

use crate::{ServiceManifestContext, files::ContainerAppTemplate};

/// File name of a service manifest template.
pub const TEMPLATE_FILE: &str = "containerApp.tmpl.yaml";

/// Renders the container app template of a single resource.
///
/// Each call resolves only the named resource's values, so a failure for one
/// service never affects another.
pub struct ServiceManifestEmitter;

impl ServiceManifestEmitter {
    /// Render the template of `name`.
    ///
    /// # Errors
    ///
    /// Fails if `name` is not in the graph or is not deployable, or if any of
    /// its values cannot be resolved.
    pub fn emit(graph: &ResourceGraph, name: &str) -> Result<String> {
        Self::file(graph, name).map(|file| file.content().to_string())
    }

    /// Render the template of `name` as a file relative to the output root.
    pub fn file(graph: &ResourceGraph, name: &str) -> Result<File> {
        let ctx = Self::context(graph, name)?;
        let file = ContainerAppTemplate::new(&ctx).to_file();
        debug!(resource = name, path = %file.path().display(), "rendered service manifest");
        Ok(file)
    }

    /// Build the template context of `name`.
    pub fn context(graph: &ResourceGraph, name: &str) -> Result<ServiceManifestContext> {
        let resource = graph.get(name)?;
        if !resource.is_deployable() {
            return Err(Error::InvalidResource {
                resource: name.to_string(),
                message: format!("type '{}' is not deployable", resource.platform_type),
            });
        }

        let resolver = Resolver::with_graph(graph);
        let env = resolver.resolve_env_entries(&resource.env)?;
        let args = match &resource.payload {
            Payload::Container { args, .. } => args
                .iter()
                .map(|arg| resolver.resolve(arg).map(|resolved| resolved.text))
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        Ok(ServiceManifestContext::new(resource, env, args))
    }
}
