use kiln_codegen::Result;
use kiln_core::{File, GeneratedOutput};
use kiln_ir::ResourceGraph;

use crate::ServiceManifestEmitter;

/// Container Apps generator producing `<name>/containerApp.tmpl.yaml` for
/// every deployable resource.
pub struct Generator<'a> {
    graph: &'a ResourceGraph,
}

impl<'a> Generator<'a> {
    pub fn new(graph: &'a ResourceGraph) -> Self {
        Self { graph }
    }

    /// Emit every deployable independently, in declaration order.
    pub fn emit_each(&self) -> Vec<(&'a str, Result<File>)> {
        self.graph
            .deployables()
            .map(|resource| {
                let name = resource.name.as_str();
                (name, ServiceManifestEmitter::file(self.graph, name))
            })
            .collect()
    }
}

impl kiln_codegen::Generator for Generator<'_> {
    fn target(&self) -> &'static str {
        "aca"
    }

    fn preview(&self) -> Result<GeneratedOutput> {
        let mut output = GeneratedOutput::new();
        for (_, file) in self.emit_each() {
            output.insert(file?);
        }
        Ok(output)
    }
}
