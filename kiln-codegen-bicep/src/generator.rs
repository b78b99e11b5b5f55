use kiln_codegen::Result;
use kiln_core::GeneratedOutput;
use kiln_ir::PlatformRegistry;

use crate::InfraEmitter;

/// Bicep generator rendering the infrastructure of one registry.
pub struct Generator<'a> {
    registry: &'a PlatformRegistry,
}

impl<'a> Generator<'a> {
    pub fn new(registry: &'a PlatformRegistry) -> Self {
        Self { registry }
    }
}

impl kiln_codegen::Generator for Generator<'_> {
    fn target(&self) -> &'static str {
        "bicep"
    }

    fn preview(&self) -> Result<GeneratedOutput> {
        Ok(InfraEmitter::emit(self.registry))
    }
}
