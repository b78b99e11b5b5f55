use std::path::PathBuf;

use kiln_codegen::{builder::CodeBuilder, resolve::service_binding_var};
use kiln_core::{GeneratedFile, to_bicep_identifier};
use kiln_ir::PlatformRegistry;

use super::{ModuleRef, module_header, output, resource_tags, role_assignment, roles};
use crate::naming::hyphen_prefix;

/// `modules/servicebus.bicep` with every Service Bus namespace, its queues
/// and topics.
pub struct ServiceBusModule<'a> {
    registry: &'a PlatformRegistry,
}

impl<'a> ServiceBusModule<'a> {
    pub fn new(registry: &'a PlatformRegistry) -> Self {
        Self { registry }
    }

    pub fn reference(&self) -> ModuleRef {
        ModuleRef {
            kind: "servicebus",
            grants_access: true,
            outputs: self
                .registry
                .service_buses()
                .keys()
                .map(|name| service_binding_var(name, "ENDPOINT"))
                .collect(),
        }
    }
}

impl GeneratedFile for ServiceBusModule<'_> {
    fn path(&self) -> PathBuf {
        PathBuf::from("modules").join("servicebus.bicep")
    }

    fn render(&self) -> String {
        let namespaces = self.registry.service_buses();

        let b = module_header(CodeBuilder::bicep(), true).each(namespaces, |b, (name, bus)| {
            let symbol = to_bicep_identifier(&format!("servicebus-{}", name));

            let b = b
                .block_with_close(
                    &format!(
                        "resource {} 'Microsoft.ServiceBus/namespaces@2022-10-01-preview' = {{",
                        symbol
                    ),
                    "}",
                    |b| {
                        b.line(&format!("name: '{}-${{resourceToken}}'", hyphen_prefix(name)))
                            .line("location: location")
                            .block_with_close("sku: {", "}", |b| b.line("name: 'Standard'"))
                            .block_with_close("properties: {", "}", |b| {
                                b.line("disableLocalAuth: true")
                            })
                            .line(&resource_tags(name))
                            .each(&bus.queues, |b, queue| {
                                child(b, &format!("queue-{}", queue), "queues", queue)
                            })
                            .each(&bus.topics, |b, topic| {
                                child(b, &format!("topic-{}", topic), "topics", topic)
                            })
                    },
                )
                .blank();

            role_assignment(
                b,
                &format!("{}Role", symbol),
                &symbol,
                roles::SERVICE_BUS_DATA_OWNER,
            )
        });

        b.each(namespaces.keys(), |b, name| {
            let symbol = to_bicep_identifier(&format!("servicebus-{}", name));
            output(
                b,
                &service_binding_var(name, "ENDPOINT"),
                &format!("{}.properties.serviceBusEndpoint", symbol),
            )
        })
        .build()
    }
}

/// Nested queue or topic declaration.
fn child(b: CodeBuilder, symbol: &str, ty: &str, name: &str) -> CodeBuilder {
    b.blank().block_with_close(
        &format!(
            "resource {} '{}' = {{",
            to_bicep_identifier(symbol),
            ty
        ),
        "}",
        |b| b.line(&format!("name: '{}'", name)),
    )
}
