use std::path::PathBuf;

use kiln_codegen::{builder::CodeBuilder, resolve::service_binding_var};
use kiln_core::{GeneratedFile, to_bicep_identifier};
use kiln_ir::PlatformRegistry;

use super::{ModuleRef, module_header, output, resource_tags};
use crate::naming::hyphen_prefix;

/// `modules/appinsights.bicep` with a shared Log Analytics workspace and one
/// Application Insights component per resource.
pub struct AppInsightsModule<'a> {
    registry: &'a PlatformRegistry,
}

impl<'a> AppInsightsModule<'a> {
    pub fn new(registry: &'a PlatformRegistry) -> Self {
        Self { registry }
    }

    pub fn reference(&self) -> ModuleRef {
        ModuleRef {
            kind: "appinsights",
            grants_access: false,
            outputs: self
                .registry
                .app_insights()
                .iter()
                .map(|name| service_binding_var(name, "CONNECTION_STRING"))
                .collect(),
        }
    }
}

impl GeneratedFile for AppInsightsModule<'_> {
    fn path(&self) -> PathBuf {
        PathBuf::from("modules").join("appinsights.bicep")
    }

    fn render(&self) -> String {
        let components = self.registry.app_insights();

        let b = module_header(CodeBuilder::bicep(), false)
            .block_with_close(
                "resource logAnalyticsWorkspace 'Microsoft.OperationalInsights/workspaces@2022-10-01' = {",
                "}",
                |b| {
                    b.line("name: 'law-insights-${resourceToken}'")
                        .line("location: location")
                        .block_with_close("properties: {", "}", |b| {
                            b.block_with_close("sku: {", "}", |b| b.line("name: 'PerGB2018'"))
                        })
                        .line("tags: tags")
                },
            )
            .blank()
            .each(components, |b, name| {
                b.block_with_close(
                    &format!(
                        "resource {} 'Microsoft.Insights/components@2020-02-02' = {{",
                        to_bicep_identifier(&format!("appinsights-{}", name))
                    ),
                    "}",
                    |b| {
                        b.line(&format!("name: '{}-${{resourceToken}}'", hyphen_prefix(name)))
                            .line("location: location")
                            .line("kind: 'web'")
                            .block_with_close("properties: {", "}", |b| {
                                b.line("Application_Type: 'web'")
                                    .line("WorkspaceResourceId: logAnalyticsWorkspace.id")
                            })
                            .line(&resource_tags(name))
                    },
                )
                .blank()
            });

        b.each(components, |b, name| {
            output(
                b,
                &service_binding_var(name, "CONNECTION_STRING"),
                &format!(
                    "{}.properties.ConnectionString",
                    to_bicep_identifier(&format!("appinsights-{}", name))
                ),
            )
        })
        .build()
    }
}
