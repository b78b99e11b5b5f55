use std::path::PathBuf;

use kiln_codegen::{builder::CodeBuilder, resolve::ENVIRONMENT_DOMAIN_VAR};
use kiln_core::{GeneratedFile, to_bicep_identifier};
use kiln_ir::PlatformRegistry;

use super::{ModuleRef, module_header, output, resource_tags, role_definition, roles};

/// Outputs consumed by the service manifest templates, with their values.
const OUTPUTS: &[(&str, &str)] = &[
    (
        "MANAGED_IDENTITY_CLIENT_ID",
        "managedIdentity.properties.clientId",
    ),
    (
        "MANAGED_IDENTITY_PRINCIPAL_ID",
        "managedIdentity.properties.principalId",
    ),
    (
        "AZURE_CONTAINER_REGISTRY_ENDPOINT",
        "containerRegistry.properties.loginServer",
    ),
    (
        "AZURE_CONTAINER_REGISTRY_MANAGED_IDENTITY_ID",
        "managedIdentity.id",
    ),
    (
        "AZURE_CONTAINER_APPS_ENVIRONMENT_ID",
        "containerAppEnvironment.id",
    ),
    (
        ENVIRONMENT_DOMAIN_VAR,
        "containerAppEnvironment.properties.defaultDomain",
    ),
];

/// `modules/environment.bicep`: managed identity, registry, Log Analytics,
/// the container-apps environment and its Redis/Postgres dev services.
pub struct EnvironmentModule<'a> {
    registry: &'a PlatformRegistry,
}

impl<'a> EnvironmentModule<'a> {
    pub fn new(registry: &'a PlatformRegistry) -> Self {
        Self { registry }
    }

    pub fn reference(&self) -> ModuleRef {
        ModuleRef {
            kind: "environment",
            grants_access: false,
            outputs: OUTPUTS.iter().map(|(name, _)| name.to_string()).collect(),
        }
    }
}

impl GeneratedFile for EnvironmentModule<'_> {
    fn path(&self) -> PathBuf {
        PathBuf::from("modules").join("environment.bicep")
    }

    fn render(&self) -> String {
        let acr_pull = role_definition(roles::ACR_PULL);

        module_header(CodeBuilder::bicep(), false)
            .block_with_close(
                "resource managedIdentity 'Microsoft.ManagedIdentity/userAssignedIdentities@2023-01-31' = {",
                "}",
                |b| {
                    b.line("name: 'mi-${resourceToken}'")
                        .line("location: location")
                        .line("tags: tags")
                },
            )
            .blank()
            .block_with_close(
                "resource containerRegistry 'Microsoft.ContainerRegistry/registries@2023-07-01' = {",
                "}",
                |b| {
                    b.line("name: replace('acr-${resourceToken}', '-', '')")
                        .line("location: location")
                        .block_with_close("sku: {", "}", |b| b.line("name: 'Basic'"))
                        .line("tags: tags")
                },
            )
            .blank()
            .block_with_close(
                "resource acrPullRoleAssignment 'Microsoft.Authorization/roleAssignments@2022-04-01' = {",
                "}",
                |b| {
                    b.line(&format!(
                        "name: guid(containerRegistry.id, managedIdentity.id, {})",
                        acr_pull
                    ))
                    .line("scope: containerRegistry")
                    .block_with_close("properties: {", "}", |b| {
                        b.line("principalId: managedIdentity.properties.principalId")
                            .line("principalType: 'ServicePrincipal'")
                            .line(&format!("roleDefinitionId: {}", acr_pull))
                    })
                },
            )
            .blank()
            .block_with_close(
                "resource logAnalyticsWorkspace 'Microsoft.OperationalInsights/workspaces@2022-10-01' = {",
                "}",
                |b| {
                    b.line("name: 'law-${resourceToken}'")
                        .line("location: location")
                        .block_with_close("properties: {", "}", |b| {
                            b.block_with_close("sku: {", "}", |b| b.line("name: 'PerGB2018'"))
                        })
                        .line("tags: tags")
                },
            )
            .blank()
            .block_with_close(
                "resource containerAppEnvironment 'Microsoft.App/managedEnvironments@2024-02-02-preview' = {",
                "}",
                |b| {
                    b.line("name: 'cae-${resourceToken}'")
                        .line("location: location")
                        .block_with_close("properties: {", "}", |b| {
                            b.block_with_close("workloadProfiles: [", "]", |b| {
                                b.block_with_close("{", "}", |b| {
                                    b.line("workloadProfileType: 'Consumption'")
                                        .line("name: 'consumption'")
                                })
                            })
                            .block_with_close("appLogsConfiguration: {", "}", |b| {
                                b.line("destination: 'log-analytics'").block_with_close(
                                    "logAnalyticsConfiguration: {",
                                    "}",
                                    |b| {
                                        b.line("customerId: logAnalyticsWorkspace.properties.customerId")
                                            .line("sharedKey: logAnalyticsWorkspace.listKeys().primarySharedKey")
                                    },
                                )
                            })
                        })
                        .line("tags: tags")
                },
            )
            .blank()
            .each(self.registry.environment_services(), |b, (name, service)| {
                b.block_with_close(
                    &format!(
                        "resource {} 'Microsoft.App/containerApps@2024-02-02-preview' = {{",
                        to_bicep_identifier(&format!("service-{}", name))
                    ),
                    "}",
                    |b| {
                        b.line(&format!("name: '{}'", name))
                            .line("location: location")
                            .block_with_close("properties: {", "}", |b| {
                                b.line("environmentId: containerAppEnvironment.id")
                                    .block_with_close("configuration: {", "}", |b| {
                                        b.block_with_close("service: {", "}", |b| {
                                            b.line(&format!("type: '{}'", service.as_str()))
                                        })
                                    })
                                    .block_with_close("template: {", "}", |b| {
                                        b.block_with_close("containers: [", "]", |b| {
                                            b.block_with_close("{", "}", |b| {
                                                b.line(&format!("image: '{}'", service.as_str()))
                                                    .line(&format!("name: '{}'", service.as_str()))
                                            })
                                        })
                                    })
                            })
                            .line(&resource_tags(name))
                    },
                )
                .blank()
            })
            .each(OUTPUTS, |b, (name, value)| output(b, name, value))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use kiln_ir::EnvironmentService;

    use super::*;

    #[test]
    fn test_render_without_services() {
        let mut registry = PlatformRegistry::new();
        registry.require_container_apps();

        let bicep = EnvironmentModule::new(&registry).render();

        assert!(bicep.contains("resource containerAppEnvironment 'Microsoft.App/managedEnvironments@2024-02-02-preview' = {"));
        assert!(!bicep.contains("Microsoft.App/containerApps@"));
        assert!(bicep.contains(
            "output AZURE_CONTAINER_APPS_ENVIRONMENT_DEFAULT_DOMAIN string = containerAppEnvironment.properties.defaultDomain"
        ));
    }

    #[test]
    fn test_render_dev_services() {
        let mut registry = PlatformRegistry::new();
        registry.add_environment_service("cache", EnvironmentService::Redis);
        registry.add_environment_service("pg", EnvironmentService::Postgres);

        let bicep = EnvironmentModule::new(&registry).render();

        assert!(bicep.contains("resource serviceCache 'Microsoft.App/containerApps@2024-02-02-preview' = {\n  name: 'cache'\n"));
        assert!(bicep.contains("        type: 'redis'\n"));
        assert!(bicep.contains("resource servicePg "));
        assert!(bicep.contains("        type: 'postgres'\n"));
    }
}
