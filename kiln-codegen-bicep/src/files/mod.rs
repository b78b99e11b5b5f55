//! Rendered files of the Bicep target.
//!
//! Every module takes `location` and `tags`; modules that grant data-plane
//! access also take `principalId` and `principalType`.

mod appinsights;
mod environment;
mod keyvault;
mod main_bicep;
mod parameters;
mod servicebus;
mod storage;

pub use appinsights::AppInsightsModule;
pub use environment::EnvironmentModule;
pub use keyvault::KeyVaultModule;
pub use main_bicep::MainBicep;
pub use parameters::MainParameters;
pub use servicebus::ServiceBusModule;
pub use storage::StorageModule;

use kiln_codegen::builder::CodeBuilder;
use kiln_core::GENERATED_HEADER;

/// How `main.bicep` wires a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRef {
    /// File stem under `modules/`, also the deployment name.
    pub kind: &'static str,
    /// Whether the module takes `principalId` and `principalType`.
    pub grants_access: bool,
    /// Output names, re-exported by `main.bicep`.
    pub outputs: Vec<String>,
}

impl ModuleRef {
    /// Symbolic name of the module in `main.bicep`.
    pub fn symbol(&self) -> String {
        format!("{}Module", self.kind)
    }

    pub fn path(&self) -> String {
        format!("modules/{}.bicep", self.kind)
    }
}

/// Role definitions granted to the application identity.
pub(crate) mod roles {
    pub const ACR_PULL: &str = "7f951dda-4ed3-4680-a7ca-43fe172d538d";
    pub const STORAGE_BLOB_DATA_CONTRIBUTOR: &str = "ba92f5b4-2d11-453d-a403-e96b0029c9fe";
    pub const STORAGE_QUEUE_DATA_CONTRIBUTOR: &str = "974c5e8b-45b9-4653-ba55-5f855dd0fb88";
    pub const STORAGE_TABLE_DATA_CONTRIBUTOR: &str = "0a9a7e1f-b9d0-4cc4-a60d-0319b160aaa3";
    pub const SERVICE_BUS_DATA_OWNER: &str = "090c5cfd-751d-490a-894a-3ce6f1109419";
    pub const KEY_VAULT_ADMINISTRATOR: &str = "00482a5a-887f-4fb3-b363-3b7fe8e74483";
}

fn module_header(b: CodeBuilder, grants_access: bool) -> CodeBuilder {
    b.comment("//", GENERATED_HEADER)
        .blank()
        .line("@description('The location used for all deployed resources')")
        .line("param location string = resourceGroup().location")
        .blank()
        .line("@description('Tags that will be applied to all resources')")
        .line("param tags object = {}")
        .blank()
        .when(grants_access, |b| {
            b.line("@description('Principal granted data-plane access')")
                .line("param principalId string")
                .blank()
                .line("@description('Type of the principal')")
                .line("param principalType string = 'ServicePrincipal'")
                .blank()
        })
        .line("var resourceToken = uniqueString(resourceGroup().id)")
        .blank()
}

fn resource_tags(name: &str) -> String {
    format!("tags: union(tags, {{ 'aspire-resource-name': '{}' }})", name)
}

fn role_definition(role: &str) -> String {
    format!(
        "subscriptionResourceId('Microsoft.Authorization/roleDefinitions', '{}')",
        role
    )
}

/// Role assignment of `role` on `scope` for the module's principal.
fn role_assignment(b: CodeBuilder, symbol: &str, scope: &str, role: &str) -> CodeBuilder {
    let definition = role_definition(role);
    b.block_with_close(
        &format!(
            "resource {} 'Microsoft.Authorization/roleAssignments@2022-04-01' = if (!empty(principalId)) {{",
            symbol
        ),
        "}",
        |b| {
            b.line(&format!(
                "name: guid({}.id, principalId, {})",
                scope, definition
            ))
            .line(&format!("scope: {}", scope))
            .block_with_close("properties: {", "}", |b| {
                b.line("principalId: principalId")
                    .line("principalType: principalType")
                    .line(&format!("roleDefinitionId: {}", definition))
            })
        },
    )
    .blank()
}

fn output(b: CodeBuilder, name: &str, value: &str) -> CodeBuilder {
    b.line(&format!("output {} string = {}", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_ref() {
        let module = ModuleRef {
            kind: "storage",
            grants_access: true,
            outputs: Vec::new(),
        };
        assert_eq!(module.symbol(), "storageModule");
        assert_eq!(module.path(), "modules/storage.bicep");
    }

    #[test]
    fn test_role_assignment() {
        let code = role_assignment(CodeBuilder::bicep(), "kvRole", "kv", roles::KEY_VAULT_ADMINISTRATOR)
            .build();

        assert!(code.starts_with(
            "resource kvRole 'Microsoft.Authorization/roleAssignments@2022-04-01' = if (!empty(principalId)) {\n"
        ));
        assert!(code.contains("  scope: kv\n"));
        assert!(code.contains("    principalType: principalType\n"));
        assert!(code.ends_with("}\n\n"));
    }
}
