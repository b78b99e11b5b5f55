use std::path::PathBuf;

use kiln_codegen::{builder::CodeBuilder, resolve::service_binding_var};
use kiln_core::{GeneratedFile, to_bicep_identifier};
use kiln_ir::PlatformRegistry;

use super::{ModuleRef, module_header, output, resource_tags, role_assignment, roles};
use crate::naming::hyphen_prefix;

/// `modules/keyvault.bicep` with every Key Vault of the registry.
pub struct KeyVaultModule<'a> {
    registry: &'a PlatformRegistry,
}

impl<'a> KeyVaultModule<'a> {
    pub fn new(registry: &'a PlatformRegistry) -> Self {
        Self { registry }
    }

    pub fn reference(&self) -> ModuleRef {
        ModuleRef {
            kind: "keyvault",
            grants_access: true,
            outputs: self
                .registry
                .key_vaults()
                .iter()
                .map(|name| service_binding_var(name, "ENDPOINT"))
                .collect(),
        }
    }
}

impl GeneratedFile for KeyVaultModule<'_> {
    fn path(&self) -> PathBuf {
        PathBuf::from("modules").join("keyvault.bicep")
    }

    fn render(&self) -> String {
        let vaults = self.registry.key_vaults();

        let b = module_header(CodeBuilder::bicep(), true).each(vaults, |b, name| {
            let symbol = to_bicep_identifier(&format!("keyvault-{}", name));

            let b = b
                .block_with_close(
                    &format!(
                        "resource {} 'Microsoft.KeyVault/vaults@2023-07-01' = {{",
                        symbol
                    ),
                    "}",
                    |b| {
                        b.line(&format!(
                            "name: take('{}-${{resourceToken}}', 24)",
                            hyphen_prefix(name)
                        ))
                        .line("location: location")
                        .block_with_close("properties: {", "}", |b| {
                            b.block_with_close("sku: {", "}", |b| {
                                b.line("family: 'A'").line("name: 'standard'")
                            })
                            .line("tenantId: subscription().tenantId")
                            .line("enableRbacAuthorization: true")
                        })
                        .line(&resource_tags(name))
                    },
                )
                .blank();

            role_assignment(
                b,
                &format!("{}Role", symbol),
                &symbol,
                roles::KEY_VAULT_ADMINISTRATOR,
            )
        });

        b.each(vaults, |b, name| {
            let symbol = to_bicep_identifier(&format!("keyvault-{}", name));
            output(
                b,
                &service_binding_var(name, "ENDPOINT"),
                &format!("{}.properties.vaultUri", symbol),
            )
        })
        .build()
    }
}
