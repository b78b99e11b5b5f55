use std::path::PathBuf;

use kiln_codegen::{builder::CodeBuilder, resolve::service_binding_var};
use kiln_core::{GeneratedFile, to_bicep_identifier};
use kiln_ir::{PlatformRegistry, StorageAccount};

use super::{ModuleRef, module_header, output, resource_tags, role_assignment, roles};
use crate::naming::compact_prefix;

/// Data-plane services of a storage account: output suffix, endpoint property
/// and role granted when the account has children of that kind.
const SERVICES: &[(&str, &str, &str, &str)] = &[
    ("Blob", "BLOBENDPOINT", "blob", roles::STORAGE_BLOB_DATA_CONTRIBUTOR),
    ("Queue", "QUEUEENDPOINT", "queue", roles::STORAGE_QUEUE_DATA_CONTRIBUTOR),
    ("Table", "TABLEENDPOINT", "table", roles::STORAGE_TABLE_DATA_CONTRIBUTOR),
];

/// `modules/storage.bicep` with every storage account of the registry.
pub struct StorageModule<'a> {
    registry: &'a PlatformRegistry,
}

impl<'a> StorageModule<'a> {
    pub fn new(registry: &'a PlatformRegistry) -> Self {
        Self { registry }
    }

    pub fn reference(&self) -> ModuleRef {
        let outputs = self
            .registry
            .storage_accounts()
            .iter()
            .flat_map(|(name, account)| {
                services(account).map(move |(_, suffix, _, _)| service_binding_var(name, suffix))
            })
            .collect();

        ModuleRef {
            kind: "storage",
            grants_access: true,
            outputs,
        }
    }
}

/// Services with at least one child resource.
fn services(
    account: &StorageAccount,
) -> impl Iterator<Item = &'static (&'static str, &'static str, &'static str, &'static str)> + '_ {
    SERVICES.iter().filter(|(kind, ..)| match *kind {
        "Blob" => !account.blobs.is_empty(),
        "Queue" => !account.queues.is_empty(),
        _ => !account.tables.is_empty(),
    })
}

impl GeneratedFile for StorageModule<'_> {
    fn path(&self) -> PathBuf {
        PathBuf::from("modules").join("storage.bicep")
    }

    fn render(&self) -> String {
        let accounts = self.registry.storage_accounts();

        let b = module_header(CodeBuilder::bicep(), true).each(accounts, |b, (name, account)| {
            let symbol = to_bicep_identifier(&format!("storage-{}", name));

            let b = b
                .block_with_close(
                    &format!(
                        "resource {} 'Microsoft.Storage/storageAccounts@2023-05-01' = {{",
                        symbol
                    ),
                    "}",
                    |b| {
                        b.line(&format!(
                            "name: take('{}${{resourceToken}}', 24)",
                            compact_prefix(name)
                        ))
                        .line("location: location")
                        .line("kind: 'StorageV2'")
                        .block_with_close("sku: {", "}", |b| b.line("name: 'Standard_GRS'"))
                        .block_with_close("properties: {", "}", |b| {
                            b.line("accessTier: 'Hot'")
                                .line("allowSharedKeyAccess: false")
                                .line("minimumTlsVersion: 'TLS1_2'")
                                .block_with_close("networkAcls: {", "}", |b| {
                                    b.line("defaultAction: 'Allow'")
                                })
                        })
                        .line(&resource_tags(name))
                    },
                )
                .blank();

            b.each(services(account), |b, (kind, _, _, role)| {
                role_assignment(b, &format!("{}{}Role", symbol, kind), &symbol, role)
            })
        });

        b.each(accounts, |b, (name, account)| {
            let symbol = to_bicep_identifier(&format!("storage-{}", name));
            b.each(services(account), |b, (_, suffix, endpoint, _)| {
                output(
                    b,
                    &service_binding_var(name, suffix),
                    &format!("{}.properties.primaryEndpoints.{}", symbol, endpoint),
                )
            })
        })
        .build()
    }
}
