use std::path::PathBuf;

use kiln_codegen::builder::CodeBuilder;
use kiln_core::{GENERATED_HEADER, GeneratedFile};

use super::{ModuleRef, output};

/// `main.bicep`: the resource group, one module per platform resource kind and
/// the outputs service manifests read from the environment.
pub struct MainBicep {
    modules: Vec<ModuleRef>,
}

impl MainBicep {
    /// The environment module, when present, must come first; other modules
    /// grant access to its managed identity.
    pub fn new(modules: Vec<ModuleRef>) -> Self {
        Self { modules }
    }

    fn identity_module(&self) -> Option<&ModuleRef> {
        self.modules.iter().find(|m| m.kind == "environment")
    }
}

impl GeneratedFile for MainBicep {
    fn path(&self) -> PathBuf {
        PathBuf::from("main.bicep")
    }

    fn render(&self) -> String {
        let (principal_id, principal_type) = match self.identity_module() {
            Some(identity) => (
                format!("{}.outputs.MANAGED_IDENTITY_PRINCIPAL_ID", identity.symbol()),
                "'ServicePrincipal'",
            ),
            None => ("principalId".to_string(), "'User'"),
        };

        CodeBuilder::bicep()
            .comment("//", GENERATED_HEADER)
            .line("targetScope = 'subscription'")
            .blank()
            .line("@minLength(1)")
            .line("@maxLength(64)")
            .line("@description('Name of the environment, used to name the resource group')")
            .line("param environmentName string")
            .blank()
            .line("@minLength(1)")
            .line("@description('The location used for all deployed resources')")
            .line("param location string")
            .blank()
            .line("@description('Id of the user or app to assign application roles')")
            .line("param principalId string = ''")
            .blank()
            .block_with_close("var tags = {", "}", |b| {
                b.line("'azd-env-name': environmentName")
            })
            .blank()
            .block_with_close(
                "resource rg 'Microsoft.Resources/resourceGroups@2022-09-01' = {",
                "}",
                |b| {
                    b.line("name: 'rg-${environmentName}'")
                        .line("location: location")
                        .line("tags: tags")
                },
            )
            .blank()
            .each(&self.modules, |b, module| {
                b.block_with_close(
                    &format!("module {} '{}' = {{", module.symbol(), module.path()),
                    "}",
                    |b| {
                        b.line(&format!("name: '{}'", module.kind))
                            .line("scope: rg")
                            .block_with_close("params: {", "}", |b| {
                                b.line("location: location").line("tags: tags").when(
                                    module.grants_access,
                                    |b| {
                                        b.line(&format!("principalId: {}", principal_id))
                                            .line(&format!("principalType: {}", principal_type))
                                    },
                                )
                            })
                    },
                )
                .blank()
            })
            .each(&self.modules, |b, module| {
                let symbol = module.symbol();
                b.each(&module.outputs, |b, name| {
                    output(b, name, &format!("{}.outputs.{}", symbol, name))
                })
            })
            .build()
    }
}
