use kiln_core::GeneratedOutput;
use kiln_ir::PlatformRegistry;
use tracing::debug;

use crate::files::{
    AppInsightsModule, EnvironmentModule, KeyVaultModule, MainBicep, MainParameters,
    ServiceBusModule, StorageModule,
};

/// Renders the infrastructure tree of a [`PlatformRegistry`].
pub struct InfraEmitter;

impl InfraEmitter {
    /// Render `main.bicep`, `main.parameters.json` and one module for each
    /// resource kind present. Paths depend only on the kind.
    pub fn emit(registry: &PlatformRegistry) -> GeneratedOutput {
        let mut output = GeneratedOutput::new();
        let mut modules = Vec::new();

        // modules/environment.bicep
        if registry.needs_environment() {
            let module = EnvironmentModule::new(registry);
            modules.push(module.reference());
            output.add(&module);
        }

        // modules/storage.bicep
        if !registry.storage_accounts().is_empty() {
            let module = StorageModule::new(registry);
            modules.push(module.reference());
            output.add(&module);
        }

        // modules/servicebus.bicep
        if !registry.service_buses().is_empty() {
            let module = ServiceBusModule::new(registry);
            modules.push(module.reference());
            output.add(&module);
        }

        // modules/keyvault.bicep
        if !registry.key_vaults().is_empty() {
            let module = KeyVaultModule::new(registry);
            modules.push(module.reference());
            output.add(&module);
        }

        // modules/appinsights.bicep
        if !registry.app_insights().is_empty() {
            let module = AppInsightsModule::new(registry);
            modules.push(module.reference());
            output.add(&module);
        }

        output.add(&MainBicep::new(modules)).add(&MainParameters);

        for path in output.paths() {
            debug!(path, "rendered infrastructure file");
        }
        output
    }
}
