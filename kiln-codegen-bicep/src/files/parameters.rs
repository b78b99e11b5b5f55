use std::path::PathBuf;

use kiln_core::{FileRules, GeneratedFile, Overwrite};
use serde_json::json;

/// `main.parameters.json`, mapping the deployment parameters to azd
/// environment values. Only written when missing so user edits survive.
pub struct MainParameters;

impl GeneratedFile for MainParameters {
    fn path(&self) -> PathBuf {
        PathBuf::from("main.parameters.json")
    }

    fn rules(&self) -> FileRules {
        FileRules {
            overwrite: Overwrite::IfMissing,
        }
    }

    fn render(&self) -> String {
        let parameters = json!({
            "$schema": "https://schema.management.azure.com/schemas/2019-04-01/deploymentParameters.json#",
            "contentVersion": "1.0.0.0",
            "parameters": {
                "environmentName": { "value": "${AZURE_ENV_NAME}" },
                "location": { "value": "${AZURE_LOCATION}" },
                "principalId": { "value": "${AZURE_PRINCIPAL_ID}" }
            }
        });
        format!("{:#}\n", parameters)
    }
}
