//! Resource entries as they appear in the manifest.

use indexmap::IndexMap;
use serde::Deserialize;

/// A single entry of the manifest's `resources` object.
///
/// Fields are the union of what the app host emits across resource types;
/// which of them are required depends on `type` and is checked after parsing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry {
    /// Platform type tag (e.g., "project.v0", "postgres.database.v0")
    #[serde(rename = "type")]
    pub ty: Option<String>,

    /// Project or Dockerfile path
    pub path: Option<String>,

    /// Docker build context
    pub context: Option<String>,

    /// Container image
    pub image: Option<String>,

    /// Parent resource for child resources (storage containers, databases)
    pub parent: Option<String>,

    /// Template used when another resource asks for this one's connection string
    pub connection_string: Option<String>,

    /// Literal value (value.v0, parameter.v0)
    pub value: Option<String>,

    /// Environment variables, values may contain `{resource.property}` references
    #[serde(default)]
    pub env: IndexMap<String, String>,

    /// Network endpoints keyed by binding name
    #[serde(default)]
    pub bindings: IndexMap<String, BindingEntry>,

    /// Container entrypoint arguments
    #[serde(default)]
    pub args: Vec<String>,

    /// Docker build arguments
    #[serde(default)]
    pub build_args: IndexMap<String, String>,

    /// Service Bus queues
    #[serde(default)]
    pub queues: Vec<String>,

    /// Service Bus topics
    #[serde(default)]
    pub topics: Vec<String>,

    /// Parameter inputs
    #[serde(default)]
    pub inputs: IndexMap<String, InputEntry>,
}

impl ResourceEntry {
    /// The type tag, if one was declared and non-empty.
    pub fn ty(&self) -> Option<&str> {
        self.ty.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Returns true if any input is marked secret.
    pub fn has_secret_input(&self) -> bool {
        self.inputs.values().any(|i| i.secret)
    }
}

/// A binding (network endpoint) declared on a resource.
///
/// `scheme`, `protocol` and `transport` are kept as strings here so that an
/// undefined value can be reported with its location instead of a generic
/// deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingEntry {
    pub scheme: Option<String>,
    pub protocol: Option<String>,
    pub transport: Option<String>,
    pub container_port: Option<u16>,
    #[serde(default)]
    pub external: bool,
}

/// An input of a parameter resource.
#[derive(Debug, Clone, Deserialize)]
pub struct InputEntry {
    #[serde(rename = "type", default = "default_input_type")]
    pub ty: String,
    #[serde(default)]
    pub secret: bool,
}

fn default_input_type() -> String {
    "string".into()
}
