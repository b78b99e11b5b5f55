//! Resources as nodes of the graph.

use indexmap::IndexMap;
use kiln_core::{Protocol, Scheme, Transport};

use crate::{PlatformType, ResourceKind};

/// A named node of the resource graph.
#[derive(Debug, Clone)]
pub struct Resource {
    /// Unique name within the graph.
    pub name: String,
    pub platform_type: PlatformType,
    /// Bindings in declaration order.
    pub bindings: IndexMap<String, Binding>,
    /// Raw environment values, possibly containing reference expressions.
    pub env: IndexMap<String, String>,
    /// Template used when another resource references this one's connection string.
    pub connection_string: Option<String>,
    pub payload: Payload,
}

impl Resource {
    /// Create a resource with no bindings, env or payload.
    pub fn new(name: impl Into<String>, platform_type: impl Into<PlatformType>) -> Self {
        Self {
            name: name.into(),
            platform_type: platform_type.into(),
            bindings: IndexMap::new(),
            env: IndexMap::new(),
            connection_string: None,
            payload: Payload::None,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.platform_type.kind()
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Returns true if this resource runs as a container app.
    pub fn is_deployable(&self) -> bool {
        self.kind().is_deployable()
    }

    /// Returns true if any binding is reachable from outside the environment.
    pub fn has_external_binding(&self) -> bool {
        self.bindings.values().any(|b| b.external)
    }

    /// Parent resource name of a child resource.
    pub fn parent(&self) -> Option<&str> {
        match &self.payload {
            Payload::Child { parent } => Some(parent),
            _ => None,
        }
    }
}

/// A network endpoint declared on a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub scheme: Scheme,
    pub protocol: Protocol,
    pub transport: Transport,
    /// Port the container listens on, if pinned.
    pub container_port: Option<u16>,
    /// Reachable from outside the container-apps environment.
    pub external: bool,
}

impl Binding {
    /// A binding with the protocol and transport implied by its scheme.
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            protocol: Protocol::default(),
            transport: Transport::for_scheme(scheme),
            container_port: None,
            external: false,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.container_port = Some(port);
        self
    }

    pub fn external(mut self) -> Self {
        self.external = true;
        self
    }

    /// Port a client connects to: the container port, or the scheme default.
    pub fn port(&self) -> Option<u16> {
        self.container_port.or_else(|| self.scheme.default_port())
    }
}

/// Type-specific data of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Payload {
    /// Built from a project file.
    Project { path: String },
    /// Built from a Dockerfile.
    Dockerfile {
        path: String,
        context: String,
        build_args: IndexMap<String, String>,
    },
    /// Prebuilt container image.
    Container { image: String, args: Vec<String> },
    /// Child of another resource (storage blob/queue/table, postgres database).
    Child { parent: String },
    ServiceBus {
        queues: Vec<String>,
        topics: Vec<String>,
    },
    /// Literal value, may contain reference expressions.
    Value { value: String },
    /// Deploy-time parameter.
    Parameter { value: Option<String>, secret: bool },
    #[default]
    None,
}

impl Payload {
    /// Returns true for payloads whose image is produced by a build.
    pub fn is_build(&self) -> bool {
        matches!(self, Payload::Project { .. } | Payload::Dockerfile { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_defaults() {
        let binding = Binding::new(Scheme::Https);
        assert_eq!(binding.transport, Transport::Http);
        assert_eq!(binding.protocol, Protocol::Tcp);
        assert_eq!(binding.port(), Some(443));
        assert!(!binding.external);

        let pinned = Binding::new(Scheme::Http).with_port(8080).external();
        assert_eq!(pinned.port(), Some(8080));
        assert!(pinned.external);

        assert_eq!(Binding::new(Scheme::Tcp).port(), None);
    }

    #[test]
    fn test_resource_accessors() {
        let mut api = Resource::new("api", "project.v0");
        api.payload = Payload::Project {
            path: "Api.csproj".into(),
        };
        api.bindings
            .insert("http".into(), Binding::new(Scheme::Http));

        assert!(api.is_deployable());
        assert!(!api.has_external_binding());
        assert!(api.binding("http").is_some());
        assert!(api.payload.is_build());

        let mut blobs = Resource::new("blobs", "azure.storage.blob.v0");
        blobs.payload = Payload::Child {
            parent: "storage".into(),
        };
        assert_eq!(blobs.parent(), Some("storage"));
        assert!(!blobs.is_deployable());
    }
}
