//! Template context for one container app.

use std::collections::BTreeMap;

use kiln_codegen::resolve::Resolved;
use kiln_core::{Scheme, Transport, to_secret_name};
use kiln_ir::{Payload, Resource};

/// Environment variable that carries the managed identity client id.
pub const CLIENT_ID_VAR: &str = "AZURE_CLIENT_ID";

/// Port used when no binding pins a container port.
pub const DEFAULT_TARGET_PORT: u16 = 8080;

/// Ingress settings derived from a resource's bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingress {
    pub external: bool,
    pub target_port: u16,
    /// Container Apps transport: `http`, `http2` or `tcp`.
    pub transport: &'static str,
    pub allow_insecure: bool,
}

impl Ingress {
    /// Derive ingress from bindings. Returns `None` for a resource without bindings.
    ///
    /// Port and transport both come from one binding: the first external one,
    /// or the first binding when none is external.
    pub fn from_resource(resource: &Resource) -> Option<Self> {
        let primary = resource
            .bindings
            .values()
            .find(|b| b.external)
            .or_else(|| resource.bindings.values().next())?;

        let external = resource.has_external_binding();
        let target_port = primary.container_port.unwrap_or(DEFAULT_TARGET_PORT);
        let transport = match primary.transport {
            Transport::Http => "http",
            Transport::Http2 => "http2",
            Transport::Tcp | Transport::Udp => "tcp",
        };
        let allow_insecure = resource
            .bindings
            .values()
            .any(|b| b.external && b.scheme == Scheme::Http);

        Some(Self {
            external,
            target_port,
            transport,
            allow_insecure,
        })
    }

    /// TCP ingress needs an exposed port on the environment.
    pub fn exposed_port(&self) -> Option<u16> {
        (self.transport == "tcp").then_some(self.target_port)
    }
}

/// Value of one container environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Value(String),
    SecretRef(String),
}

/// Entry of `configuration.secrets`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Secret {
    pub name: String,
    pub value: String,
}

/// Everything the container app template needs for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceManifestContext {
    pub name: String,
    /// `{{ .Image }}` for built images, the literal image otherwise.
    pub image: String,
    /// True when the image is pushed to the environment's registry.
    pub uses_registry: bool,
    pub args: Vec<String>,
    pub ingress: Option<Ingress>,
    /// Environment in emission order: the client id first, then by name.
    pub env: Vec<(String, EnvValue)>,
    /// Secrets sorted by name.
    pub secrets: Vec<Secret>,
}

impl ServiceManifestContext {
    /// Build the context from a resource and its already resolved values.
    pub fn new(
        resource: &Resource,
        env: BTreeMap<String, Resolved>,
        args: Vec<String>,
    ) -> Self {
        let (image, uses_registry) = match &resource.payload {
            Payload::Container { image, .. } => (image.clone(), false),
            _ => ("{{ .Image }}".to_string(), true),
        };

        let mut entries = Vec::with_capacity(env.len() + 1);
        if !env.contains_key(CLIENT_ID_VAR) {
            entries.push((
                CLIENT_ID_VAR.to_string(),
                EnvValue::Value("{{ .Env.MANAGED_IDENTITY_CLIENT_ID }}".to_string()),
            ));
        }

        let mut secrets = Vec::new();
        for (name, resolved) in env {
            if resolved.secret {
                let secret_name = to_secret_name(&name);
                secrets.push(Secret {
                    name: secret_name.clone(),
                    value: resolved.text,
                });
                entries.push((name, EnvValue::SecretRef(secret_name)));
            } else {
                entries.push((name, EnvValue::Value(resolved.text)));
            }
        }
        secrets.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            name: resource.name.clone(),
            image,
            uses_registry,
            args,
            ingress: Ingress::from_resource(resource),
            env: entries,
            secrets,
        }
    }
}

#[cfg(test)]
mod tests {
    use kiln_ir::Binding;

    use super::*;

    fn service(bindings: &[(&str, Binding)]) -> Resource {
        let mut resource = Resource::new("web", "project.v0");
        resource.payload = Payload::Project {
            path: "Web.csproj".into(),
        };
        for (name, binding) in bindings {
            resource.bindings.insert(name.to_string(), binding.clone());
        }
        resource
    }

    #[test]
    fn test_no_bindings_no_ingress() {
        assert_eq!(Ingress::from_resource(&service(&[])), None);
    }

    #[test]
    fn test_internal_ingress_defaults() {
        let ingress = Ingress::from_resource(&service(&[
            ("http", Binding::new(Scheme::Http)),
            ("https", Binding::new(Scheme::Https)),
        ]))
        .unwrap();

        assert_eq!(
            ingress,
            Ingress {
                external: false,
                target_port: DEFAULT_TARGET_PORT,
                transport: "http",
                allow_insecure: false,
            }
        );
        assert_eq!(ingress.exposed_port(), None);
    }

    #[test]
    fn test_external_http_allows_insecure() {
        let ingress = Ingress::from_resource(&service(&[
            ("http", Binding::new(Scheme::Http).with_port(5000).external()),
            ("https", Binding::new(Scheme::Https).with_port(5001)),
        ]))
        .unwrap();

        assert!(ingress.external);
        assert!(ingress.allow_insecure);
        assert_eq!(ingress.target_port, 5000);
    }

    #[test]
    fn test_port_and_transport_from_one_binding() {
        let internal = Ingress::from_resource(&service(&[
            ("http", Binding::new(Scheme::Http)),
            ("tcp", Binding::new(Scheme::Tcp).with_port(6379)),
        ]))
        .unwrap();
        assert_eq!(internal.transport, "http");
        assert_eq!(internal.target_port, DEFAULT_TARGET_PORT);

        let exposed = Ingress::from_resource(&service(&[
            ("http", Binding::new(Scheme::Http).with_port(5000)),
            ("tcp", Binding::new(Scheme::Tcp).with_port(6379).external()),
        ]))
        .unwrap();
        assert_eq!(exposed.transport, "tcp");
        assert_eq!(exposed.target_port, 6379);
        assert_eq!(exposed.exposed_port(), Some(6379));
    }

    #[test]
    fn test_tcp_ingress() {
        let ingress =
            Ingress::from_resource(&service(&[("tcp", Binding::new(Scheme::Tcp).with_port(6379))]))
                .unwrap();

        assert_eq!(ingress.transport, "tcp");
        assert_eq!(ingress.exposed_port(), Some(6379));
    }

    #[test]
    fn test_env_split_into_values_and_secrets() {
        let env = BTreeMap::from([
            ("B".to_string(), Resolved::plain("b")),
            (
                "ConnectionStrings__db".to_string(),
                Resolved {
                    text: "{{ connectionString \"db\" }}".into(),
                    secret: true,
                },
            ),
        ]);

        let ctx = ServiceManifestContext::new(&service(&[]), env, Vec::new());

        let names: Vec<_> = ctx.env.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec![CLIENT_ID_VAR, "B", "ConnectionStrings__db"]);
        assert_eq!(
            ctx.env[2].1,
            EnvValue::SecretRef("connectionstrings--db".into())
        );
        assert_eq!(ctx.secrets.len(), 1);
        assert_eq!(ctx.image, "{{ .Image }}");
        assert!(ctx.uses_registry);
    }

    #[test]
    fn test_defined_client_id_kept() {
        let env = BTreeMap::from([(CLIENT_ID_VAR.to_string(), Resolved::plain("custom"))]);

        let ctx = ServiceManifestContext::new(&service(&[]), env, Vec::new());

        assert_eq!(
            ctx.env,
            vec![(CLIENT_ID_VAR.to_string(), EnvValue::Value("custom".into()))]
        );
    }
}
