//! Static rewrite rule table.
//!
//! Each row maps a `(platform type tag, property kind)` pair to a function
//! producing the deploy-time expression. Supporting a new platform type, or a
//! new version of one, is a matter of adding rows.

use kiln_core::alpha_snake_upper;
use kiln_ir::{Binding, Payload, ResourceKind};

use super::{Resolved, Rewrite};
use crate::Result;

/// Environment variable holding the default domain of the container-apps environment.
pub const ENVIRONMENT_DOMAIN_VAR: &str = "AZURE_CONTAINER_APPS_ENVIRONMENT_DEFAULT_DOMAIN";

/// Accessor a reference expression asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    ConnectionString,
    Value,
    BindingUrl,
    BindingHost,
    BindingPort,
    BindingScheme,
}

/// A parsed property path such as `connectionString` or `bindings.http.url`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property<'a> {
    pub kind: PropertyKind,
    /// Binding name for `bindings.<binding>.*` paths.
    pub binding: Option<&'a str>,
}

impl<'a> Property<'a> {
    pub fn parse(path: &'a str) -> Option<Self> {
        let kind = match path {
            "connectionString" => PropertyKind::ConnectionString,
            "value" => PropertyKind::Value,
            _ => {
                let (binding, accessor) = path.strip_prefix("bindings.")?.rsplit_once('.')?;
                if binding.is_empty() {
                    return None;
                }
                let kind = match accessor {
                    "url" => PropertyKind::BindingUrl,
                    "host" => PropertyKind::BindingHost,
                    "port" => PropertyKind::BindingPort,
                    "scheme" => PropertyKind::BindingScheme,
                    _ => return None,
                };
                return Some(Self {
                    kind,
                    binding: Some(binding),
                });
            }
        };
        Some(Self {
            kind,
            binding: None,
        })
    }
}

pub type RewriteFn = fn(&mut Rewrite<'_, '_>) -> Result<Resolved>;

/// One row of the rule table.
#[derive(Debug, Clone, Copy)]
pub struct RewriteRule {
    pub platform_type: &'static str,
    pub property: PropertyKind,
    pub rewrite: RewriteFn,
}

const fn rule(platform_type: &'static str, property: PropertyKind, rewrite: RewriteFn) -> RewriteRule {
    RewriteRule {
        platform_type,
        property,
        rewrite,
    }
}

use PropertyKind::*;

pub static RULES: &[RewriteRule] = &[
    // Backing services run in the environment
    rule("postgres.server.v0", ConnectionString, connection_string_call),
    rule("postgres.database.v0", ConnectionString, connection_string_call),
    rule("redis.v0", ConnectionString, connection_string_call),
    // Container apps
    rule("project.v0", BindingUrl, binding_url),
    rule("project.v0", BindingHost, binding_host),
    rule("project.v0", BindingPort, binding_port),
    rule("project.v0", BindingScheme, binding_scheme),
    rule("dockerfile.v0", BindingUrl, binding_url),
    rule("dockerfile.v0", BindingHost, binding_host),
    rule("dockerfile.v0", BindingPort, binding_port),
    rule("dockerfile.v0", BindingScheme, binding_scheme),
    rule("container.v0", BindingUrl, binding_url),
    rule("container.v0", BindingHost, binding_host),
    rule("container.v0", BindingPort, binding_port),
    rule("container.v0", BindingScheme, binding_scheme),
    rule("container.v0", ConnectionString, own_connection_string),
    // Values and parameters
    rule("value.v0", ConnectionString, own_connection_string),
    rule("value.v0", Value, own_value),
    rule("parameter.v0", Value, parameter_call),
    // Azure resources, exposed through outputs of the infrastructure deployment
    rule("azure.storage.blob.v0", ConnectionString, storage_endpoint),
    rule("azure.storage.queue.v0", ConnectionString, storage_endpoint),
    rule("azure.storage.table.v0", ConnectionString, storage_endpoint),
    rule("azure.servicebus.v0", ConnectionString, service_endpoint),
    rule("azure.keyvault.v0", ConnectionString, service_endpoint),
    rule("azure.appinsights.v0", ConnectionString, appinsights_connection_string),
];

/// Find the rule for a platform type tag and property kind.
pub fn lookup(platform_type: &str, property: PropertyKind) -> Option<&'static RewriteRule> {
    RULES
        .iter()
        .find(|r| r.platform_type == platform_type && r.property == property)
}

/// Name of the output variable carrying a service binding value (e.g.,
/// `SERVICE_BINDING_MYSTORAGE_BLOBENDPOINT`).
pub fn service_binding_var(resource: &str, suffix: &str) -> String {
    format!("SERVICE_BINDING_{}_{}", alpha_snake_upper(resource), suffix)
}

fn env_expression(var: &str) -> String {
    format!("{{{{ .Env.{} }}}}", var)
}

fn connection_string_call(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    Ok(Resolved::plain(format!(
        "{{{{ connectionString \"{}\" }}}}",
        rw.name()
    )))
}

fn host(name: &str, binding: &Binding) -> String {
    let internal = if binding.external { "" } else { ".internal" };
    format!(
        "{}{}.{}",
        name,
        internal,
        env_expression(ENVIRONMENT_DOMAIN_VAR)
    )
}

fn binding_url(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    let binding = rw.binding()?;
    Ok(Resolved::plain(format!(
        "{}://{}",
        binding.scheme.as_str(),
        host(rw.name(), binding)
    )))
}

fn binding_host(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    let binding = rw.binding()?;
    Ok(Resolved::plain(host(rw.name(), binding)))
}

fn binding_port(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    let port = rw.binding()?.port().ok_or_else(|| rw.unsupported())?;
    Ok(Resolved::plain(port.to_string()))
}

fn binding_scheme(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    Ok(Resolved::plain(rw.binding()?.scheme.as_str()))
}

fn own_connection_string(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    let template = rw
        .resource()?
        .connection_string
        .as_deref()
        .ok_or_else(|| rw.unsupported())?;
    rw.nested(template)
}

fn own_value(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    match &rw.resource()?.payload {
        Payload::Value { value } => rw.nested(value),
        _ => Err(rw.unsupported()),
    }
}

fn parameter_call(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    // Without a graph the parameter's secrecy is unknown; treat it as plain.
    let secret = rw
        .resource()
        .is_ok_and(|r| matches!(r.payload, Payload::Parameter { secret: true, .. }));
    Ok(Resolved {
        text: format!("{{{{ parameter \"{}\" }}}}", rw.name()),
        secret,
    })
}

fn storage_endpoint(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    let resource = rw.resource()?;
    let suffix = match resource.kind() {
        ResourceKind::StorageBlob => "BLOBENDPOINT",
        ResourceKind::StorageQueue => "QUEUEENDPOINT",
        ResourceKind::StorageTable => "TABLEENDPOINT",
        _ => return Err(rw.unsupported()),
    };
    let parent = resource.parent().ok_or_else(|| rw.unsupported())?;
    Ok(Resolved::plain(env_expression(&service_binding_var(
        parent, suffix,
    ))))
}

fn service_endpoint(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    Ok(Resolved::plain(env_expression(&service_binding_var(
        rw.name(),
        "ENDPOINT",
    ))))
}

fn appinsights_connection_string(rw: &mut Rewrite<'_, '_>) -> Result<Resolved> {
    Ok(Resolved::plain(env_expression(&service_binding_var(
        rw.name(),
        "CONNECTION_STRING",
    ))))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_parse_property() {
        assert_eq!(
            Property::parse("connectionString").map(|p| p.kind),
            Some(PropertyKind::ConnectionString)
        );
        let url = Property::parse("bindings.http.url").unwrap();
        assert_eq!(url.kind, PropertyKind::BindingUrl);
        assert_eq!(url.binding, Some("http"));

        // Binding names may themselves contain dots
        let port = Property::parse("bindings.a.b.port").unwrap();
        assert_eq!(port.binding, Some("a.b"));

        assert!(Property::parse("bindings..url").is_none());
        assert!(Property::parse("bindings.http.path").is_none());
        assert!(Property::parse("inputs.value").is_none());
    }

    #[test]
    fn test_rules_unique() {
        let mut seen = HashSet::new();
        for rule in RULES {
            assert!(
                seen.insert((rule.platform_type, rule.property)),
                "duplicate rule for {} {:?}",
                rule.platform_type,
                rule.property
            );
        }
    }

    #[test]
    fn test_lookup_is_versioned() {
        assert!(lookup("redis.v0", PropertyKind::ConnectionString).is_some());
        assert!(lookup("redis.v1", PropertyKind::ConnectionString).is_none());
        assert!(lookup("redis.v0", PropertyKind::Value).is_none());
    }

    #[test]
    fn test_service_binding_var() {
        assert_eq!(
            service_binding_var("my-storage", "BLOBENDPOINT"),
            "SERVICE_BINDING_MY_STORAGE_BLOBENDPOINT"
        );
    }
}
