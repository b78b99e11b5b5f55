//! Reference expression resolution.
//!
//! Values may embed `{resource.property}` placeholders. The resolver scans
//! each value left to right, looks up the referenced resource's platform type
//! in the [`TypeCatalog`], and replaces the placeholder with the output of the
//! matching rule from [`rules::RULES`]. Text around placeholders is copied
//! through unchanged.
//!
//! # Example
//!
//! ```
//! use kiln_codegen::resolve::Resolver;
//! use kiln_ir::{PlatformType, TypeCatalog};
//!
//! let mut catalog = TypeCatalog::new();
//! catalog.record("db", PlatformType::new("postgres.database.v0"));
//!
//! let resolved = Resolver::new(&catalog).resolve("conn={db.connectionString}").unwrap();
//! assert_eq!(resolved.text, "conn={{ connectionString \"db\" }}");
//! assert!(resolved.secret);
//! ```

pub mod rules;
mod scan;

use std::collections::BTreeMap;

use kiln_ir::{Binding, PlatformType, Resource, ResourceGraph, TypeCatalog};
pub use rules::{ENVIRONMENT_DOMAIN_VAR, Property, PropertyKind, service_binding_var};
pub use scan::{Reference, Token, scan};

use crate::{Error, Result};

/// The output of resolving one value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    pub text: String,
    /// True if the value carries a connection string or a secret parameter.
    pub secret: bool,
}

impl Resolved {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            secret: false,
        }
    }
}

/// Rewrites reference expressions into deploy-time expressions.
///
/// Built from a complete [`TypeCatalog`]. Rules that need more than the type
/// (bindings, parents, nested templates) also need the graph; see
/// [`Resolver::with_graph`].
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalog: &'a TypeCatalog,
    graph: Option<&'a ResourceGraph>,
}

impl<'a> Resolver<'a> {
    /// Resolver backed by a catalog only.
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self {
            catalog,
            graph: None,
        }
    }

    /// Resolver backed by a graph and its catalog.
    pub fn with_graph(graph: &'a ResourceGraph) -> Self {
        Self {
            catalog: graph.catalog(),
            graph: Some(graph),
        }
    }

    /// Resolve every reference in a value.
    pub fn resolve(&self, value: &str) -> Result<Resolved> {
        self.resolve_in(value, &mut Vec::new())
    }

    /// Resolve an environment mapping, keyed by variable name.
    pub fn resolve_env<'e, I>(&self, env: I) -> Result<BTreeMap<String, String>>
    where
        I: IntoIterator<Item = (&'e String, &'e String)>,
    {
        Ok(self
            .resolve_env_entries(env)?
            .into_iter()
            .map(|(name, resolved)| (name, resolved.text))
            .collect())
    }

    /// Resolve an environment mapping, keeping the secret flag of each value.
    ///
    /// Errors are wrapped in [`Error::Env`] naming the variable.
    pub fn resolve_env_entries<'e, I>(&self, env: I) -> Result<BTreeMap<String, Resolved>>
    where
        I: IntoIterator<Item = (&'e String, &'e String)>,
    {
        env.into_iter()
            .map(|(name, value)| {
                let resolved = self.resolve(value).map_err(|source| Error::Env {
                    variable: name.clone(),
                    source: Box::new(source),
                })?;
                Ok((name.clone(), resolved))
            })
            .collect()
    }

    fn resolve_in(&self, value: &str, stack: &mut Vec<String>) -> Result<Resolved> {
        let mut out = Resolved {
            text: String::with_capacity(value.len()),
            secret: false,
        };

        for token in scan(value)? {
            match token {
                Token::Literal(text) => out.text.push_str(text),
                Token::Escaped(brace) => out.text.push(brace),
                Token::Reference(reference) => {
                    let part = self.rewrite(&reference, stack)?;
                    out.text.push_str(&part.text);
                    out.secret |= part.secret;
                }
            }
        }

        Ok(out)
    }

    fn rewrite(&self, reference: &Reference<'_>, stack: &mut Vec<String>) -> Result<Resolved> {
        let platform_type =
            self.catalog
                .get(reference.name)
                .ok_or_else(|| Error::UnresolvedReference {
                    expression: reference.expression.to_string(),
                    name: reference.name.to_string(),
                })?;

        let unsupported = || Error::UnsupportedBinding {
            platform_type: platform_type.tag().to_string(),
            property: reference.property.to_string(),
        };
        let property = Property::parse(reference.property).ok_or_else(unsupported)?;
        let rule = rules::lookup(platform_type.tag(), property.kind).ok_or_else(unsupported)?;

        tracing::trace!(
            resource = reference.name,
            property = reference.property,
            platform_type = rule.platform_type,
            "rewriting reference"
        );

        let mut rewrite = Rewrite {
            resolver: self,
            reference,
            platform_type,
            property,
            stack,
        };
        let mut resolved = (rule.rewrite)(&mut rewrite)?;
        resolved.secret |= property.kind == PropertyKind::ConnectionString;
        Ok(resolved)
    }
}

/// State handed to a rewrite rule for one reference.
pub struct Rewrite<'r, 'a> {
    resolver: &'r Resolver<'a>,
    reference: &'r Reference<'r>,
    platform_type: &'a PlatformType,
    property: Property<'r>,
    stack: &'r mut Vec<String>,
}

impl<'r, 'a> Rewrite<'r, 'a> {
    /// Name of the referenced resource.
    pub fn name(&self) -> &'r str {
        self.reference.name
    }

    pub fn platform_type(&self) -> &'a PlatformType {
        self.platform_type
    }

    pub fn property(&self) -> Property<'r> {
        self.property
    }

    /// The referenced resource. Fails when the resolver has no graph.
    pub fn resource(&self) -> Result<&'a Resource> {
        let graph = self.resolver.graph.ok_or_else(|| Error::UnknownResource {
            name: self.name().to_string(),
        })?;
        Ok(graph.get(self.name())?)
    }

    /// The binding named by a `bindings.<binding>.*` property.
    pub fn binding(&self) -> Result<&'a Binding> {
        let name = self.property.binding.ok_or_else(|| self.unsupported())?;
        self.resource()?
            .binding(name)
            .ok_or_else(|| self.unsupported())
    }

    /// Error for a reference this rule cannot serve.
    pub fn unsupported(&self) -> Error {
        Error::UnsupportedBinding {
            platform_type: self.platform_type.tag().to_string(),
            property: self.reference.property.to_string(),
        }
    }

    /// Resolve a template owned by the referenced resource.
    pub fn nested(&mut self, template: &str) -> Result<Resolved> {
        let key = format!("{}.{}", self.reference.name, self.reference.property);
        if self.stack.contains(&key) {
            let mut chain = self.stack.clone();
            chain.push(key);
            return Err(Error::ReferenceCycle {
                chain: chain.join(" -> "),
            });
        }

        self.stack.push(key);
        let result = self.resolver.resolve_in(template, self.stack);
        self.stack.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use kiln_core::Scheme;
    use kiln_ir::Payload;

    use super::*;

    fn catalog(entries: &[(&str, &str)]) -> TypeCatalog {
        entries
            .iter()
            .map(|(name, tag)| (name.to_string(), PlatformType::new(*tag)))
            .collect()
    }

    fn env(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn graph() -> ResourceGraph {
        let mut api = Resource::new("api", "project.v0");
        api.bindings
            .insert("http".into(), Binding::new(Scheme::Http));
        api.bindings
            .insert("https".into(), Binding::new(Scheme::Https).external());
        api.bindings
            .insert("grpc".into(), Binding::new(Scheme::Tcp));

        let mut blobs = Resource::new("blobs", "azure.storage.blob.v0");
        blobs.payload = Payload::Child {
            parent: "storage".into(),
        };

        let mut pw = Resource::new("pw", "parameter.v0");
        pw.payload = Payload::Parameter {
            value: None,
            secret: true,
        };

        let mut mongo = Resource::new("mongo", "container.v0");
        mongo.connection_string = Some("mongodb://{mongo.bindings.grpc.host}:27017".into());
        mongo
            .bindings
            .insert("grpc".into(), Binding::new(Scheme::Tcp).with_port(27017));

        let mut loop_a = Resource::new("a", "value.v0");
        loop_a.connection_string = Some("x{b.connectionString}".into());
        let mut loop_b = Resource::new("b", "value.v0");
        loop_b.connection_string = Some("{a.connectionString}".into());

        [
            Resource::new("storage", "azure.storage.v0"),
            api,
            blobs,
            pw,
            mongo,
            Resource::new("bus", "azure.servicebus.v0"),
            Resource::new("insights", "azure.appinsights.v0"),
            loop_a,
            loop_b,
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_rewrite_preserves_surrounding_text() {
        let catalog = catalog(&[("service", "postgres.database.v0")]);
        let input = env(&[
            ("VAR1", "value1"),
            ("VAR2", "value2"),
            ("VAR3", "complex {service.connectionString} expression"),
        ]);

        let resolved = Resolver::new(&catalog).resolve_env(&input).unwrap();

        let expected: BTreeMap<String, String> = [
            ("VAR1", "value1"),
            ("VAR2", "value2"),
            ("VAR3", "complex {{ connectionString \"service\" }} expression"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(resolved, expected);
    }

    #[test]
    fn test_unknown_reference_fails() {
        let catalog = catalog(&[("service", "postgres.database.v0")]);
        let input = env(&[("DB", "{missing.connectionString}")]);

        let err = Resolver::new(&catalog).resolve_env(&input).unwrap_err();

        match err {
            Error::Env { variable, source } => {
                assert_eq!(variable, "DB");
                match *source {
                    Error::UnresolvedReference { expression, name } => {
                        assert_eq!(expression, "{missing.connectionString}");
                        assert_eq!(name, "missing");
                    }
                    other => panic!("unexpected error: {other:?}"),
                }
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_property() {
        let catalog = catalog(&[("cache", "redis.v0"), ("x", "dapr.v0")]);
        let resolver = Resolver::new(&catalog);

        for value in ["{cache.value}", "{cache.whatever}", "{x.connectionString}"] {
            match resolver.resolve(value) {
                Err(Error::UnsupportedBinding { .. }) => {}
                other => panic!("expected unsupported binding for {value}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_multiple_references_and_escapes() {
        let catalog = catalog(&[("a", "redis.v0"), ("b", "postgres.server.v0")]);
        let resolved = Resolver::new(&catalog)
            .resolve("{{json}} {a.connectionString};{b.connectionString}")
            .unwrap();

        assert_eq!(
            resolved.text,
            "{json} {{ connectionString \"a\" }};{{ connectionString \"b\" }}"
        );
        assert!(resolved.secret);
    }

    #[test]
    fn test_plain_value_not_secret() {
        let catalog = TypeCatalog::new();
        let resolved = Resolver::new(&catalog).resolve("just text").unwrap();
        assert_eq!(resolved, Resolved::plain("just text"));
    }

    #[test]
    fn test_binding_rules() {
        let graph = graph();
        let resolver = Resolver::with_graph(&graph);
        let resolve = |v: &str| resolver.resolve(v).unwrap().text;

        assert_eq!(
            resolve("{api.bindings.http.url}"),
            "http://api.internal.{{ .Env.AZURE_CONTAINER_APPS_ENVIRONMENT_DEFAULT_DOMAIN }}"
        );
        assert_eq!(
            resolve("{api.bindings.https.url}"),
            "https://api.{{ .Env.AZURE_CONTAINER_APPS_ENVIRONMENT_DEFAULT_DOMAIN }}"
        );
        assert_eq!(resolve("{api.bindings.https.port}"), "443");
        assert_eq!(resolve("{api.bindings.http.scheme}"), "http");

        assert!(matches!(
            resolver.resolve("{api.bindings.grpc.port}"),
            Err(Error::UnsupportedBinding { .. })
        ));
        assert!(matches!(
            resolver.resolve("{api.bindings.missing.url}"),
            Err(Error::UnsupportedBinding { .. })
        ));
    }

    #[test]
    fn test_binding_rules_need_graph() {
        let catalog = catalog(&[("api", "project.v0")]);
        assert!(matches!(
            Resolver::new(&catalog).resolve("{api.bindings.http.url}"),
            Err(Error::UnknownResource { .. })
        ));
    }

    #[test]
    fn test_azure_endpoints() {
        let graph = graph();
        let resolver = Resolver::with_graph(&graph);

        let blob = resolver.resolve("{blobs.connectionString}").unwrap();
        assert_eq!(blob.text, "{{ .Env.SERVICE_BINDING_STORAGE_BLOBENDPOINT }}");
        assert!(blob.secret);

        assert_eq!(
            resolver.resolve("{bus.connectionString}").unwrap().text,
            "{{ .Env.SERVICE_BINDING_BUS_ENDPOINT }}"
        );
        assert_eq!(
            resolver.resolve("{insights.connectionString}").unwrap().text,
            "{{ .Env.SERVICE_BINDING_INSIGHTS_CONNECTION_STRING }}"
        );
    }

    #[test]
    fn test_secret_parameter() {
        let graph = graph();
        let resolved = Resolver::with_graph(&graph).resolve("{pw.value}").unwrap();
        assert_eq!(resolved.text, "{{ parameter \"pw\" }}");
        assert!(resolved.secret);
    }

    #[test]
    fn test_container_connection_string_is_expanded() {
        let graph = graph();
        let resolved = Resolver::with_graph(&graph)
            .resolve("{mongo.connectionString}")
            .unwrap();
        assert_eq!(
            resolved.text,
            "mongodb://mongo.internal.{{ .Env.AZURE_CONTAINER_APPS_ENVIRONMENT_DEFAULT_DOMAIN }}:27017"
        );
    }

    #[test]
    fn test_reference_cycle() {
        let graph = graph();
        match Resolver::with_graph(&graph).resolve("{a.connectionString}") {
            Err(Error::ReferenceCycle { chain }) => {
                assert_eq!(
                    chain,
                    "a.connectionString -> b.connectionString -> a.connectionString"
                );
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_deterministic() {
        let graph = graph();
        let resolver = Resolver::with_graph(&graph);
        let input = env(&[
            ("B", "{api.bindings.http.url}"),
            ("A", "{bus.connectionString}"),
            ("C", "plain"),
        ]);

        let first = resolver.resolve_env(&input).unwrap();
        let second = resolver.resolve_env(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.keys().collect::<Vec<_>>(), vec!["A", "B", "C"]);
    }
}
