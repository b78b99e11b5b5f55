//! Caller-supplied decision about which bindings are reachable from outside.

use std::collections::{BTreeMap, BTreeSet};

/// Bindings of one resource to expose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExposedBindings {
    /// Every binding of the resource.
    All,
    /// Only the named bindings.
    Only(BTreeSet<String>),
}

/// Which resources, and which of their bindings, are externally exposed.
///
/// The compiler never infers exposure; it applies this to the graph before
/// anything is rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exposure {
    services: BTreeMap<String, ExposedBindings>,
}

impl Exposure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose every binding of a resource.
    pub fn expose_all(&mut self, resource: impl Into<String>) -> &mut Self {
        self.services.insert(resource.into(), ExposedBindings::All);
        self
    }

    /// Expose a single binding. Has no effect if the resource is already fully exposed.
    pub fn expose_binding(
        &mut self,
        resource: impl Into<String>,
        binding: impl Into<String>,
    ) -> &mut Self {
        let entry = self
            .services
            .entry(resource.into())
            .or_insert_with(|| ExposedBindings::Only(BTreeSet::new()));
        if let ExposedBindings::Only(bindings) = entry {
            bindings.insert(binding.into());
        }
        self
    }

    /// Parse a `name` or `name:binding` item, as given on the command line.
    pub fn expose_spec(&mut self, spec: &str) -> &mut Self {
        match spec.split_once(':') {
            Some((resource, binding)) => self.expose_binding(resource, binding),
            None => self.expose_all(spec),
        }
    }

    pub fn get(&self, resource: &str) -> Option<&ExposedBindings> {
        self.services.get(resource)
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExposedBindings)> {
        self.services.iter().map(|(name, b)| (name.as_str(), b))
    }
}
