//! The resource graph.

use indexmap::IndexMap;

use crate::{
    ExposedBindings, Exposure, ExposureError, PlatformType, Resource, TypeCatalog,
    UnknownBinding, UnknownResource,
};

/// Every declared resource, keyed by name, in declaration order.
///
/// The graph owns the [`TypeCatalog`] and records each resource's type as it
/// is inserted, so the catalog is complete as soon as the graph is.
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    resources: IndexMap<String, Resource>,
    catalog: TypeCatalog,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a resource, replacing any previous one with the same name.
    pub fn insert(&mut self, resource: Resource) {
        self.catalog
            .record(resource.name.clone(), resource.platform_type.clone());
        self.resources.insert(resource.name.clone(), resource);
    }

    /// Look up a resource by name.
    pub fn get(&self, name: &str) -> Result<&Resource, UnknownResource> {
        self.resources
            .get(name)
            .ok_or_else(|| UnknownResource::new(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Platform type of a resource.
    pub fn platform_type(&self, name: &str) -> Result<&PlatformType, UnknownResource> {
        self.get(name).map(|r| &r.platform_type)
    }

    /// Resources in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Resources that run as container apps, in declaration order.
    pub fn deployables(&self) -> impl Iterator<Item = &Resource> {
        self.iter().filter(|r| r.is_deployable())
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Mark bindings as externally exposed.
    ///
    /// Only ever sets the flag; bindings declared external in the manifest stay external.
    pub fn apply_exposure(&mut self, exposure: &Exposure) -> Result<(), ExposureError> {
        for (name, exposed) in exposure.iter() {
            let resource = self
                .resources
                .get_mut(name)
                .ok_or_else(|| UnknownResource::new(name))?;

            match exposed {
                ExposedBindings::All => {
                    for binding in resource.bindings.values_mut() {
                        binding.external = true;
                    }
                }
                ExposedBindings::Only(names) => {
                    for binding_name in names {
                        let binding = resource.bindings.get_mut(binding_name).ok_or_else(|| {
                            UnknownBinding {
                                resource: name.to_string(),
                                binding: binding_name.clone(),
                            }
                        })?;
                        binding.external = true;
                    }
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<Resource> for ResourceGraph {
    fn from_iter<I: IntoIterator<Item = Resource>>(iter: I) -> Self {
        let mut graph = Self::new();
        for resource in iter {
            graph.insert(resource);
        }
        graph
    }
}
