//! Type catalog: resource name to platform type.

use std::collections::BTreeMap;

use crate::PlatformType;

/// Mapping from resource name to platform type.
///
/// Populated while the graph is built and read-only afterwards; the resolver
/// only ever sees a complete catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeCatalog {
    types: BTreeMap<String, PlatformType>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the platform type of a resource.
    pub fn record(&mut self, name: impl Into<String>, ty: PlatformType) {
        self.types.insert(name.into(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&PlatformType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Entries sorted by resource name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlatformType)> {
        self.types.iter().map(|(name, ty)| (name.as_str(), ty))
    }
}

impl FromIterator<(String, PlatformType)> for TypeCatalog {
    fn from_iter<I: IntoIterator<Item = (String, PlatformType)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().collect(),
        }
    }
}
