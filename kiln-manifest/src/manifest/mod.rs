//! Manifest types and parsing for app host manifests.

mod parse;
mod validate;

use std::fmt;

use indexmap::IndexMap;
use serde::{
    Deserialize, Deserializer,
    de::{MapAccess, Visitor},
};
pub use validate::ParseContext;

use crate::ResourceEntry;

/// Root of an app host manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// Resources keyed by name, in declaration order
    #[serde(deserialize_with = "deserialize_resources")]
    pub resources: IndexMap<String, ResourceEntry>,
}

impl Manifest {
    /// Look up a resource entry by name.
    pub fn resource(&self, name: &str) -> Option<&ResourceEntry> {
        self.resources.get(name)
    }

    /// Check if a resource exists.
    pub fn has_resource(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Resource names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Number of declared resources.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Deserialize the resources object, rejecting duplicate names.
///
/// A JSON object may repeat a key; a plain map would keep the last one and
/// silently drop the first resource.
fn deserialize_resources<'de, D>(
    deserializer: D,
) -> std::result::Result<IndexMap<String, ResourceEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ResourcesVisitor;

    impl<'de> Visitor<'de> for ResourcesVisitor {
        type Value = IndexMap<String, ResourceEntry>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an object of resources keyed by name")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            use serde::de::Error;

            let mut resources = IndexMap::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, entry)) = map.next_entry::<String, ResourceEntry>()? {
                if resources.contains_key(&name) {
                    return Err(A::Error::custom(format!("duplicate resource '{}'", name)));
                }
                resources.insert(name, entry);
            }
            Ok(resources)
        }
    }

    deserializer.deserialize_map(ResourcesVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_order() {
        let manifest: Manifest = serde_json::from_str(
            r#"{ "resources": {
                "zeta": { "type": "redis.v0" },
                "alpha": { "type": "redis.v0" },
                "mid": { "type": "redis.v0" }
            } }"#,
        )
        .unwrap();

        assert_eq!(
            manifest.names().collect::<Vec<_>>(),
            vec!["zeta", "alpha", "mid"]
        );
        assert!(manifest.has_resource("alpha"));
        assert!(manifest.resource("missing").is_none());
    }

    #[test]
    fn test_duplicate_resource_rejected() {
        let err = serde_json::from_str::<Manifest>(
            r#"{ "resources": {
                "cache": { "type": "redis.v0" },
                "cache": { "type": "redis.v0" }
            } }"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("duplicate resource 'cache'"));
    }

    #[test]
    fn test_resources_required() {
        assert!(serde_json::from_str::<Manifest>("{}").is_err());
    }
}
