//! Platform type tags and their classification.

use std::fmt;

/// Classification of a platform type by its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Project,
    Dockerfile,
    Container,
    Redis,
    PostgresServer,
    PostgresDatabase,
    Storage,
    StorageBlob,
    StorageQueue,
    StorageTable,
    ServiceBus,
    KeyVault,
    AppInsights,
    Parameter,
    Value,
    /// A type this compiler has no rules for.
    Unknown,
}

impl ResourceKind {
    /// Classify a type family (the tag without its version suffix).
    pub fn from_family(family: &str) -> Self {
        match family {
            "project" => ResourceKind::Project,
            "dockerfile" => ResourceKind::Dockerfile,
            "container" => ResourceKind::Container,
            "redis" => ResourceKind::Redis,
            "postgres.server" => ResourceKind::PostgresServer,
            "postgres.database" => ResourceKind::PostgresDatabase,
            "azure.storage" => ResourceKind::Storage,
            "azure.storage.blob" => ResourceKind::StorageBlob,
            "azure.storage.queue" => ResourceKind::StorageQueue,
            "azure.storage.table" => ResourceKind::StorageTable,
            "azure.servicebus" => ResourceKind::ServiceBus,
            "azure.keyvault" => ResourceKind::KeyVault,
            "azure.appinsights" => ResourceKind::AppInsights,
            "parameter" => ResourceKind::Parameter,
            "value" => ResourceKind::Value,
            _ => ResourceKind::Unknown,
        }
    }

    /// Returns true for resources that run as a container app.
    pub fn is_deployable(&self) -> bool {
        matches!(
            self,
            ResourceKind::Project | ResourceKind::Dockerfile | ResourceKind::Container
        )
    }

    /// Returns true for storage children (blob, queue, table).
    pub fn is_storage_child(&self) -> bool {
        matches!(
            self,
            ResourceKind::StorageBlob | ResourceKind::StorageQueue | ResourceKind::StorageTable
        )
    }

    /// Kind the `parent` of a child resource must have.
    pub fn parent_kind(&self) -> Option<ResourceKind> {
        match self {
            ResourceKind::StorageBlob | ResourceKind::StorageQueue | ResourceKind::StorageTable => {
                Some(ResourceKind::Storage)
            }
            ResourceKind::PostgresDatabase => Some(ResourceKind::PostgresServer),
            _ => None,
        }
    }
}

/// A namespaced, versioned platform type tag such as `postgres.database.v0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlatformType {
    tag: String,
}

impl PlatformType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// The full tag as written in the manifest.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The tag without its version suffix (e.g., "postgres.database").
    pub fn family(&self) -> &str {
        match self.split_version() {
            Some((family, _)) => family,
            None => &self.tag,
        }
    }

    /// The version suffix (e.g., "v0"), if the tag has one.
    pub fn version(&self) -> Option<&str> {
        self.split_version().map(|(_, version)| version)
    }

    pub fn kind(&self) -> ResourceKind {
        ResourceKind::from_family(self.family())
    }

    fn split_version(&self) -> Option<(&str, &str)> {
        let (family, version) = self.tag.rsplit_once('.')?;
        let digits = version.strip_prefix('v')?;
        (!digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
            .then_some((family, version))
    }
}

impl fmt::Display for PlatformType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

impl From<&str> for PlatformType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_and_version() {
        let ty = PlatformType::new("postgres.database.v0");
        assert_eq!(ty.family(), "postgres.database");
        assert_eq!(ty.version(), Some("v0"));
        assert_eq!(ty.kind(), ResourceKind::PostgresDatabase);
    }

    #[test]
    fn test_unversioned_tag() {
        let ty = PlatformType::new("azure.storage");
        assert_eq!(ty.family(), "azure.storage");
        assert_eq!(ty.version(), None);
        assert_eq!(ty.kind(), ResourceKind::Storage);

        let odd = PlatformType::new("redis.vnext");
        assert_eq!(odd.family(), "redis.vnext");
        assert_eq!(odd.kind(), ResourceKind::Unknown);
    }

    #[test]
    fn test_kind_classification() {
        assert!(ResourceKind::Project.is_deployable());
        assert!(ResourceKind::Container.is_deployable());
        assert!(!ResourceKind::Redis.is_deployable());
        assert!(ResourceKind::StorageQueue.is_storage_child());
        assert_eq!(
            ResourceKind::StorageTable.parent_kind(),
            Some(ResourceKind::Storage)
        );
        assert_eq!(
            ResourceKind::PostgresDatabase.parent_kind(),
            Some(ResourceKind::PostgresServer)
        );
        assert_eq!(ResourceKind::Redis.parent_kind(), None);
        assert_eq!(ResourceKind::from_family("dapr"), ResourceKind::Unknown);
    }
}
