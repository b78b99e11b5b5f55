//! Shared platform resources derived from the graph.
//!
//! Children are identity sets keyed by name: adding the same child twice is a
//! no-op, and ordering only exists so rendering is deterministic.

use std::collections::{BTreeMap, BTreeSet};

/// A storage account and the containers declared inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageAccount {
    pub blobs: BTreeSet<String>,
    pub queues: BTreeSet<String>,
    pub tables: BTreeSet<String>,
}

impl StorageAccount {
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty() && self.queues.is_empty() && self.tables.is_empty()
    }
}

/// A Service Bus namespace with its queues and topics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceBusNamespace {
    pub queues: BTreeSet<String>,
    pub topics: BTreeSet<String>,
}

/// A backing service run inside the container-apps environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EnvironmentService {
    Redis,
    Postgres,
}

impl EnvironmentService {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentService::Redis => "redis",
            EnvironmentService::Postgres => "postgres",
        }
    }
}

/// Registry of platform resources, keyed by resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlatformRegistry {
    storage_accounts: BTreeMap<String, StorageAccount>,
    service_buses: BTreeMap<String, ServiceBusNamespace>,
    key_vaults: BTreeSet<String>,
    app_insights: BTreeSet<String>,
    environment_services: BTreeMap<String, EnvironmentService>,
    container_apps: bool,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the storage account entry if absent. Never clears existing children.
    pub fn ensure_storage(&mut self, parent: impl Into<String>) -> &mut StorageAccount {
        self.storage_accounts.entry(parent.into()).or_default()
    }

    pub fn add_blob(&mut self, parent: impl Into<String>, blob: impl Into<String>) {
        self.ensure_storage(parent).blobs.insert(blob.into());
    }

    pub fn add_queue(&mut self, parent: impl Into<String>, queue: impl Into<String>) {
        self.ensure_storage(parent).queues.insert(queue.into());
    }

    pub fn add_table(&mut self, parent: impl Into<String>, table: impl Into<String>) {
        self.ensure_storage(parent).tables.insert(table.into());
    }

    pub fn storage(&self, name: &str) -> Option<&StorageAccount> {
        self.storage_accounts.get(name)
    }

    pub fn storage_accounts(&self) -> &BTreeMap<String, StorageAccount> {
        &self.storage_accounts
    }

    /// Register a Service Bus namespace, merging queues and topics into any existing entry.
    pub fn add_service_bus<Q, T>(&mut self, name: impl Into<String>, queues: Q, topics: T)
    where
        Q: IntoIterator,
        Q::Item: Into<String>,
        T: IntoIterator,
        T::Item: Into<String>,
    {
        let namespace = self.service_buses.entry(name.into()).or_default();
        namespace.queues.extend(queues.into_iter().map(Into::into));
        namespace.topics.extend(topics.into_iter().map(Into::into));
    }

    pub fn service_buses(&self) -> &BTreeMap<String, ServiceBusNamespace> {
        &self.service_buses
    }

    pub fn add_key_vault(&mut self, name: impl Into<String>) {
        self.key_vaults.insert(name.into());
    }

    pub fn key_vaults(&self) -> &BTreeSet<String> {
        &self.key_vaults
    }

    pub fn add_app_insights(&mut self, name: impl Into<String>) {
        self.app_insights.insert(name.into());
    }

    pub fn app_insights(&self) -> &BTreeSet<String> {
        &self.app_insights
    }

    /// Register a backing service run inside the environment (Redis, Postgres).
    pub fn add_environment_service(&mut self, name: impl Into<String>, kind: EnvironmentService) {
        self.environment_services.insert(name.into(), kind);
    }

    pub fn environment_services(&self) -> &BTreeMap<String, EnvironmentService> {
        &self.environment_services
    }

    /// Record that at least one resource deploys as a container app.
    pub fn require_container_apps(&mut self) {
        self.container_apps = true;
    }

    /// Returns true if the container-apps environment must be provisioned.
    pub fn needs_environment(&self) -> bool {
        self.container_apps || !self.environment_services.is_empty()
    }

    /// Returns true if nothing needs provisioning.
    pub fn is_empty(&self) -> bool {
        self.storage_accounts.is_empty()
            && self.service_buses.is_empty()
            && self.key_vaults.is_empty()
            && self.app_insights.is_empty()
            && !self.needs_environment()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(registry: &PlatformRegistry, parent: &str) -> (usize, usize, usize) {
        let account = registry.storage(parent).expect("parent registered");
        (
            account.blobs.len(),
            account.queues.len(),
            account.tables.len(),
        )
    }

    #[test]
    fn test_storage_aggregation_is_idempotent() {
        let mut registry = PlatformRegistry::new();

        registry.add_blob("storage", "blob");
        registry.ensure_storage("storage");
        registry.add_queue("storage", "quue");
        registry.ensure_storage("storage");
        registry.add_table("storage", "table");
        registry.ensure_storage("storage2");
        registry.ensure_storage("storage3");
        registry.add_table("storage4", "table");
        registry.add_table("storage2", "table");
        registry.add_queue("storage", "quue2");

        assert_eq!(registry.storage_accounts().len(), 4);
        assert_eq!(counts(&registry, "storage"), (1, 2, 1));
        assert_eq!(counts(&registry, "storage2"), (0, 0, 1));
        assert_eq!(counts(&registry, "storage3"), (0, 0, 0));
        assert_eq!(counts(&registry, "storage4"), (0, 0, 1));
    }

    #[test]
    fn test_duplicate_children_collapse() {
        let mut registry = PlatformRegistry::new();
        for _ in 0..3 {
            registry.add_blob("storage", "images");
            registry.add_queue("storage", "jobs");
        }
        registry.add_blob("storage", "thumbs");

        assert_eq!(counts(&registry, "storage"), (2, 1, 0));
    }

    #[test]
    fn test_order_independent() {
        let mut a = PlatformRegistry::new();
        a.add_table("s", "t1");
        a.add_table("s", "t2");
        a.ensure_storage("s");

        let mut b = PlatformRegistry::new();
        b.ensure_storage("s");
        b.add_table("s", "t2");
        b.add_table("s", "t1");
        b.add_table("s", "t2");

        assert_eq!(a, b);
    }

    #[test]
    fn test_service_bus_merges() {
        let mut registry = PlatformRegistry::new();
        registry.add_service_bus("bus", ["orders"], ["events"]);
        registry.add_service_bus("bus", ["orders", "returns"], Vec::<String>::new());

        let bus = &registry.service_buses()["bus"];
        assert_eq!(bus.queues.len(), 2);
        assert_eq!(bus.topics.len(), 1);
    }

    #[test]
    fn test_needs_environment() {
        let mut registry = PlatformRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.needs_environment());

        registry.add_environment_service("cache", EnvironmentService::Redis);
        assert!(registry.needs_environment());

        let mut apps_only = PlatformRegistry::new();
        apps_only.require_container_apps();
        assert!(apps_only.needs_environment());
        assert!(!apps_only.is_empty());
    }
}
