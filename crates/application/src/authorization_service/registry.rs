use std::collections::HashSet;

use fixhub_core::AppResult;
use fixhub_domain::CapabilityName;
use tokio::sync::RwLock;

use crate::access_ports::PermissionStore;

/// Concurrency-safe set of capability names the resolver accepts.
///
/// Loaded from the permission store at process start and kept current by the
/// administration service as permissions are created, renamed and deleted.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    names: RwLock<HashSet<CapabilityName>>,
}

impl CapabilityRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the live permission names in a store.
    pub async fn load(store: &dyn PermissionStore) -> AppResult<Self> {
        let registry = Self::new();
        registry.sync(store.list_capability_names().await?).await;
        Ok(registry)
    }

    /// Returns whether a name is registered.
    pub async fn contains(&self, name: &CapabilityName) -> bool {
        self.names.read().await.contains(name)
    }

    /// Adds a name to the registry.
    pub async fn register(&self, name: CapabilityName) {
        self.names.write().await.insert(name);
    }

    /// Removes a name from the registry.
    pub async fn unregister(&self, name: &CapabilityName) {
        self.names.write().await.remove(name);
    }

    /// Replaces the registered set wholesale.
    pub async fn sync(&self, names: Vec<CapabilityName>) {
        *self.names.write().await = names.into_iter().collect();
    }

    /// Returns the registered names, sorted for stable display.
    pub async fn names(&self) -> Vec<CapabilityName> {
        let mut names: Vec<CapabilityName> = self.names.read().await.iter().cloned().collect();
        names.sort_by(|left, right| left.as_str().cmp(right.as_str()));
        names
    }
}
