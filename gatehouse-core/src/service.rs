use gatehouse_types::{Capability, UserId};
use std::sync::Arc;
use tracing::info;

use crate::assignment::AssignmentManager;
use crate::catalog::Catalog;
use crate::error::{RbacError, RbacResult};
use crate::resolver::PermissionResolver;
use crate::seed::seed_demo_data;
use crate::settings::store::StoreSettings;
use crate::store::{MemoryStore, SharedStore};

/// Entry point bundling catalog, assignment and resolver over one store.
#[derive(Debug, Clone)]
pub struct AuthorizationService {
    store: SharedStore,
    catalog: Catalog,
    assignments: AssignmentManager,
    resolver: PermissionResolver,
}

impl AuthorizationService {
    pub fn new(store: SharedStore) -> Self {
        Self {
            catalog: Catalog::new(store.clone()),
            assignments: AssignmentManager::new(store.clone()),
            resolver: PermissionResolver::new(store.clone()),
            store,
        }
    }

    /// Opens the configured store and loads the demo dataset if requested.
    pub async fn from_settings(settings: &StoreSettings) -> RbacResult<Self> {
        let store: SharedStore = match &settings.snapshot_path {
            Some(path) => Arc::new(MemoryStore::with_snapshot(path).await?),
            None => Arc::new(MemoryStore::new()),
        };

        if settings.seed_demo_data {
            let actor = settings.seed_actor.as_deref().ok_or_else(|| {
                RbacError::invalid_input("store.seed_actor must be set to seed demo data")
            })?;
            seed_demo_data(&store, actor).await?;
        }

        info!(
            "Authorization service initialized ({})",
            settings
                .snapshot_path
                .as_deref()
                .map(|p| format!("snapshot at {p}"))
                .unwrap_or_else(|| "in memory".to_string())
        );
        Ok(Self::new(store))
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn assignments(&self) -> &AssignmentManager {
        &self.assignments
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    pub async fn has_permission(&self, user_id: UserId, capability: &Capability) -> RbacResult<bool> {
        self.resolver.has_permission(user_id, capability).await
    }
}
