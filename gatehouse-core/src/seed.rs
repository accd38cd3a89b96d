//! Small demonstration dataset: two areas, read/write permission types, two
//! roles and one user per role.

use chrono::Utc;
use gatehouse_types::{RoleInput, UserInput};
use tracing::info;

use crate::error::RbacResult;
use crate::store::{Dataset, DatasetPermission, SharedStore};
use crate::validation::{validate_actor, validate_role, validate_user};

fn demo_dataset() -> Dataset {
    let link = |a: &str, b: &str| (a.to_string(), b.to_string());
    Dataset {
        permissions: vec![
            DatasetPermission::new("ODAG", "Read", "ODAG_read"),
            DatasetPermission::new("ODAG", "Write", "ODAG_write"),
            DatasetPermission::new("Documents", "Read", "Documents_read"),
        ],
        roles: vec![RoleInput::new("ODAG_Admin"), RoleInput::new("Document_Read")],
        users: vec![
            UserInput::new("Alice.Smith@test.com").with_name("Alice", "Smith"),
            UserInput::new("Bob.Jones@test.com").with_name("Bob", "Jones"),
        ],
        memberships: vec![
            link("Alice.Smith@test.com", "ODAG_Admin"),
            link("Bob.Jones@test.com", "Document_Read"),
        ],
        role_permissions: vec![
            link("ODAG_Admin", "ODAG_read"),
            link("ODAG_Admin", "ODAG_write"),
            link("Document_Read", "Documents_read"),
        ],
    }
}

/// Loads the demo dataset into an empty store as a single write, so a
/// failure leaves nothing behind. Returns `false` without touching anything
/// when the store already has users.
pub async fn seed_demo_data(store: &SharedStore, actor: &str) -> RbacResult<bool> {
    validate_actor(actor)?;
    let dataset = demo_dataset();
    for input in &dataset.users {
        validate_user(input)?;
    }
    for input in &dataset.roles {
        validate_role(input)?;
    }

    match store
        .load_dataset_if_empty(dataset, actor, Utc::now())
        .await?
    {
        Some(summary) => {
            info!(
                "Seeded demo data: {} users, {} roles, {} permissions",
                summary.users, summary.roles, summary.permissions
            );
            Ok(true)
        }
        None => {
            info!("Store already contains users, skipping demo data");
            Ok(false)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::RbacError;
    use crate::resolver::PermissionResolver;
    use crate::store::{EntityStore, MemoryStore};
    use gatehouse_types::Capability;
    use std::sync::Arc;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_seeds_only_once() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        assert!(seed_demo_data(&store, "bootstrap").await.unwrap());
        assert!(!seed_demo_data(&store, "bootstrap").await.unwrap());

        assert_eq!(store.list_users().await.unwrap().len(), 2);
        assert_eq!(store.list_roles().await.unwrap().len(), 2);
        assert_eq!(store.list_permissions().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_seeded_decisions() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        seed_demo_data(&store, "bootstrap").await.unwrap();
        let resolver = PermissionResolver::new(store.clone());

        let users = store.list_users().await.unwrap();
        let alice = users.iter().find(|u| u.email.starts_with("Alice")).unwrap();
        let bob = users.iter().find(|u| u.email.starts_with("Bob")).unwrap();

        let odag_write = Capability::named("ODAG", "Write");
        let documents_read = Capability::named("Documents", "Read");

        assert!(resolver.has_permission(alice.id, &odag_write).await.unwrap());
        assert!(!resolver.has_permission(alice.id, &documents_read).await.unwrap());
        assert!(!resolver.has_permission(bob.id, &odag_write).await.unwrap());
        assert!(resolver.has_permission(bob.id, &documents_read).await.unwrap());
        assert_eq!(alice.audit.user_created, "bootstrap");
    }

    #[tokio::test]
    async fn test_requires_actor() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        assert!(seed_demo_data(&store, "").await.is_err());
        assert!(store.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_seed_leaves_no_rows_and_can_be_retried() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("gatehouse.yaml");
        let store: SharedStore = Arc::new(MemoryStore::with_snapshot(&path).await.unwrap());

        // A directory in place of the snapshot file makes the save fail
        tokio::fs::create_dir(&path).await.unwrap();
        let err = seed_demo_data(&store, "bootstrap").await.unwrap_err();
        assert!(matches!(err, RbacError::Persistence { .. }));
        assert!(store.list_users().await.unwrap().is_empty());
        assert!(store.list_roles().await.unwrap().is_empty());
        assert!(store.list_permissions().await.unwrap().is_empty());
        assert!(store.list_area_types().await.unwrap().is_empty());

        tokio::fs::remove_dir(&path).await.unwrap();
        assert!(seed_demo_data(&store, "bootstrap").await.unwrap());
        assert!(!seed_demo_data(&store, "bootstrap").await.unwrap());
        assert_eq!(store.list_users().await.unwrap().len(), 2);
        assert_eq!(store.list_roles().await.unwrap().len(), 2);
        assert_eq!(store.list_permissions().await.unwrap().len(), 3);
        assert_eq!(store.list_area_types().await.unwrap().len(), 2);

        let reloaded = MemoryStore::with_snapshot(&path).await.unwrap();
        let users = reloaded.list_users().await.unwrap();
        assert_eq!(users.len(), 2);
        for user in users {
            assert_eq!(reloaded.user_roles_for_user(user.id).await.unwrap().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_seed_reuses_existing_catalog_names() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let catalog = Catalog::new(store.clone());
        let odag = catalog.ensure_area_type("ODAG", "admin").await.unwrap();

        assert!(seed_demo_data(&store, "bootstrap").await.unwrap());
        let areas = store.list_area_types().await.unwrap();
        assert_eq!(areas.len(), 2);
        let permissions = store.list_permissions().await.unwrap();
        assert_eq!(
            permissions
                .iter()
                .filter(|p| p.area_type_id == odag.id)
                .count(),
            2
        );
    }
}
