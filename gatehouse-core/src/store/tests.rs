use super::{Dataset, DatasetPermission, EntityStore, MemoryStore, SharedStore};
use crate::assignment::AssignmentManager;
use crate::error::{EntityKind, RbacError};
use chrono::Utc;
use gatehouse_types::{
    AreaTypeInput, AssignmentOutcome, EffectiveWindow, OverrideMode, PermissionId,
    PermissionInput, PermissionTypeId, PermissionTypeInput, RoleId, RoleInput, UserId, UserInput,
};
use std::sync::Arc;
use tempfile::tempdir;

const ACTOR: &str = "store-test";

/// Store with one user, one role and one Documents/Read permission.
async fn populated_store(store: &MemoryStore) -> (i64, i64, i64) {
    let now = Utc::now();
    let users = store
        .insert_users(vec![UserInput::new("alice@example.com")], ACTOR, now)
        .await
        .unwrap();
    let roles = store
        .insert_roles(vec![RoleInput::new("Reader")], ACTOR, now)
        .await
        .unwrap();
    let areas = store
        .insert_area_types(
            vec![AreaTypeInput {
                name: "Documents".into(),
            }],
            ACTOR,
            now,
        )
        .await
        .unwrap();
    let types = store
        .insert_permission_types(
            vec![PermissionTypeInput {
                name: "Read".into(),
            }],
            ACTOR,
            now,
        )
        .await
        .unwrap();
    let permissions = store
        .insert_permissions(
            vec![PermissionInput::new(areas[0].id, types[0].id)],
            ACTOR,
            now,
        )
        .await
        .unwrap();

    (
        users[0].id.value(),
        roles[0].id.value(),
        permissions[0].id.value(),
    )
}

#[tokio::test]
async fn test_ids_are_assigned_sequentially() {
    let store = MemoryStore::new();
    let users = store
        .insert_users(
            vec![
                UserInput::new("a@example.com"),
                UserInput::new("b@example.com"),
                UserInput::new("c@example.com"),
            ],
            ACTOR,
            Utc::now(),
        )
        .await
        .unwrap();

    let ids: Vec<i64> = users.iter().map(|u| u.id.value()).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    // Deleted ids are never reused
    assert!(store.delete_user(UserId(3)).await.unwrap());
    let next = store
        .insert_users(vec![UserInput::new("d@example.com")], ACTOR, Utc::now())
        .await
        .unwrap();
    assert_eq!(next[0].id.value(), 4);
}

#[tokio::test]
async fn test_update_keeps_creation_stamp() {
    let store = MemoryStore::new();
    let (user_id, _, _) = populated_store(&store).await;
    let before = store.get_user(user_id.into()).await.unwrap().unwrap();

    let updated = store
        .update_user(
            user_id.into(),
            UserInput::new("alice@example.org").inactive(),
            "admin",
            Utc::now(),
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.email, "alice@example.org");
    assert!(!updated.is_active);
    assert_eq!(updated.audit.date_created, before.audit.date_created);
    assert_eq!(updated.audit.user_created, ACTOR);
    assert_eq!(updated.audit.user_updated.as_deref(), Some("admin"));
    assert!(updated.audit.date_updated.is_some());
}

#[tokio::test]
async fn test_update_and_delete_of_missing_rows() {
    let store = MemoryStore::new();
    let updated = store
        .update_role(RoleId(99), RoleInput::new("Ghost"), ACTOR, Utc::now())
        .await
        .unwrap();
    assert!(updated.is_none());
    assert!(!store.delete_role(RoleId(99)).await.unwrap());
}

#[tokio::test]
async fn test_user_role_insert_is_idempotent() {
    let store = MemoryStore::new();
    let (user_id, role_id, _) = populated_store(&store).await;

    let (first, outcome) = store
        .insert_user_role_if_absent(
            user_id.into(),
            role_id.into(),
            EffectiveWindow::unbounded(),
            ACTOR,
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, AssignmentOutcome::Inserted);

    let (second, outcome) = store
        .insert_user_role_if_absent(
            user_id.into(),
            role_id.into(),
            EffectiveWindow::unbounded(),
            "someone-else",
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, AssignmentOutcome::Unchanged);
    assert_eq!(first, second);
    assert_eq!(second.user_created, ACTOR);

    let links = store.user_roles_for_user(user_id.into()).await.unwrap();
    assert_eq!(links.len(), 1);
}

#[tokio::test]
async fn test_override_upsert_keeps_single_row() {
    let store = MemoryStore::new();
    let (user_id, _, permission_id) = populated_store(&store).await;

    let (granted, outcome) = store
        .upsert_user_permission(
            user_id.into(),
            permission_id.into(),
            OverrideMode::Grant,
            ACTOR,
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, AssignmentOutcome::Inserted);
    assert!(granted.audit.date_updated.is_none());

    let (denied, outcome) = store
        .upsert_user_permission(
            user_id.into(),
            permission_id.into(),
            OverrideMode::Deny,
            "admin",
            Utc::now(),
        )
        .await
        .unwrap();
    assert_eq!(outcome, AssignmentOutcome::Updated);
    assert_eq!(denied.id, granted.id);
    assert_eq!(denied.override_mode, OverrideMode::Deny);
    assert!(denied.audit.date_updated.is_some());

    let overrides = store
        .user_permissions_for_user(user_id.into())
        .await
        .unwrap();
    assert_eq!(overrides.len(), 1);
    assert_eq!(overrides[0].override_mode, OverrideMode::Deny);
}

#[tokio::test]
async fn test_links_to_missing_rows_are_rejected() {
    let store = MemoryStore::new();
    let (user_id, role_id, permission_id) = populated_store(&store).await;

    let err = store
        .insert_user_role_if_absent(
            user_id.into(),
            RoleId(42),
            EffectiveWindow::unbounded(),
            ACTOR,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RbacError::NotFound {
            kind: EntityKind::Role,
            id: 42
        }
    ));

    let err = store
        .insert_role_permission_if_absent(role_id.into(), PermissionId(42), ACTOR, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RbacError::NotFound {
            kind: EntityKind::Permission,
            ..
        }
    ));

    let err = store
        .upsert_user_permission(
            UserId(7),
            permission_id.into(),
            OverrideMode::Grant,
            ACTOR,
            Utc::now(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RbacError::NotFound {
            kind: EntityKind::User,
            ..
        }
    ));
    assert!(store.user_roles_for_user(user_id.into()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_bulk_permission_insert_is_all_or_nothing() {
    let store = MemoryStore::new();
    let (_, _, permission_id) = populated_store(&store).await;
    let existing = store
        .get_permission(permission_id.into())
        .await
        .unwrap()
        .unwrap();

    let err = store
        .insert_permissions(
            vec![
                PermissionInput::new(existing.area_type_id, existing.permission_type_id),
                PermissionInput::new(existing.area_type_id, PermissionTypeId(77)),
            ],
            ACTOR,
            Utc::now(),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RbacError::NotFound {
            kind: EntityKind::PermissionType,
            id: 77
        }
    ));
    assert_eq!(store.list_permissions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_deleting_user_cascades_links() {
    let store = MemoryStore::new();
    let (user_id, role_id, permission_id) = populated_store(&store).await;
    let now = Utc::now();

    store
        .insert_user_role_if_absent(
            user_id.into(),
            role_id.into(),
            EffectiveWindow::unbounded(),
            ACTOR,
            now,
        )
        .await
        .unwrap();
    store
        .upsert_user_permission(
            user_id.into(),
            permission_id.into(),
            OverrideMode::Grant,
            ACTOR,
            now,
        )
        .await
        .unwrap();

    assert!(store.delete_user(user_id.into()).await.unwrap());
    assert!(store.user_roles_for_user(user_id.into()).await.unwrap().is_empty());
    assert!(store
        .user_permissions_for_user(user_id.into())
        .await
        .unwrap()
        .is_empty());
    // The role itself is untouched
    assert!(store.get_role(role_id.into()).await.unwrap().is_some());
}

#[tokio::test]
async fn test_deleting_role_and_permission_cascades_links() {
    let store = MemoryStore::new();
    let (user_id, role_id, permission_id) = populated_store(&store).await;
    let now = Utc::now();

    store
        .insert_user_role_if_absent(
            user_id.into(),
            role_id.into(),
            EffectiveWindow::unbounded(),
            ACTOR,
            now,
        )
        .await
        .unwrap();
    store
        .insert_role_permission_if_absent(role_id.into(), permission_id.into(), ACTOR, now)
        .await
        .unwrap();
    store
        .upsert_user_permission(
            user_id.into(),
            permission_id.into(),
            OverrideMode::Deny,
            ACTOR,
            now,
        )
        .await
        .unwrap();

    assert!(store.delete_permission(permission_id.into()).await.unwrap());
    assert!(store
        .role_permissions_for_roles(&[role_id.into()])
        .await
        .unwrap()
        .is_empty());
    assert!(store
        .user_permissions_for_user(user_id.into())
        .await
        .unwrap()
        .is_empty());

    assert!(store.delete_role(role_id.into()).await.unwrap());
    assert!(store.user_roles_for_user(user_id.into()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_referenced_catalog_rows_cannot_be_deleted() {
    let store = MemoryStore::new();
    let (_, _, permission_id) = populated_store(&store).await;
    let permission = store
        .get_permission(permission_id.into())
        .await
        .unwrap()
        .unwrap();

    let err = store
        .delete_area_type(permission.area_type_id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RbacError::Referenced {
            kind: EntityKind::AreaType,
            count: 1,
            ..
        }
    ));
    let err = store
        .delete_permission_type(permission.permission_type_id)
        .await
        .unwrap_err();
    assert!(matches!(err, RbacError::Referenced { .. }));

    // Once the permission is gone the catalog rows can go too
    store.delete_permission(permission_id.into()).await.unwrap();
    assert!(store
        .delete_area_type(permission.area_type_id)
        .await
        .unwrap());
    assert!(store
        .delete_permission_type(permission.permission_type_id)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_snapshot_round_trip() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("state").join("gatehouse.yaml");

    let (user_id, role_id, permission_id) = {
        let store = MemoryStore::with_snapshot(&path).await.unwrap();
        let ids = populated_store(&store).await;
        store
            .insert_user_role_if_absent(
                ids.0.into(),
                ids.1.into(),
                EffectiveWindow::between(Some(Utc::now()), None),
                ACTOR,
                Utc::now(),
            )
            .await
            .unwrap();
        store
            .upsert_user_permission(
                ids.0.into(),
                ids.2.into(),
                OverrideMode::Deny,
                ACTOR,
                Utc::now(),
            )
            .await
            .unwrap();
        ids
    };
    assert!(path.exists());

    let reloaded = MemoryStore::with_snapshot(&path).await.unwrap();
    let user = reloaded.get_user(user_id.into()).await.unwrap().unwrap();
    assert_eq!(user.email, "alice@example.com");

    let memberships = reloaded.user_roles_for_user(user_id.into()).await.unwrap();
    assert_eq!(memberships.len(), 1);
    assert_eq!(memberships[0].role_id.value(), role_id);
    assert!(memberships[0].window.effective_from.is_some());

    let overrides = reloaded
        .user_permissions_for_user(user_id.into())
        .await
        .unwrap();
    assert_eq!(overrides[0].permission_id.value(), permission_id);
    assert_eq!(overrides[0].override_mode, OverrideMode::Deny);

    // The id sequence survives the reload
    let more = reloaded
        .insert_users(vec![UserInput::new("bob@example.com")], ACTOR, Utc::now())
        .await
        .unwrap();
    assert_eq!(more[0].id.value(), user_id + 1);
}

#[tokio::test]
async fn test_missing_snapshot_starts_empty() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let store = MemoryStore::with_snapshot(temp_dir.path().join("absent.yaml"))
        .await
        .unwrap();
    assert!(store.list_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_corrupt_snapshot_is_a_persistence_error() {
    let temp_dir = tempdir().expect("Failed to create temp dir");
    let path = temp_dir.path().join("broken.yaml");
    tokio::fs::write(&path, "users: [this is: not a table")
        .await
        .unwrap();

    let err = MemoryStore::with_snapshot(&path).await.unwrap_err();
    assert!(matches!(err, RbacError::Persistence { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_on_one_pair_leave_one_row() {
    let store = Arc::new(MemoryStore::new());
    let (user_id, role_id, permission_id) = populated_store(&store).await;
    let shared: SharedStore = store.clone();
    let assignments = AssignmentManager::new(shared);
    let (user_id, role_id, permission_id) = (
        UserId(user_id),
        RoleId(role_id),
        PermissionId(permission_id),
    );

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let assignments = assignments.clone();
            tokio::spawn(async move {
                let actor = format!("writer-{i}");
                assignments
                    .assign_role_to_user(user_id, role_id, &actor, None, None)
                    .await?;
                let mode = if i % 2 == 0 {
                    assignments
                        .grant_permission_to_user(user_id, permission_id, &actor)
                        .await?;
                    OverrideMode::Grant
                } else {
                    assignments
                        .deny_permission_to_user(user_id, permission_id, &actor)
                        .await?;
                    OverrideMode::Deny
                };
                Ok::<_, RbacError>((actor, mode))
            })
        })
        .collect();

    let mut written = Vec::new();
    for handle in handles {
        written.push(handle.await.unwrap().unwrap());
    }

    let memberships = store.user_roles_for_user(user_id).await.unwrap();
    assert_eq!(memberships.len(), 1);

    let overrides = store.user_permissions_for_user(user_id).await.unwrap();
    assert_eq!(overrides.len(), 1);
    let last_writer = overrides[0]
        .audit
        .user_updated
        .clone()
        .unwrap_or_else(|| overrides[0].audit.user_created.clone());
    // The surviving mode is the one written by whoever wrote last
    assert!(written
        .iter()
        .any(|(actor, mode)| *actor == last_writer && *mode == overrides[0].override_mode));
}

#[tokio::test]
async fn test_dataset_with_unknown_link_writes_nothing() {
    let store = MemoryStore::new();
    let dataset = Dataset {
        permissions: vec![DatasetPermission::new("Documents", "Read", "documents_read")],
        roles: vec![RoleInput::new("Reader")],
        users: vec![UserInput::new("alice@example.com")],
        memberships: vec![("alice@example.com".into(), "Writer".into())],
        ..Default::default()
    };
    let err = store
        .load_dataset_if_empty(dataset, ACTOR, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, RbacError::InvalidInput(_)));
    assert!(store.list_users().await.unwrap().is_empty());
    assert!(store.list_area_types().await.unwrap().is_empty());
    assert!(store.list_permissions().await.unwrap().is_empty());

    // A store with users is left alone
    populated_store(&store).await;
    let loaded = store
        .load_dataset_if_empty(Dataset::default(), ACTOR, Utc::now())
        .await
        .unwrap();
    assert_eq!(loaded, None);
}
