use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_types::{
    AreaType, AreaTypeId, AreaTypeInput, AssignmentOutcome, AuditStamp, EffectiveWindow,
    OverrideMode, Permission, PermissionId, PermissionInput, PermissionType, PermissionTypeId,
    PermissionTypeInput, Role, RoleId, RoleInput, RolePermission, RolePermissionId, User, UserId,
    UserInput, UserPermission, UserPermissionId, UserRole, UserRoleId,
};
use std::collections::HashSet;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;

use super::dataset::{Dataset, DatasetSummary};
use super::snapshot::Snapshot;
use super::tables::{CatalogRow, Table, Tables};
use super::EntityStore;
use crate::error::{EntityKind, RbacError, RbacResult};

/// Entity store keeping every table behind one lock.
///
/// Writes are applied to a copy of the tables, persisted to the optional
/// snapshot and only then published, so a failed write changes nothing.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    snapshot: Option<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store persisted to the given YAML file, loading it if present.
    pub async fn with_snapshot(path: impl Into<PathBuf>) -> RbacResult<Self> {
        let snapshot = Snapshot::new(path);
        let tables = snapshot.load().await?.unwrap_or_default();
        Ok(Self {
            tables: RwLock::new(tables),
            snapshot: Some(snapshot),
        })
    }

    async fn read<R>(&self, f: impl FnOnce(&Tables) -> R + Send) -> RbacResult<R> {
        let tables = self.tables.read().await;
        Ok(f(&tables))
    }

    async fn mutate<R: Send>(
        &self,
        f: impl FnOnce(&mut Tables) -> RbacResult<R> + Send,
    ) -> RbacResult<R> {
        let mut guard = self.tables.write().await;
        let mut next = guard.clone();
        let result = f(&mut next)?;
        self.publish(&mut guard, next).await?;
        Ok(result)
    }

    async fn publish(&self, current: &mut Tables, next: Tables) -> RbacResult<()> {
        if let Some(snapshot) = &self.snapshot {
            snapshot.save(&next).await?;
        }
        *current = next;
        Ok(())
    }
}

fn require(exists: bool, kind: EntityKind, id: impl Into<i64>) -> RbacResult<()> {
    if exists {
        Ok(())
    } else {
        Err(RbacError::not_found(kind, id))
    }
}

fn check_permission_refs(tables: &Tables, input: &PermissionInput) -> RbacResult<()> {
    require(
        tables.area_types.contains(input.area_type_id.into()),
        EntityKind::AreaType,
        input.area_type_id,
    )?;
    require(
        tables.permission_types.contains(input.permission_type_id.into()),
        EntityKind::PermissionType,
        input.permission_type_id,
    )
}

fn insert_all<T: CatalogRow>(
    table: &mut Table<T>,
    inputs: Vec<T::Input>,
    actor: &str,
    at: DateTime<Utc>,
) -> Vec<T> {
    inputs
        .into_iter()
        .map(|input| table.insert_input(input, actor, at))
        .collect()
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get_user(&self, id: UserId) -> RbacResult<Option<User>> {
        self.read(|t| t.users.get(id.into()).cloned()).await
    }

    async fn list_users(&self) -> RbacResult<Vec<User>> {
        self.read(|t| t.users.values().cloned().collect()).await
    }

    async fn insert_users(
        &self,
        inputs: Vec<UserInput>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<User>> {
        self.mutate(|t| Ok(insert_all(&mut t.users, inputs, actor, at)))
            .await
    }

    async fn update_user(
        &self,
        id: UserId,
        input: UserInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<User>> {
        self.mutate(|t| Ok(t.users.update_input(id, input, actor, at)))
            .await
    }

    async fn delete_user(&self, id: UserId) -> RbacResult<bool> {
        self.mutate(|t| {
            if t.users.remove(id.into()).is_none() {
                return Ok(false);
            }
            let memberships = t.user_roles.retain(|ur| ur.user_id != id);
            let overrides = t.user_permissions.retain(|up| up.user_id != id);
            debug!(
                "Deleted user {} with {} role link(s) and {} override(s)",
                id, memberships, overrides
            );
            Ok(true)
        })
        .await
    }

    async fn get_role(&self, id: RoleId) -> RbacResult<Option<Role>> {
        self.read(|t| t.roles.get(id.into()).cloned()).await
    }

    async fn list_roles(&self) -> RbacResult<Vec<Role>> {
        self.read(|t| t.roles.values().cloned().collect()).await
    }

    async fn insert_roles(
        &self,
        inputs: Vec<RoleInput>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<Role>> {
        self.mutate(|t| Ok(insert_all(&mut t.roles, inputs, actor, at)))
            .await
    }

    async fn update_role(
        &self,
        id: RoleId,
        input: RoleInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<Role>> {
        self.mutate(|t| Ok(t.roles.update_input(id, input, actor, at)))
            .await
    }

    async fn delete_role(&self, id: RoleId) -> RbacResult<bool> {
        self.mutate(|t| {
            if t.roles.remove(id.into()).is_none() {
                return Ok(false);
            }
            let memberships = t.user_roles.retain(|ur| ur.role_id != id);
            let grants = t.role_permissions.retain(|rp| rp.role_id != id);
            debug!(
                "Deleted role {} with {} membership(s) and {} permission link(s)",
                id, memberships, grants
            );
            Ok(true)
        })
        .await
    }

    async fn get_area_type(&self, id: AreaTypeId) -> RbacResult<Option<AreaType>> {
        self.read(|t| t.area_types.get(id.into()).cloned()).await
    }

    async fn find_area_type_by_name(&self, name: &str) -> RbacResult<Option<AreaType>> {
        self.read(|t| t.area_types.find_by_name(name).cloned())
            .await
    }

    async fn ensure_area_type(
        &self,
        name: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<(AreaType, bool)> {
        if let Some(existing) = self.find_area_type_by_name(name).await? {
            return Ok((existing, false));
        }
        self.mutate(|t| Ok(t.area_types.ensure_named(name, actor, at)))
            .await
    }

    async fn list_area_types(&self) -> RbacResult<Vec<AreaType>> {
        self.read(|t| t.area_types.values().cloned().collect())
            .await
    }

    async fn insert_area_types(
        &self,
        inputs: Vec<AreaTypeInput>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<AreaType>> {
        self.mutate(|t| t.area_types.insert_named(inputs, actor, at))
            .await
    }

    async fn update_area_type(
        &self,
        id: AreaTypeId,
        input: AreaTypeInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<AreaType>> {
        self.mutate(|t| t.area_types.update_named(id, input, actor, at))
            .await
    }

    async fn delete_area_type(&self, id: AreaTypeId) -> RbacResult<bool> {
        self.mutate(|t| {
            if !t.area_types.contains(id.into()) {
                return Ok(false);
            }
            let count = t
                .permissions
                .values()
                .filter(|p| p.area_type_id == id)
                .count();
            if count > 0 {
                return Err(RbacError::Referenced {
                    kind: EntityKind::AreaType,
                    id: id.into(),
                    count,
                });
            }
            t.area_types.remove(id.into());
            Ok(true)
        })
        .await
    }

    async fn get_permission_type(
        &self,
        id: PermissionTypeId,
    ) -> RbacResult<Option<PermissionType>> {
        self.read(|t| t.permission_types.get(id.into()).cloned())
            .await
    }

    async fn find_permission_type_by_name(
        &self,
        name: &str,
    ) -> RbacResult<Option<PermissionType>> {
        self.read(|t| t.permission_types.find_by_name(name).cloned())
            .await
    }

    async fn ensure_permission_type(
        &self,
        name: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<(PermissionType, bool)> {
        if let Some(existing) = self.find_permission_type_by_name(name).await? {
            return Ok((existing, false));
        }
        self.mutate(|t| Ok(t.permission_types.ensure_named(name, actor, at)))
            .await
    }

    async fn list_permission_types(&self) -> RbacResult<Vec<PermissionType>> {
        self.read(|t| t.permission_types.values().cloned().collect())
            .await
    }

    async fn insert_permission_types(
        &self,
        inputs: Vec<PermissionTypeInput>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<PermissionType>> {
        self.mutate(|t| t.permission_types.insert_named(inputs, actor, at))
            .await
    }

    async fn update_permission_type(
        &self,
        id: PermissionTypeId,
        input: PermissionTypeInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<PermissionType>> {
        self.mutate(|t| t.permission_types.update_named(id, input, actor, at))
            .await
    }

    async fn delete_permission_type(&self, id: PermissionTypeId) -> RbacResult<bool> {
        self.mutate(|t| {
            if !t.permission_types.contains(id.into()) {
                return Ok(false);
            }
            let count = t
                .permissions
                .values()
                .filter(|p| p.permission_type_id == id)
                .count();
            if count > 0 {
                return Err(RbacError::Referenced {
                    kind: EntityKind::PermissionType,
                    id: id.into(),
                    count,
                });
            }
            t.permission_types.remove(id.into());
            Ok(true)
        })
        .await
    }

    async fn get_permission(&self, id: PermissionId) -> RbacResult<Option<Permission>> {
        self.read(|t| t.permissions.get(id.into()).cloned()).await
    }

    async fn list_permissions(&self) -> RbacResult<Vec<Permission>> {
        self.read(|t| t.permissions.values().cloned().collect())
            .await
    }

    async fn permissions_for_capability(
        &self,
        area_type_id: AreaTypeId,
        permission_type_id: PermissionTypeId,
    ) -> RbacResult<Vec<Permission>> {
        self.read(|t| {
            t.permissions
                .values()
                .filter(|p| p.matches(area_type_id, permission_type_id))
                .cloned()
                .collect()
        })
        .await
    }

    async fn insert_permissions(
        &self,
        inputs: Vec<PermissionInput>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<Permission>> {
        self.mutate(|t| {
            for input in &inputs {
                check_permission_refs(t, input)?;
            }
            Ok(insert_all(&mut t.permissions, inputs, actor, at))
        })
        .await
    }

    async fn update_permission(
        &self,
        id: PermissionId,
        input: PermissionInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<Permission>> {
        self.mutate(|t| {
            if !t.permissions.contains(id.into()) {
                return Ok(None);
            }
            check_permission_refs(t, &input)?;
            Ok(t.permissions.update_input(id, input, actor, at))
        })
        .await
    }

    async fn delete_permission(&self, id: PermissionId) -> RbacResult<bool> {
        self.mutate(|t| {
            if t.permissions.remove(id.into()).is_none() {
                return Ok(false);
            }
            let grants = t.role_permissions.retain(|rp| rp.permission_id != id);
            let overrides = t.user_permissions.retain(|up| up.permission_id != id);
            debug!(
                "Deleted permission {} with {} role link(s) and {} override(s)",
                id, grants, overrides
            );
            Ok(true)
        })
        .await
    }

    async fn user_roles_for_user(&self, user_id: UserId) -> RbacResult<Vec<UserRole>> {
        self.read(|t| {
            t.user_roles
                .values()
                .filter(|ur| ur.user_id == user_id)
                .cloned()
                .collect()
        })
        .await
    }

    async fn insert_user_role_if_absent(
        &self,
        user_id: UserId,
        role_id: RoleId,
        window: EffectiveWindow,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<(UserRole, AssignmentOutcome)> {
        self.mutate(|t| {
            require(t.users.contains(user_id.into()), EntityKind::User, user_id)?;
            require(t.roles.contains(role_id.into()), EntityKind::Role, role_id)?;

            if let Some(existing) = t
                .user_roles
                .values()
                .find(|ur| ur.user_id == user_id && ur.role_id == role_id)
            {
                return Ok((existing.clone(), AssignmentOutcome::Unchanged));
            }

            let row = t.user_roles.insert_with(|id| UserRole {
                id: UserRoleId(id),
                user_id,
                role_id,
                window,
                date_created: at,
                user_created: actor.to_string(),
            });
            Ok((row, AssignmentOutcome::Inserted))
        })
        .await
    }

    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> RbacResult<bool> {
        self.mutate(|t| {
            Ok(t
                .user_roles
                .retain(|ur| !(ur.user_id == user_id && ur.role_id == role_id))
                > 0)
        })
        .await
    }

    async fn role_permissions_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> RbacResult<Vec<RolePermission>> {
        let wanted: HashSet<RoleId> = role_ids.iter().copied().collect();
        self.read(move |t| {
            t.role_permissions
                .values()
                .filter(|rp| wanted.contains(&rp.role_id))
                .cloned()
                .collect()
        })
        .await
    }

    async fn insert_role_permission_if_absent(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<(RolePermission, AssignmentOutcome)> {
        self.mutate(|t| {
            require(t.roles.contains(role_id.into()), EntityKind::Role, role_id)?;
            require(
                t.permissions.contains(permission_id.into()),
                EntityKind::Permission,
                permission_id,
            )?;

            if let Some(existing) = t
                .role_permissions
                .values()
                .find(|rp| rp.role_id == role_id && rp.permission_id == permission_id)
            {
                return Ok((existing.clone(), AssignmentOutcome::Unchanged));
            }

            let row = t.role_permissions.insert_with(|id| RolePermission {
                id: RolePermissionId(id),
                role_id,
                permission_id,
                date_created: at,
                user_created: actor.to_string(),
            });
            Ok((row, AssignmentOutcome::Inserted))
        })
        .await
    }

    async fn delete_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> RbacResult<bool> {
        self.mutate(|t| {
            Ok(t
                .role_permissions
                .retain(|rp| !(rp.role_id == role_id && rp.permission_id == permission_id))
                > 0)
        })
        .await
    }

    async fn user_permissions_for_user(
        &self,
        user_id: UserId,
    ) -> RbacResult<Vec<UserPermission>> {
        self.read(|t| {
            t.user_permissions
                .values()
                .filter(|up| up.user_id == user_id)
                .cloned()
                .collect()
        })
        .await
    }

    async fn upsert_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        mode: OverrideMode,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<(UserPermission, AssignmentOutcome)> {
        self.mutate(|t| {
            require(t.users.contains(user_id.into()), EntityKind::User, user_id)?;
            require(
                t.permissions.contains(permission_id.into()),
                EntityKind::Permission,
                permission_id,
            )?;

            if let Some(existing) = t
                .user_permissions
                .values_mut()
                .find(|up| up.user_id == user_id && up.permission_id == permission_id)
            {
                existing.override_mode = mode;
                existing.audit.touch(actor, at);
                return Ok((existing.clone(), AssignmentOutcome::Updated));
            }

            let row = t.user_permissions.insert_with(|id| UserPermission {
                id: UserPermissionId(id),
                user_id,
                permission_id,
                override_mode: mode,
                audit: AuditStamp::created(actor, at),
            });
            Ok((row, AssignmentOutcome::Inserted))
        })
        .await
    }

    async fn delete_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> RbacResult<bool> {
        self.mutate(|t| {
            Ok(t
                .user_permissions
                .retain(|up| !(up.user_id == user_id && up.permission_id == permission_id))
                > 0)
        })
        .await
    }

    async fn load_dataset_if_empty(
        &self,
        dataset: Dataset,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<DatasetSummary>> {
        let mut guard = self.tables.write().await;
        if !guard.users.is_empty() {
            return Ok(None);
        }
        let mut next = guard.clone();
        let summary = dataset.apply(&mut next, actor, at)?;
        self.publish(&mut guard, next).await?;
        Ok(Some(summary))
    }
}
