//! Durable keyed storage for catalog and link rows.
//!
//! Every method is one atomic unit of work: existence checks, pair
//! uniqueness, upserts and delete cascades happen inside the same call, so
//! callers never need a check-then-act sequence of their own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_types::{
    AreaType, AreaTypeId, AreaTypeInput, AssignmentOutcome, EffectiveWindow, OverrideMode,
    Permission, PermissionId, PermissionInput, PermissionType, PermissionTypeId,
    PermissionTypeInput, Role, RoleId, RoleInput, RolePermission, User, UserId, UserInput,
    UserPermission, UserRole,
};
use std::fmt;
use std::sync::Arc;

use crate::error::RbacResult;

mod dataset;
mod memory;
mod snapshot;
mod tables;

#[cfg(test)]
mod tests;

pub use dataset::{Dataset, DatasetPermission, DatasetSummary};
pub use memory::MemoryStore;
pub use snapshot::Snapshot;
pub use tables::{Table, Tables};

pub type SharedStore = Arc<dyn EntityStore>;

#[async_trait]
pub trait EntityStore: Send + Sync + fmt::Debug {
    // Users
    async fn get_user(&self, id: UserId) -> RbacResult<Option<User>>;
    async fn list_users(&self) -> RbacResult<Vec<User>>;
    async fn insert_users(
        &self,
        inputs: Vec<UserInput>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<User>>;
    async fn update_user(
        &self,
        id: UserId,
        input: UserInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<User>>;
    /// Removes the user together with its role memberships and overrides.
    async fn delete_user(&self, id: UserId) -> RbacResult<bool>;

    // Roles
    async fn get_role(&self, id: RoleId) -> RbacResult<Option<Role>>;
    async fn list_roles(&self) -> RbacResult<Vec<Role>>;
    async fn insert_roles(
        &self,
        inputs: Vec<RoleInput>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<Role>>;
    async fn update_role(
        &self,
        id: RoleId,
        input: RoleInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<Role>>;
    /// Removes the role together with its memberships and permission links.
    async fn delete_role(&self, id: RoleId) -> RbacResult<bool>;

    // Area types
    async fn get_area_type(&self, id: AreaTypeId) -> RbacResult<Option<AreaType>>;
    async fn find_area_type_by_name(&self, name: &str) -> RbacResult<Option<AreaType>>;
    /// Find-or-insert by name; the flag is `true` when the row was created.
    async fn ensure_area_type(
        &self,
        name: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<(AreaType, bool)>;
    async fn list_area_types(&self) -> RbacResult<Vec<AreaType>>;
    /// Fails with `Duplicate` if a name is already taken.
    async fn insert_area_types(
        &self,
        inputs: Vec<AreaTypeInput>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<AreaType>>;
    async fn update_area_type(
        &self,
        id: AreaTypeId,
        input: AreaTypeInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<AreaType>>;
    /// Fails with `Referenced` while any permission points at the area type.
    async fn delete_area_type(&self, id: AreaTypeId) -> RbacResult<bool>;

    // Permission types
    async fn get_permission_type(&self, id: PermissionTypeId)
        -> RbacResult<Option<PermissionType>>;
    async fn find_permission_type_by_name(&self, name: &str)
        -> RbacResult<Option<PermissionType>>;
    /// Find-or-insert by name; the flag is `true` when the row was created.
    async fn ensure_permission_type(
        &self,
        name: &str,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<(PermissionType, bool)>;
    async fn list_permission_types(&self) -> RbacResult<Vec<PermissionType>>;
    /// Fails with `Duplicate` if a name is already taken.
    async fn insert_permission_types(
        &self,
        inputs: Vec<PermissionTypeInput>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<PermissionType>>;
    async fn update_permission_type(
        &self,
        id: PermissionTypeId,
        input: PermissionTypeInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<PermissionType>>;
    /// Fails with `Referenced` while any permission points at the permission type.
    async fn delete_permission_type(&self, id: PermissionTypeId) -> RbacResult<bool>;

    // Permissions
    async fn get_permission(&self, id: PermissionId) -> RbacResult<Option<Permission>>;
    async fn list_permissions(&self) -> RbacResult<Vec<Permission>>;
    /// All permission rows describing the given capability pair.
    async fn permissions_for_capability(
        &self,
        area_type_id: AreaTypeId,
        permission_type_id: PermissionTypeId,
    ) -> RbacResult<Vec<Permission>>;
    /// Fails with `NotFound` if a referenced area or permission type is missing.
    async fn insert_permissions(
        &self,
        inputs: Vec<PermissionInput>,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<Permission>>;
    async fn update_permission(
        &self,
        id: PermissionId,
        input: PermissionInput,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<Permission>>;
    /// Removes the permission together with its role links and overrides.
    async fn delete_permission(&self, id: PermissionId) -> RbacResult<bool>;

    // User roles
    async fn user_roles_for_user(&self, user_id: UserId) -> RbacResult<Vec<UserRole>>;
    /// Inserts the membership unless the pair already exists.
    async fn insert_user_role_if_absent(
        &self,
        user_id: UserId,
        role_id: RoleId,
        window: EffectiveWindow,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<(UserRole, AssignmentOutcome)>;
    async fn delete_user_role(&self, user_id: UserId, role_id: RoleId) -> RbacResult<bool>;

    // Role permissions
    async fn role_permissions_for_roles(
        &self,
        role_ids: &[RoleId],
    ) -> RbacResult<Vec<RolePermission>>;
    /// Inserts the link unless the pair already exists.
    async fn insert_role_permission_if_absent(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<(RolePermission, AssignmentOutcome)>;
    async fn delete_role_permission(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> RbacResult<bool>;

    // User permission overrides
    async fn user_permissions_for_user(&self, user_id: UserId)
        -> RbacResult<Vec<UserPermission>>;
    /// Inserts the override or overwrites the mode of the existing row for the pair.
    async fn upsert_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        mode: OverrideMode,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<(UserPermission, AssignmentOutcome)>;
    async fn delete_user_permission(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
    ) -> RbacResult<bool>;

    /// Writes the whole dataset in one step if the store has no users yet.
    /// Returns `None` when there were users and nothing was written.
    async fn load_dataset_if_empty(
        &self,
        dataset: Dataset,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<Option<DatasetSummary>>;
}
