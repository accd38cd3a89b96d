use chrono::{DateTime, Utc};
use gatehouse_types::{
    AssignmentOutcome, EffectiveWindow, OverrideMode, PermissionId, RoleId, RolePermission,
    UserId, UserPermission, UserRole,
};
use tracing::info;

use crate::error::RbacResult;
use crate::store::SharedStore;
use crate::validation::{parse_override_mode, validate_actor, validate_window};

/// Idempotent bookkeeping of role memberships, role permissions and
/// per-user overrides.
///
/// Nothing here looks at whether a user is active; that gate belongs to the
/// resolver only, so roles can be prepared for users that are not yet active.
#[derive(Debug, Clone)]
pub struct AssignmentManager {
    store: SharedStore,
}

fn removal(removed: bool) -> AssignmentOutcome {
    if removed {
        AssignmentOutcome::Removed
    } else {
        AssignmentOutcome::Absent
    }
}

impl AssignmentManager {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Adds the membership unless it already exists. Creation metadata is only
    /// written on an actual insert; an existing membership keeps its window.
    pub async fn assign_role_to_user(
        &self,
        user_id: UserId,
        role_id: RoleId,
        actor: &str,
        effective_from: Option<DateTime<Utc>>,
        effective_through: Option<DateTime<Utc>>,
    ) -> RbacResult<AssignmentOutcome> {
        validate_actor(actor)?;
        let window = EffectiveWindow::between(effective_from, effective_through);
        validate_window(&window)?;

        let (_, outcome) = self
            .store
            .insert_user_role_if_absent(user_id, role_id, window, actor, Utc::now())
            .await?;
        if outcome.changed() {
            info!("{} assigned role {} to user {}", actor, role_id, user_id);
        }
        Ok(outcome)
    }

    pub async fn remove_role_from_user(
        &self,
        user_id: UserId,
        role_id: RoleId,
        actor: &str,
    ) -> RbacResult<AssignmentOutcome> {
        validate_actor(actor)?;
        let outcome = removal(self.store.delete_user_role(user_id, role_id).await?);
        if outcome.changed() {
            info!("{} removed role {} from user {}", actor, role_id, user_id);
        }
        Ok(outcome)
    }

    pub async fn assign_permission_to_role(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        actor: &str,
    ) -> RbacResult<AssignmentOutcome> {
        validate_actor(actor)?;
        let (_, outcome) = self
            .store
            .insert_role_permission_if_absent(role_id, permission_id, actor, Utc::now())
            .await?;
        if outcome.changed() {
            info!(
                "{} assigned permission {} to role {}",
                actor, permission_id, role_id
            );
        }
        Ok(outcome)
    }

    pub async fn remove_permission_from_role(
        &self,
        role_id: RoleId,
        permission_id: PermissionId,
        actor: &str,
    ) -> RbacResult<AssignmentOutcome> {
        validate_actor(actor)?;
        let outcome = removal(
            self.store
                .delete_role_permission(role_id, permission_id)
                .await?,
        );
        if outcome.changed() {
            info!(
                "{} removed permission {} from role {}",
                actor, permission_id, role_id
            );
        }
        Ok(outcome)
    }

    pub async fn grant_permission_to_user(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        actor: &str,
    ) -> RbacResult<AssignmentOutcome> {
        self.upsert_override(user_id, permission_id, OverrideMode::Grant, actor)
            .await
    }

    pub async fn deny_permission_to_user(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        actor: &str,
    ) -> RbacResult<AssignmentOutcome> {
        self.upsert_override(user_id, permission_id, OverrideMode::Deny, actor)
            .await
    }

    /// Generic entry point taking the mode as text. Anything other than
    /// GRANT or DENY fails before the store is touched.
    pub async fn set_user_permission_override(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        mode: &str,
        actor: &str,
    ) -> RbacResult<AssignmentOutcome> {
        let mode = parse_override_mode(mode)?;
        self.upsert_override(user_id, permission_id, mode, actor)
            .await
    }

    pub async fn remove_user_permission_override(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        actor: &str,
    ) -> RbacResult<AssignmentOutcome> {
        validate_actor(actor)?;
        let outcome = removal(
            self.store
                .delete_user_permission(user_id, permission_id)
                .await?,
        );
        if outcome.changed() {
            info!(
                "{} removed override on permission {} for user {}",
                actor, permission_id, user_id
            );
        }
        Ok(outcome)
    }

    async fn upsert_override(
        &self,
        user_id: UserId,
        permission_id: PermissionId,
        mode: OverrideMode,
        actor: &str,
    ) -> RbacResult<AssignmentOutcome> {
        validate_actor(actor)?;
        let (_, outcome) = self
            .store
            .upsert_user_permission(user_id, permission_id, mode, actor, Utc::now())
            .await?;
        info!(
            "{} set {} override on permission {} for user {} ({:?})",
            actor, mode, permission_id, user_id, outcome
        );
        Ok(outcome)
    }

    pub async fn roles_for_user(&self, user_id: UserId) -> RbacResult<Vec<UserRole>> {
        self.store.user_roles_for_user(user_id).await
    }

    pub async fn permissions_for_role(&self, role_id: RoleId) -> RbacResult<Vec<RolePermission>> {
        self.store.role_permissions_for_roles(&[role_id]).await
    }

    pub async fn overrides_for_user(&self, user_id: UserId) -> RbacResult<Vec<UserPermission>> {
        self.store.user_permissions_for_user(user_id).await
    }
}
