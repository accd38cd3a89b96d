//! A batch of rows written as one unit, linked by name instead of id.

use chrono::{DateTime, Utc};
use gatehouse_types::{
    EffectiveWindow, PermissionId, PermissionInput, RoleId, RoleInput, RolePermission,
    RolePermissionId, UserId, UserInput, UserRole, UserRoleId,
};
use std::collections::HashMap;

use super::tables::Tables;
use crate::error::{EntityKind, RbacError, RbacResult};

/// Permission row whose area and permission type are given by name. The
/// instance names the row for `role_permissions`.
#[derive(Debug, Clone)]
pub struct DatasetPermission {
    pub area_type: String,
    pub permission_type: String,
    pub instance: String,
    pub description: Option<String>,
}

impl DatasetPermission {
    pub fn new(area_type: &str, permission_type: &str, instance: &str) -> Self {
        Self {
            area_type: area_type.to_string(),
            permission_type: permission_type.to_string(),
            instance: instance.to_string(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub permissions: Vec<DatasetPermission>,
    pub roles: Vec<RoleInput>,
    pub users: Vec<UserInput>,
    /// (user email, role name), memberships without a window
    pub memberships: Vec<(String, String)>,
    /// (role name, permission instance)
    pub role_permissions: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub users: usize,
    pub roles: usize,
    pub permissions: usize,
}

fn lookup<Id: Copy>(ids: &HashMap<String, Id>, kind: EntityKind, name: &str) -> RbacResult<Id> {
    ids.get(name).copied().ok_or_else(|| {
        RbacError::invalid_input(format!("dataset names unknown {kind} '{name}'"))
    })
}

impl Dataset {
    /// Writes every row into `tables`. Area and permission types are reused
    /// when a row with the same name exists already.
    pub(super) fn apply(
        self,
        tables: &mut Tables,
        actor: &str,
        at: DateTime<Utc>,
    ) -> RbacResult<DatasetSummary> {
        let mut permissions: HashMap<String, PermissionId> = HashMap::new();
        for entry in self.permissions {
            let (area, _) = tables.area_types.ensure_named(&entry.area_type, actor, at);
            let (permission_type, _) = tables
                .permission_types
                .ensure_named(&entry.permission_type, actor, at);

            let mut input = PermissionInput::new(area.id, permission_type.id);
            input.instance = Some(entry.instance.clone());
            input.description = entry.description;
            let row = tables.permissions.insert_input(input, actor, at);
            permissions.insert(entry.instance, row.id);
        }

        let mut roles: HashMap<String, RoleId> = HashMap::new();
        for input in self.roles {
            let row = tables.roles.insert_input(input, actor, at);
            roles.insert(row.name, row.id);
        }

        let mut users: HashMap<String, UserId> = HashMap::new();
        for input in self.users {
            let row = tables.users.insert_input(input, actor, at);
            users.insert(row.email, row.id);
        }

        for (email, role) in &self.memberships {
            let user_id = lookup(&users, EntityKind::User, email)?;
            let role_id = lookup(&roles, EntityKind::Role, role)?;
            if tables
                .user_roles
                .values()
                .any(|ur| ur.user_id == user_id && ur.role_id == role_id)
            {
                continue;
            }
            tables.user_roles.insert_with(|id| UserRole {
                id: UserRoleId(id),
                user_id,
                role_id,
                window: EffectiveWindow::unbounded(),
                date_created: at,
                user_created: actor.to_string(),
            });
        }

        for (role, instance) in &self.role_permissions {
            let role_id = lookup(&roles, EntityKind::Role, role)?;
            let permission_id = lookup(&permissions, EntityKind::Permission, instance)?;
            if tables
                .role_permissions
                .values()
                .any(|rp| rp.role_id == role_id && rp.permission_id == permission_id)
            {
                continue;
            }
            tables.role_permissions.insert_with(|id| RolePermission {
                id: RolePermissionId(id),
                role_id,
                permission_id,
                date_created: at,
                user_created: actor.to_string(),
            });
        }

        Ok(DatasetSummary {
            users: users.len(),
            roles: roles.len(),
            permissions: permissions.len(),
        })
    }
}
