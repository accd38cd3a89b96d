use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{
    AreaTypeId, PermissionId, PermissionTypeId, RoleId, RolePermissionId, UserId,
    UserPermissionId, UserRoleId,
};
use crate::override_mode::OverrideMode;

fn default_true() -> bool {
    true
}

/// Creation and modification metadata carried by catalog rows.
///
/// The actor is always supplied by the caller, there is no implicit default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct AuditStamp {
    pub date_created: DateTime<Utc>,
    pub user_created: String,
    #[serde(default)]
    pub date_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user_updated: Option<String>,
}

impl AuditStamp {
    pub fn created(actor: &str, at: DateTime<Utc>) -> Self {
        Self {
            date_created: at,
            user_created: actor.to_string(),
            date_updated: None,
            user_updated: None,
        }
    }

    /// Marks the row as modified, keeping the creation stamp untouched.
    pub fn touch(&mut self, actor: &str, at: DateTime<Utc>) {
        self.date_updated = Some(at);
        self.user_updated = Some(actor.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct User {
    pub id: UserId,
    /// Identifier in an external directory, if the user was provisioned from one
    #[serde(default)]
    pub oid: Option<String>,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub is_retired: bool,
    #[serde(flatten)]
    pub audit: AuditStamp,
}

impl User {
    /// A user may hold permissions only while active and not retired.
    pub fn is_enabled(&self) -> bool {
        self.is_active && !self.is_retired
    }

    pub fn display_name(&self) -> String {
        match (&self.first_name, &self.last_name) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.clone(),
            (None, None) => self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct UserInput {
    #[serde(default)]
    pub oid: Option<String>,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_retired: bool,
}

impl UserInput {
    pub fn new(email: &str) -> Self {
        Self {
            oid: None,
            email: email.to_string(),
            first_name: None,
            last_name: None,
            is_active: true,
            is_retired: false,
        }
    }

    pub fn with_name(mut self, first_name: &str, last_name: &str) -> Self {
        self.first_name = Some(first_name.to_string());
        self.last_name = Some(last_name.to_string());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_active: bool,
    #[serde(default)]
    pub is_retired: bool,
    #[serde(flatten)]
    pub audit: AuditStamp,
}

impl Role {
    /// Only active, non-retired roles contribute grants.
    pub fn is_enabled(&self) -> bool {
        self.is_active && !self.is_retired
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct RoleInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_retired: bool,
}

impl RoleInput {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            description: None,
            is_active: true,
            is_retired: false,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// The area half of a capability, e.g. `Documents`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct AreaType {
    pub id: AreaTypeId,
    pub name: String,
    #[serde(flatten)]
    pub audit: AuditStamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct AreaTypeInput {
    pub name: String,
}

/// The action half of a capability, e.g. `Read`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct PermissionType {
    pub id: PermissionTypeId,
    pub name: String,
    #[serde(flatten)]
    pub audit: AuditStamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct PermissionTypeInput {
    pub name: String,
}

/// A grantable capability row. Several rows may describe the same
/// (area type, permission type) pair; they are equivalent for decisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct Permission {
    pub id: PermissionId,
    pub area_type_id: AreaTypeId,
    pub permission_type_id: PermissionTypeId,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub audit: AuditStamp,
}

impl Permission {
    pub fn matches(&self, area_type_id: AreaTypeId, permission_type_id: PermissionTypeId) -> bool {
        self.area_type_id == area_type_id && self.permission_type_id == permission_type_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct PermissionInput {
    pub area_type_id: AreaTypeId,
    pub permission_type_id: PermissionTypeId,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PermissionInput {
    pub fn new(area_type_id: AreaTypeId, permission_type_id: PermissionTypeId) -> Self {
        Self {
            area_type_id,
            permission_type_id,
            instance: None,
            description: None,
        }
    }
}

/// Optional validity bounds of a role membership. Both bounds are inclusive,
/// a missing bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct EffectiveWindow {
    #[serde(default)]
    pub effective_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub effective_through: Option<DateTime<Utc>>,
}

impl EffectiveWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(from: Option<DateTime<Utc>>, through: Option<DateTime<Utc>>) -> Self {
        Self {
            effective_from: from,
            effective_through: through,
        }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        let after_start = self.effective_from.is_none_or(|from| from <= at);
        let before_end = self.effective_through.is_none_or(|through| at <= through);
        after_start && before_end
    }

    pub fn is_valid(&self) -> bool {
        match (self.effective_from, self.effective_through) {
            (Some(from), Some(through)) => from <= through,
            _ => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct UserRole {
    pub id: UserRoleId,
    pub user_id: UserId,
    pub role_id: RoleId,
    #[serde(flatten)]
    pub window: EffectiveWindow,
    pub date_created: DateTime<Utc>,
    pub user_created: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct RolePermission {
    pub id: RolePermissionId,
    pub role_id: RoleId,
    pub permission_id: PermissionId,
    pub date_created: DateTime<Utc>,
    pub user_created: String,
}

/// Per-user override of a single permission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct UserPermission {
    pub id: UserPermissionId,
    pub user_id: UserId,
    pub permission_id: PermissionId,
    pub override_mode: OverrideMode,
    #[serde(flatten)]
    pub audit: AuditStamp,
}

/// What a link or override mutation actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum AssignmentOutcome {
    /// A new row was written
    Inserted,
    /// The link already existed, nothing was written
    Unchanged,
    /// An existing override row was overwritten
    Updated,
    /// The row existed and was deleted
    Removed,
    /// There was nothing to delete
    Absent,
}

impl AssignmentOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, AssignmentOutcome::Unchanged | AssignmentOutcome::Absent)
    }
}
