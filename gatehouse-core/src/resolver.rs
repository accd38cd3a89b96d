use chrono::{DateTime, Utc};
use gatehouse_types::{
    AreaTypeId, Capability, DecisionSource, EffectiveCapability, OverrideMode, Permission,
    PermissionId, PermissionTypeId, RoleId, User, UserId,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

use crate::error::RbacResult;
use crate::store::SharedStore;

/// Access decisions over the current store state.
///
/// Precedence, first applicable rule wins:
/// 1. a missing, inactive or retired user is denied;
/// 2. an override on a matching permission decides (DENY beats GRANT);
/// 3. otherwise any active role held within its effective window that is
///    linked to a matching permission grants access.
///
/// Nothing is cached; every call reads the store again.
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    store: SharedStore,
}

#[derive(Default)]
struct CapabilityGrants {
    permission_ids: Vec<PermissionId>,
    overrides: Vec<OverrideMode>,
    roles: Vec<RoleId>,
}

impl PermissionResolver {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn has_permission(&self, user_id: UserId, capability: &Capability) -> RbacResult<bool> {
        self.has_permission_at(user_id, capability, Utc::now()).await
    }

    /// Evaluates the decision as of `at`, which only affects effective windows.
    pub async fn has_permission_at(
        &self,
        user_id: UserId,
        capability: &Capability,
        at: DateTime<Utc>,
    ) -> RbacResult<bool> {
        if self.enabled_user(user_id).await?.is_none() {
            debug!("Denied {} for user {}: unknown or inactive user", capability, user_id);
            return Ok(false);
        }

        let Some((area_type_id, permission_type_id)) = self.resolve_capability(capability).await?
        else {
            debug!("Denied {} for user {}: unknown capability", capability, user_id);
            return Ok(false);
        };

        let matching: HashSet<PermissionId> = self
            .store
            .permissions_for_capability(area_type_id, permission_type_id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        if matching.is_empty() {
            debug!("Denied {} for user {}: no such permission", capability, user_id);
            return Ok(false);
        }

        let overrides: Vec<OverrideMode> = self
            .store
            .user_permissions_for_user(user_id)
            .await?
            .into_iter()
            .filter(|up| matching.contains(&up.permission_id))
            .map(|up| up.override_mode)
            .collect();
        if let Some(decision) = decide_override(&overrides) {
            debug!(
                "{} {} for user {} by override",
                if decision { "Granted" } else { "Denied" },
                capability,
                user_id
            );
            return Ok(decision);
        }

        let role_ids = self.active_role_ids(user_id, at).await?;
        if role_ids.is_empty() {
            debug!("Denied {} for user {}: no active roles", capability, user_id);
            return Ok(false);
        }
        let granted = self
            .store
            .role_permissions_for_roles(&role_ids)
            .await?
            .iter()
            .any(|rp| matching.contains(&rp.permission_id));

        debug!(
            "{} {} for user {} by role membership",
            if granted { "Granted" } else { "Denied" },
            capability,
            user_id
        );
        Ok(granted)
    }

    /// Maps a capability to catalog ids. Names must match exactly; an
    /// unknown name yields `None`.
    pub async fn resolve_capability(
        &self,
        capability: &Capability,
    ) -> RbacResult<Option<(AreaTypeId, PermissionTypeId)>> {
        match capability {
            Capability::ById {
                area_type_id,
                permission_type_id,
            } => Ok(Some((*area_type_id, *permission_type_id))),
            Capability::ByName {
                area,
                permission_type,
            } => {
                let Some(area) = self.store.find_area_type_by_name(area).await? else {
                    return Ok(None);
                };
                let Some(permission_type) = self
                    .store
                    .find_permission_type_by_name(permission_type)
                    .await?
                else {
                    return Ok(None);
                };
                Ok(Some((area.id, permission_type.id)))
            }
        }
    }

    pub async fn effective_capabilities(&self, user_id: UserId) -> RbacResult<Vec<EffectiveCapability>> {
        self.effective_capabilities_at(user_id, Utc::now()).await
    }

    /// Every capability the user holds as of `at`, with the rule that grants
    /// it. A DENY override hides a capability that roles would grant.
    pub async fn effective_capabilities_at(
        &self,
        user_id: UserId,
        at: DateTime<Utc>,
    ) -> RbacResult<Vec<EffectiveCapability>> {
        if self.enabled_user(user_id).await?.is_none() {
            return Ok(Vec::new());
        }

        let overrides = self.store.user_permissions_for_user(user_id).await?;
        let role_ids = self.active_role_ids(user_id, at).await?;
        let role_links = if role_ids.is_empty() {
            Vec::new()
        } else {
            self.store.role_permissions_for_roles(&role_ids).await?
        };

        let mut permissions: HashMap<PermissionId, Permission> = HashMap::new();
        let referenced = overrides
            .iter()
            .map(|up| up.permission_id)
            .chain(role_links.iter().map(|rp| rp.permission_id));
        for permission_id in referenced {
            if permissions.contains_key(&permission_id) {
                continue;
            }
            if let Some(permission) = self.store.get_permission(permission_id).await? {
                permissions.insert(permission_id, permission);
            }
        }

        let mut by_capability: BTreeMap<(AreaTypeId, PermissionTypeId), CapabilityGrants> =
            BTreeMap::new();
        for up in &overrides {
            if let Some(p) = permissions.get(&up.permission_id) {
                let entry = by_capability
                    .entry((p.area_type_id, p.permission_type_id))
                    .or_default();
                entry.overrides.push(up.override_mode);
                push_unique(&mut entry.permission_ids, p.id);
            }
        }
        for rp in &role_links {
            if let Some(p) = permissions.get(&rp.permission_id) {
                let entry = by_capability
                    .entry((p.area_type_id, p.permission_type_id))
                    .or_default();
                push_unique(&mut entry.roles, rp.role_id);
                push_unique(&mut entry.permission_ids, p.id);
            }
        }

        let mut result = Vec::new();
        for ((area_type_id, permission_type_id), grants) in by_capability {
            let source = match decide_override(&grants.overrides) {
                Some(true) => DecisionSource::Override,
                Some(false) => continue,
                None if !grants.roles.is_empty() => DecisionSource::Role,
                None => continue,
            };

            let area = self
                .store
                .get_area_type(area_type_id)
                .await?
                .map(|a| a.name)
                .unwrap_or_default();
            let permission_type = self
                .store
                .get_permission_type(permission_type_id)
                .await?
                .map(|p| p.name)
                .unwrap_or_default();

            let mut permission_ids = grants.permission_ids;
            permission_ids.sort();
            let mut via_roles = match source {
                DecisionSource::Role => grants.roles,
                DecisionSource::Override => Vec::new(),
            };
            via_roles.sort();

            result.push(EffectiveCapability {
                area_type_id,
                area,
                permission_type_id,
                permission_type,
                permission_ids,
                source,
                via_roles,
            });
        }

        result.sort_by(|a, b| {
            (a.area.as_str(), a.permission_type.as_str())
                .cmp(&(b.area.as_str(), b.permission_type.as_str()))
        });
        Ok(result)
    }

    async fn enabled_user(&self, user_id: UserId) -> RbacResult<Option<User>> {
        Ok(self
            .store
            .get_user(user_id)
            .await?
            .filter(|user| user.is_enabled()))
    }

    /// Roles whose membership covers `at` and which are themselves enabled.
    async fn active_role_ids(&self, user_id: UserId, at: DateTime<Utc>) -> RbacResult<Vec<RoleId>> {
        let mut role_ids = Vec::new();
        for membership in self.store.user_roles_for_user(user_id).await? {
            if !membership.window.contains(at) {
                continue;
            }
            match self.store.get_role(membership.role_id).await? {
                Some(role) if role.is_enabled() => push_unique(&mut role_ids, role.id),
                _ => {}
            }
        }
        Ok(role_ids)
    }
}

/// `Some(false)` if any override denies, `Some(true)` if only grants are
/// present, `None` without overrides.
fn decide_override(modes: &[OverrideMode]) -> Option<bool> {
    if modes.is_empty() {
        None
    } else {
        Some(!modes.contains(&OverrideMode::Deny))
    }
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, item: T) {
    if !items.contains(&item) {
        items.push(item);
    }
}
