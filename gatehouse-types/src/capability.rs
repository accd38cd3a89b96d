use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::{AreaTypeId, PermissionId, PermissionTypeId, RoleId};

/// A protected action, addressed either by catalog names or by catalog ids.
///
/// Both forms are equivalent: names are resolved against the area type and
/// permission type catalogs by exact match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum Capability {
    ById {
        area_type_id: AreaTypeId,
        permission_type_id: PermissionTypeId,
    },
    ByName {
        area: String,
        permission_type: String,
    },
}

impl Capability {
    pub fn named(area: &str, permission_type: &str) -> Self {
        Capability::ByName {
            area: area.to_string(),
            permission_type: permission_type.to_string(),
        }
    }

    pub fn ids(area_type_id: AreaTypeId, permission_type_id: PermissionTypeId) -> Self {
        Capability::ById {
            area_type_id,
            permission_type_id,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::ByName {
                area,
                permission_type,
            } => write!(f, "{area}/{permission_type}"),
            Capability::ById {
                area_type_id,
                permission_type_id,
            } => write!(f, "#{area_type_id}/#{permission_type_id}"),
        }
    }
}

/// Where an effective capability comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum DecisionSource {
    Override,
    Role,
}

/// A capability a user currently holds, with the rows that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
pub struct EffectiveCapability {
    pub area_type_id: AreaTypeId,
    pub area: String,
    pub permission_type_id: PermissionTypeId,
    pub permission_type: String,
    pub permission_ids: Vec<PermissionId>,
    pub source: DecisionSource,
    /// Roles granting the capability; empty when an override decides
    pub via_roles: Vec<RoleId>,
}

impl EffectiveCapability {
    pub fn capability(&self) -> Capability {
        Capability::ids(self.area_type_id, self.permission_type_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_deserializes_either_form() {
        let by_name: Capability =
            serde_json::from_str(r#"{"area": "Articles", "permission_type": "Edit"}"#).unwrap();
        assert_eq!(by_name, Capability::named("Articles", "Edit"));

        let by_id: Capability =
            serde_json::from_str(r#"{"area_type_id": 1, "permission_type_id": 2}"#).unwrap();
        assert_eq!(by_id, Capability::ids(AreaTypeId(1), PermissionTypeId(2)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Capability::named("ODAG", "Read").to_string(), "ODAG/Read");
        assert_eq!(
            Capability::ids(AreaTypeId(4), PermissionTypeId(9)).to_string(),
            "#4/#9"
        );
    }
}
