use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares an integer identifier newtype for one table.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

entity_id!(
    /// Identifier of a row in the user table
    UserId
);
entity_id!(
    /// Identifier of a row in the role table
    RoleId
);
entity_id!(
    /// Identifier of a row in the permission table
    PermissionId
);
entity_id!(AreaTypeId);
entity_id!(PermissionTypeId);
entity_id!(UserRoleId);
entity_id!(RolePermissionId);
entity_id!(UserPermissionId);
