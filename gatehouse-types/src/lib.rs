/*!
 * Data model for the gatehouse RBAC engine
 *
 * Entities, identifiers and capability descriptors shared by the engine
 * (`gatehouse-core`) and the HTTP API (`gatehouse`). The crate stays free of
 * storage and runtime dependencies.
 */

mod capability;
mod entities;
mod ids;
mod override_mode;

pub use capability::{Capability, DecisionSource, EffectiveCapability};
pub use entities::{
    AreaType, AreaTypeInput, AssignmentOutcome, AuditStamp, EffectiveWindow, Permission,
    PermissionInput, PermissionType, PermissionTypeInput, Role, RoleInput, RolePermission, User,
    UserInput, UserPermission, UserRole,
};
pub use ids::{
    AreaTypeId, PermissionId, PermissionTypeId, RoleId, RolePermissionId, UserId,
    UserPermissionId, UserRoleId,
};
pub use override_mode::{InvalidOverrideMode, OverrideMode};

// Re-export for downstream crates that build timestamps
pub use chrono;
