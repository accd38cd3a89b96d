use gatehouse_types::InvalidOverrideMode;
use std::fmt;

/// Tables addressed by catalog and assignment operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Role,
    Permission,
    AreaType,
    PermissionType,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::User => "user",
            EntityKind::Role => "role",
            EntityKind::Permission => "permission",
            EntityKind::AreaType => "area type",
            EntityKind::PermissionType => "permission type",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RbacError {
    #[error("Invalid override mode '{0}', expected GRANT or DENY")]
    InvalidOverrideMode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("{kind} {id} is still referenced by {count} permission(s)")]
    Referenced {
        kind: EntityKind,
        id: i64,
        count: usize,
    },

    #[error("{kind} named '{name}' already exists")]
    Duplicate { kind: EntityKind, name: String },

    #[error("Failed to persist store at {path}: {message}")]
    Persistence { path: String, message: String },
}

impl RbacError {
    pub fn not_found(kind: EntityKind, id: impl Into<i64>) -> Self {
        RbacError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        RbacError::InvalidInput(message.into())
    }

    /// Validation failures are raised before anything is written.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RbacError::InvalidOverrideMode(_) | RbacError::InvalidInput(_)
        )
    }
}

impl From<InvalidOverrideMode> for RbacError {
    fn from(err: InvalidOverrideMode) -> Self {
        RbacError::InvalidOverrideMode(err.0)
    }
}

pub type RbacResult<T> = Result<T, RbacError>;
