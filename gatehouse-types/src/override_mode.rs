use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-user override decision on a permission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa", derive(utoipa::ToSchema))]
#[serde(rename_all = "UPPERCASE")]
pub enum OverrideMode {
    #[serde(alias = "grant")]
    Grant,
    #[serde(alias = "deny")]
    Deny,
}

impl OverrideMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverrideMode::Grant => "GRANT",
            OverrideMode::Deny => "DENY",
        }
    }

    pub fn is_grant(&self) -> bool {
        matches!(self, OverrideMode::Grant)
    }
}

impl fmt::Display for OverrideMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an override mode string is neither GRANT nor DENY
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidOverrideMode(pub String);

impl fmt::Display for InvalidOverrideMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid override mode '{}', expected GRANT or DENY",
            self.0
        )
    }
}

impl std::error::Error for InvalidOverrideMode {}

impl FromStr for OverrideMode {
    type Err = InvalidOverrideMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GRANT" => Ok(OverrideMode::Grant),
            "DENY" => Ok(OverrideMode::Deny),
            _ => Err(InvalidOverrideMode(s.to_string())),
        }
    }
}
