use gatehouse_types::AssignmentOutcome;
use serde::{Deserialize, Serialize};

pub mod assignments;
pub mod catalogs;
pub mod check;
pub mod health;
pub mod overrides;
pub mod permissions;
pub mod roles;
pub mod users;

/// Result of an idempotent link operation.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OutcomeResponse {
    pub outcome: AssignmentOutcome,
    pub changed: bool,
}

impl From<AssignmentOutcome> for OutcomeResponse {
    fn from(outcome: AssignmentOutcome) -> Self {
        Self {
            changed: outcome.changed(),
            outcome,
        }
    }
}

/// Result of a delete by id. Deleting an unknown id is not an error.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeleteResponse {
    pub deleted: bool,
}
