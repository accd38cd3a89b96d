use axum::{
    debug_handler,
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use gatehouse_types::{AreaTypeId, Capability, PermissionTypeId, UserId};
use serde::{Deserialize, Serialize};

use crate::{api::error::AppError, app_state::SharedAppState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CheckByNameQuery {
    pub user_id: i64,
    /// Area type name, matched exactly
    pub area: String,
    /// Permission type name, matched exactly
    pub permission_type: String,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct CheckByIdQuery {
    pub user_id: i64,
    pub area_type_id: i64,
    pub permission_type_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PermissionCheck {
    pub user_id: UserId,
    pub capability: Capability,
    pub allowed: bool,
}

async fn check(
    state: &SharedAppState,
    user_id: UserId,
    capability: Capability,
) -> Result<PermissionCheck, AppError> {
    let allowed = state
        .auth_service
        .has_permission(user_id, &capability)
        .await?;
    Ok(PermissionCheck {
        user_id,
        capability,
        allowed,
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/check-permission",
    tag = "gatehouse",
    params(CheckByNameQuery),
    responses(
    (status = 200, body = PermissionCheck),
    (status = 400, description = "Malformed query")
    )
)]
#[debug_handler]
pub async fn check_permission_handler(
    State(state): State<SharedAppState>,
    Query(query): Query<CheckByNameQuery>,
) -> Result<impl IntoResponse, AppError> {
    let capability = Capability::named(&query.area, &query.permission_type);
    Ok(Json(self::check(&state, UserId(query.user_id), capability).await?))
}

#[utoipa::path(
    get,
    path = "/api/v1/check-permission/by-id",
    tag = "gatehouse",
    params(CheckByIdQuery),
    responses(
    (status = 200, body = PermissionCheck),
    (status = 400, description = "Malformed query")
    )
)]
#[debug_handler]
pub async fn check_permission_by_id_handler(
    State(state): State<SharedAppState>,
    Query(query): Query<CheckByIdQuery>,
) -> Result<impl IntoResponse, AppError> {
    let capability = Capability::ids(
        AreaTypeId(query.area_type_id),
        PermissionTypeId(query.permission_type_id),
    );
    Ok(Json(self::check(&state, UserId(query.user_id), capability).await?))
}
