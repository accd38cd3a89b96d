use axum::{
    debug_handler,
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use gatehouse_types::{PermissionId, UserId, UserPermission};
use serde::Deserialize;

use super::OutcomeResponse;
use crate::{
    api::{actor::Actor, error::AppError},
    app_state::SharedAppState,
};

/// Mode is accepted as free text and validated by the engine.
#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct OverrideRequest {
    /// GRANT or DENY, case-insensitive
    pub mode: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/overrides",
    tag = "overrides",
    params(("id" = i64, Path, description = "User id")),
    responses(
    (status = 200, body = [UserPermission])
    )
)]
#[debug_handler]
pub async fn list_overrides_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let overrides = state
        .auth_service
        .assignments()
        .overrides_for_user(UserId(id))
        .await?;
    Ok(Json(overrides))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/permissions/{permission_id}/grant",
    tag = "overrides",
    params(
        ("id" = i64, Path, description = "User id"),
        ("permission_id" = i64, Path, description = "Permission id")
    ),
    responses(
    (status = 200, body = OutcomeResponse),
    (status = 400, body = AppError),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn grant_permission_handler(
    State(state): State<SharedAppState>,
    Path((id, permission_id)): Path<(i64, i64)>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth_service
        .assignments()
        .grant_permission_to_user(UserId(id), PermissionId(permission_id), actor.as_str())
        .await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/permissions/{permission_id}/deny",
    tag = "overrides",
    params(
        ("id" = i64, Path, description = "User id"),
        ("permission_id" = i64, Path, description = "Permission id")
    ),
    responses(
    (status = 200, body = OutcomeResponse),
    (status = 400, body = AppError),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn deny_permission_handler(
    State(state): State<SharedAppState>,
    Path((id, permission_id)): Path<(i64, i64)>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth_service
        .assignments()
        .deny_permission_to_user(UserId(id), PermissionId(permission_id), actor.as_str())
        .await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}/permissions/{permission_id}",
    tag = "overrides",
    params(
        ("id" = i64, Path, description = "User id"),
        ("permission_id" = i64, Path, description = "Permission id")
    ),
    request_body = OverrideRequest,
    responses(
    (status = 200, body = OutcomeResponse),
    (status = 400, description = "Unknown override mode", body = AppError),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn set_override_handler(
    State(state): State<SharedAppState>,
    Path((id, permission_id)): Path<(i64, i64)>,
    actor: Actor,
    Json(request): Json<OverrideRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth_service
        .assignments()
        .set_user_permission_override(
            UserId(id),
            PermissionId(permission_id),
            &request.mode,
            actor.as_str(),
        )
        .await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/permissions/{permission_id}",
    tag = "overrides",
    params(
        ("id" = i64, Path, description = "User id"),
        ("permission_id" = i64, Path, description = "Permission id")
    ),
    responses(
    (status = 200, body = OutcomeResponse),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn remove_override_handler(
    State(state): State<SharedAppState>,
    Path((id, permission_id)): Path<(i64, i64)>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth_service
        .assignments()
        .remove_user_permission_override(UserId(id), PermissionId(permission_id), actor.as_str())
        .await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}
