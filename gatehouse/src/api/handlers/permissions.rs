use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gatehouse_types::{Permission, PermissionInput, PermissionId};

use super::DeleteResponse;
use crate::{
    api::{actor::Actor, error::AppError},
    app_state::SharedAppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/permissions",
    tag = "permissions",
    responses(
    (status = 200, body = [Permission])
    )
)]
#[debug_handler]
pub async fn list_permissions_handler(
    State(state): State<SharedAppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.catalog().list_permissions().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/permissions",
    tag = "permissions",
    request_body = PermissionInput,
    responses(
    (status = 201, body = Permission),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn create_permission_handler(
    State(state): State<SharedAppState>,
    actor: Actor,
    Json(input): Json<PermissionInput>,
) -> Result<impl IntoResponse, AppError> {
    let permission = state
        .auth_service
        .catalog()
        .create_permission(input, actor.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

#[utoipa::path(
    post,
    path = "/api/v1/permissions/bulk",
    tag = "permissions",
    request_body = [PermissionInput],
    responses(
    (status = 201, body = [Permission]),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn create_permissions_handler(
    State(state): State<SharedAppState>,
    actor: Actor,
    Json(inputs): Json<Vec<PermissionInput>>,
) -> Result<impl IntoResponse, AppError> {
    let permissions = state
        .auth_service
        .catalog()
        .create_permissions(inputs, actor.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(permissions)))
}

#[utoipa::path(
    get,
    path = "/api/v1/permissions/{id}",
    tag = "permissions",
    params(("id" = i64, Path, description = "Permission id")),
    responses(
    (status = 200, body = Permission),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn get_permission_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.catalog().get_permission(PermissionId(id)).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/permissions/{id}",
    tag = "permissions",
    params(("id" = i64, Path, description = "Permission id")),
    request_body = PermissionInput,
    responses(
    (status = 200, body = Permission),
    (status = 400, body = AppError),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn update_permission_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
    actor: Actor,
    Json(input): Json<PermissionInput>,
) -> Result<impl IntoResponse, AppError> {
    let permission = state
        .auth_service
        .catalog()
        .update_permission(PermissionId(id), input, actor.as_str())
        .await?;
    Ok(Json(permission))
}

/// Removes the permission together with every role link and override on it.
#[utoipa::path(
    delete,
    path = "/api/v1/permissions/{id}",
    tag = "permissions",
    params(("id" = i64, Path, description = "Permission id")),
    responses(
    (status = 200, body = DeleteResponse),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn delete_permission_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state
        .auth_service
        .catalog()
        .delete_permission(PermissionId(id), actor.as_str())
        .await?;
    Ok(Json(DeleteResponse { deleted }))
}
