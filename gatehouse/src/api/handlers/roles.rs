use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gatehouse_types::{Role, RoleInput, RoleId};

use super::DeleteResponse;
use crate::{
    api::{actor::Actor, error::AppError},
    app_state::SharedAppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/roles",
    tag = "roles",
    responses(
    (status = 200, body = [Role])
    )
)]
#[debug_handler]
pub async fn list_roles_handler(
    State(state): State<SharedAppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.catalog().list_roles().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/roles",
    tag = "roles",
    request_body = RoleInput,
    responses(
    (status = 201, body = Role),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn create_role_handler(
    State(state): State<SharedAppState>,
    actor: Actor,
    Json(input): Json<RoleInput>,
) -> Result<impl IntoResponse, AppError> {
    let role = state
        .auth_service
        .catalog()
        .create_role(input, actor.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    post,
    path = "/api/v1/roles/bulk",
    tag = "roles",
    request_body = [RoleInput],
    responses(
    (status = 201, body = [Role]),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn create_roles_handler(
    State(state): State<SharedAppState>,
    actor: Actor,
    Json(inputs): Json<Vec<RoleInput>>,
) -> Result<impl IntoResponse, AppError> {
    let roles = state
        .auth_service
        .catalog()
        .create_roles(inputs, actor.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(roles)))
}

#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}",
    tag = "roles",
    params(("id" = i64, Path, description = "Role id")),
    responses(
    (status = 200, body = Role),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn get_role_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.catalog().get_role(RoleId(id)).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/roles/{id}",
    tag = "roles",
    params(("id" = i64, Path, description = "Role id")),
    request_body = RoleInput,
    responses(
    (status = 200, body = Role),
    (status = 400, body = AppError),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn update_role_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
    actor: Actor,
    Json(input): Json<RoleInput>,
) -> Result<impl IntoResponse, AppError> {
    let role = state
        .auth_service
        .catalog()
        .update_role(RoleId(id), input, actor.as_str())
        .await?;
    Ok(Json(role))
}

/// Removes the role together with its memberships and permission links.
#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}",
    tag = "roles",
    params(("id" = i64, Path, description = "Role id")),
    responses(
    (status = 200, body = DeleteResponse),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn delete_role_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state
        .auth_service
        .catalog()
        .delete_role(RoleId(id), actor.as_str())
        .await?;
    Ok(Json(DeleteResponse { deleted }))
}
