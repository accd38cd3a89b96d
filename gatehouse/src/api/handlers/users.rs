use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gatehouse_types::{EffectiveCapability, User, UserId, UserInput};

use super::DeleteResponse;
use crate::{
    api::{actor::Actor, error::AppError},
    app_state::SharedAppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "users",
    responses(
    (status = 200, body = [User])
    )
)]
#[debug_handler]
pub async fn list_users_handler(
    State(state): State<SharedAppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.catalog().list_users().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = UserInput,
    responses(
    (status = 201, body = User),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn create_user_handler(
    State(state): State<SharedAppState>,
    actor: Actor,
    Json(input): Json<UserInput>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .auth_service
        .catalog()
        .create_user(input, actor.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/bulk",
    tag = "users",
    request_body = [UserInput],
    responses(
    (status = 201, body = [User]),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn create_users_handler(
    State(state): State<SharedAppState>,
    actor: Actor,
    Json(inputs): Json<Vec<UserInput>>,
) -> Result<impl IntoResponse, AppError> {
    let users = state
        .auth_service
        .catalog()
        .create_users(inputs, actor.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(users)))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
    (status = 200, body = User),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn get_user_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.catalog().get_user(UserId(id)).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    request_body = UserInput,
    responses(
    (status = 200, body = User),
    (status = 400, body = AppError),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn update_user_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
    actor: Actor,
    Json(input): Json<UserInput>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .auth_service
        .catalog()
        .update_user(UserId(id), input, actor.as_str())
        .await?;
    Ok(Json(user))
}

/// Removes the user together with its role memberships and overrides.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
    (status = 200, body = DeleteResponse),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn delete_user_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state
        .auth_service
        .catalog()
        .delete_user(UserId(id), actor.as_str())
        .await?;
    Ok(Json(DeleteResponse { deleted }))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/effective-permissions",
    tag = "users",
    params(("id" = i64, Path, description = "User id")),
    responses(
    (status = 200, body = [EffectiveCapability])
    )
)]
#[debug_handler]
pub async fn effective_permissions_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let capabilities = state
        .auth_service
        .resolver()
        .effective_capabilities(UserId(id))
        .await?;
    Ok(Json(capabilities))
}
