use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use gatehouse_types::{
    AreaType, AreaTypeId, AreaTypeInput, PermissionType, PermissionTypeId, PermissionTypeInput,
};

use super::DeleteResponse;
use crate::{
    api::{actor::Actor, error::AppError},
    app_state::SharedAppState,
};

#[utoipa::path(
    get,
    path = "/api/v1/area-types",
    tag = "catalogs",
    responses(
    (status = 200, body = [AreaType])
    )
)]
#[debug_handler]
pub async fn list_area_types_handler(
    State(state): State<SharedAppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.catalog().list_area_types().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/area-types",
    tag = "catalogs",
    request_body = AreaTypeInput,
    responses(
    (status = 201, body = AreaType),
    (status = 400, body = AppError),
    (status = 409, description = "Name already taken", body = AppError)
    )
)]
#[debug_handler]
pub async fn create_area_type_handler(
    State(state): State<SharedAppState>,
    actor: Actor,
    Json(input): Json<AreaTypeInput>,
) -> Result<impl IntoResponse, AppError> {
    let area_type = state
        .auth_service
        .catalog()
        .create_area_type(input, actor.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(area_type)))
}

#[utoipa::path(
    post,
    path = "/api/v1/area-types/bulk",
    tag = "catalogs",
    request_body = [AreaTypeInput],
    responses(
    (status = 201, body = [AreaType]),
    (status = 400, body = AppError),
    (status = 409, description = "Name already taken", body = AppError)
    )
)]
#[debug_handler]
pub async fn create_area_types_handler(
    State(state): State<SharedAppState>,
    actor: Actor,
    Json(inputs): Json<Vec<AreaTypeInput>>,
) -> Result<impl IntoResponse, AppError> {
    let area_types = state
        .auth_service
        .catalog()
        .create_area_types(inputs, actor.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(area_types)))
}

#[utoipa::path(
    get,
    path = "/api/v1/area-types/{id}",
    tag = "catalogs",
    params(("id" = i64, Path, description = "AreaType id")),
    responses(
    (status = 200, body = AreaType),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn get_area_type_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.catalog().get_area_type(AreaTypeId(id)).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/area-types/{id}",
    tag = "catalogs",
    params(("id" = i64, Path, description = "AreaType id")),
    request_body = AreaTypeInput,
    responses(
    (status = 200, body = AreaType),
    (status = 400, body = AppError),
    (status = 404, body = AppError),
    (status = 409, description = "Name already taken", body = AppError)
    )
)]
#[debug_handler]
pub async fn update_area_type_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
    actor: Actor,
    Json(input): Json<AreaTypeInput>,
) -> Result<impl IntoResponse, AppError> {
    let area_type = state
        .auth_service
        .catalog()
        .update_area_type(AreaTypeId(id), input, actor.as_str())
        .await?;
    Ok(Json(area_type))
}

/// Fails with 409 while permissions still point at the area type.
#[utoipa::path(
    delete,
    path = "/api/v1/area-types/{id}",
    tag = "catalogs",
    params(("id" = i64, Path, description = "AreaType id")),
    responses(
    (status = 200, body = DeleteResponse),
    (status = 400, body = AppError),
    (status = 409, description = "Still referenced by permissions", body = AppError)
    )
)]
#[debug_handler]
pub async fn delete_area_type_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state
        .auth_service
        .catalog()
        .delete_area_type(AreaTypeId(id), actor.as_str())
        .await?;
    Ok(Json(DeleteResponse { deleted }))
}

#[utoipa::path(
    get,
    path = "/api/v1/permission-types",
    tag = "catalogs",
    responses(
    (status = 200, body = [PermissionType])
    )
)]
#[debug_handler]
pub async fn list_permission_types_handler(
    State(state): State<SharedAppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.catalog().list_permission_types().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/permission-types",
    tag = "catalogs",
    request_body = PermissionTypeInput,
    responses(
    (status = 201, body = PermissionType),
    (status = 400, body = AppError),
    (status = 409, description = "Name already taken", body = AppError)
    )
)]
#[debug_handler]
pub async fn create_permission_type_handler(
    State(state): State<SharedAppState>,
    actor: Actor,
    Json(input): Json<PermissionTypeInput>,
) -> Result<impl IntoResponse, AppError> {
    let permission_type = state
        .auth_service
        .catalog()
        .create_permission_type(input, actor.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(permission_type)))
}

#[utoipa::path(
    post,
    path = "/api/v1/permission-types/bulk",
    tag = "catalogs",
    request_body = [PermissionTypeInput],
    responses(
    (status = 201, body = [PermissionType]),
    (status = 400, body = AppError),
    (status = 409, description = "Name already taken", body = AppError)
    )
)]
#[debug_handler]
pub async fn create_permission_types_handler(
    State(state): State<SharedAppState>,
    actor: Actor,
    Json(inputs): Json<Vec<PermissionTypeInput>>,
) -> Result<impl IntoResponse, AppError> {
    let permission_types = state
        .auth_service
        .catalog()
        .create_permission_types(inputs, actor.as_str())
        .await?;
    Ok((StatusCode::CREATED, Json(permission_types)))
}

#[utoipa::path(
    get,
    path = "/api/v1/permission-types/{id}",
    tag = "catalogs",
    params(("id" = i64, Path, description = "PermissionType id")),
    responses(
    (status = 200, body = PermissionType),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn get_permission_type_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.auth_service.catalog().get_permission_type(PermissionTypeId(id)).await?))
}

#[utoipa::path(
    put,
    path = "/api/v1/permission-types/{id}",
    tag = "catalogs",
    params(("id" = i64, Path, description = "PermissionType id")),
    request_body = PermissionTypeInput,
    responses(
    (status = 200, body = PermissionType),
    (status = 400, body = AppError),
    (status = 404, body = AppError),
    (status = 409, description = "Name already taken", body = AppError)
    )
)]
#[debug_handler]
pub async fn update_permission_type_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
    actor: Actor,
    Json(input): Json<PermissionTypeInput>,
) -> Result<impl IntoResponse, AppError> {
    let permission_type = state
        .auth_service
        .catalog()
        .update_permission_type(PermissionTypeId(id), input, actor.as_str())
        .await?;
    Ok(Json(permission_type))
}

/// Fails with 409 while permissions still point at the permission type.
#[utoipa::path(
    delete,
    path = "/api/v1/permission-types/{id}",
    tag = "catalogs",
    params(("id" = i64, Path, description = "PermissionType id")),
    responses(
    (status = 200, body = DeleteResponse),
    (status = 400, body = AppError),
    (status = 409, description = "Still referenced by permissions", body = AppError)
    )
)]
#[debug_handler]
pub async fn delete_permission_type_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state
        .auth_service
        .catalog()
        .delete_permission_type(PermissionTypeId(id), actor.as_str())
        .await?;
    Ok(Json(DeleteResponse { deleted }))
}
