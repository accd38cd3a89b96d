use axum::{
    body::Bytes,
    debug_handler,
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use gatehouse_types::{
    EffectiveWindow, PermissionId, RoleId, RolePermission, UserId, UserRole,
};

use super::OutcomeResponse;
use crate::{
    api::{actor::Actor, error::AppError},
    app_state::SharedAppState,
};

/// An empty body means an unbounded membership.
fn parse_window(body: &Bytes) -> Result<EffectiveWindow, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(EffectiveWindow::unbounded());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid effective window: {e}")))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}/roles",
    tag = "assignments",
    params(("id" = i64, Path, description = "User id")),
    responses(
    (status = 200, body = [UserRole])
    )
)]
#[debug_handler]
pub async fn user_roles_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let memberships = state
        .auth_service
        .assignments()
        .roles_for_user(UserId(id))
        .await?;
    Ok(Json(memberships))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/{id}/roles/{role_id}",
    tag = "assignments",
    params(
        ("id" = i64, Path, description = "User id"),
        ("role_id" = i64, Path, description = "Role id")
    ),
    request_body(content = EffectiveWindow, description = "Optional effective window, omit for an unbounded membership"),
    responses(
    (status = 200, body = OutcomeResponse),
    (status = 400, body = AppError),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn assign_role_handler(
    State(state): State<SharedAppState>,
    Path((id, role_id)): Path<(i64, i64)>,
    actor: Actor,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let window = parse_window(&body)?;
    let outcome = state
        .auth_service
        .assignments()
        .assign_role_to_user(
            UserId(id),
            RoleId(role_id),
            actor.as_str(),
            window.effective_from,
            window.effective_through,
        )
        .await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}/roles/{role_id}",
    tag = "assignments",
    params(
        ("id" = i64, Path, description = "User id"),
        ("role_id" = i64, Path, description = "Role id")
    ),
    responses(
    (status = 200, body = OutcomeResponse),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn remove_role_handler(
    State(state): State<SharedAppState>,
    Path((id, role_id)): Path<(i64, i64)>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth_service
        .assignments()
        .remove_role_from_user(UserId(id), RoleId(role_id), actor.as_str())
        .await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

#[utoipa::path(
    get,
    path = "/api/v1/roles/{id}/permissions",
    tag = "assignments",
    params(("id" = i64, Path, description = "Role id")),
    responses(
    (status = 200, body = [RolePermission])
    )
)]
#[debug_handler]
pub async fn role_permissions_handler(
    State(state): State<SharedAppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let links = state
        .auth_service
        .assignments()
        .permissions_for_role(RoleId(id))
        .await?;
    Ok(Json(links))
}

#[utoipa::path(
    post,
    path = "/api/v1/roles/{id}/permissions/{permission_id}",
    tag = "assignments",
    params(
        ("id" = i64, Path, description = "Role id"),
        ("permission_id" = i64, Path, description = "Permission id")
    ),
    responses(
    (status = 200, body = OutcomeResponse),
    (status = 400, body = AppError),
    (status = 404, body = AppError)
    )
)]
#[debug_handler]
pub async fn assign_permission_handler(
    State(state): State<SharedAppState>,
    Path((id, permission_id)): Path<(i64, i64)>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth_service
        .assignments()
        .assign_permission_to_role(RoleId(id), PermissionId(permission_id), actor.as_str())
        .await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/roles/{id}/permissions/{permission_id}",
    tag = "assignments",
    params(
        ("id" = i64, Path, description = "Role id"),
        ("permission_id" = i64, Path, description = "Permission id")
    ),
    responses(
    (status = 200, body = OutcomeResponse),
    (status = 400, body = AppError)
    )
)]
#[debug_handler]
pub async fn remove_permission_handler(
    State(state): State<SharedAppState>,
    Path((id, permission_id)): Path<(i64, i64)>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .auth_service
        .assignments()
        .remove_permission_from_role(RoleId(id), PermissionId(permission_id), actor.as_str())
        .await?;
    Ok(Json(OutcomeResponse::from(outcome)))
}
