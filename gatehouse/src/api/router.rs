use axum::routing::{get, post, put};
use axum::Router;
use gatehouse_types::{
    AreaType, AreaTypeInput, AssignmentOutcome, Capability, DecisionSource, EffectiveCapability,
    EffectiveWindow, OverrideMode, Permission, PermissionInput, PermissionType,
    PermissionTypeInput, Role, RoleInput, RolePermission, User, UserInput, UserPermission,
    UserRole,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::actor::ACTOR_HEADER;
use crate::api::error::AppError;
use crate::api::handlers::check::PermissionCheck;
use crate::api::handlers::overrides::OverrideRequest;
use crate::api::handlers::{
    assignments, catalogs, check, health, overrides, permissions, roles, users, DeleteResponse,
    OutcomeResponse,
};
use crate::app_state::SharedAppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_handler,
        check::check_permission_handler,
        check::check_permission_by_id_handler,
        users::list_users_handler,
        users::create_user_handler,
        users::create_users_handler,
        users::get_user_handler,
        users::update_user_handler,
        users::delete_user_handler,
        users::effective_permissions_handler,
        roles::list_roles_handler,
        roles::create_role_handler,
        roles::create_roles_handler,
        roles::get_role_handler,
        roles::update_role_handler,
        roles::delete_role_handler,
        permissions::list_permissions_handler,
        permissions::create_permission_handler,
        permissions::create_permissions_handler,
        permissions::get_permission_handler,
        permissions::update_permission_handler,
        permissions::delete_permission_handler,
        catalogs::list_area_types_handler,
        catalogs::create_area_type_handler,
        catalogs::create_area_types_handler,
        catalogs::get_area_type_handler,
        catalogs::update_area_type_handler,
        catalogs::delete_area_type_handler,
        catalogs::list_permission_types_handler,
        catalogs::create_permission_type_handler,
        catalogs::create_permission_types_handler,
        catalogs::get_permission_type_handler,
        catalogs::update_permission_type_handler,
        catalogs::delete_permission_type_handler,
        assignments::user_roles_handler,
        assignments::assign_role_handler,
        assignments::remove_role_handler,
        assignments::role_permissions_handler,
        assignments::assign_permission_handler,
        assignments::remove_permission_handler,
        overrides::list_overrides_handler,
        overrides::grant_permission_handler,
        overrides::deny_permission_handler,
        overrides::set_override_handler,
        overrides::remove_override_handler,
    ),
    components(
        schemas(
            User, UserInput, Role, RoleInput, Permission, PermissionInput,
            AreaType, AreaTypeInput, PermissionType, PermissionTypeInput,
            UserRole, RolePermission, UserPermission, EffectiveWindow, OverrideMode,
            AssignmentOutcome, Capability, DecisionSource, EffectiveCapability,
            PermissionCheck, OverrideRequest, OutcomeResponse, DeleteResponse, AppError
        )
    ),
    tags(
        (name = "gatehouse", description = "access decisions"),
        (name = "users", description = "user catalog"),
        (name = "roles", description = "role catalog"),
        (name = "permissions", description = "permission catalog"),
        (name = "catalogs", description = "area and permission types"),
        (name = "assignments", description = "role memberships and role permissions"),
        (name = "overrides", description = "per-user GRANT / DENY overrides")
    ),
    modifiers(&ActorAddon)
)]
struct ApiDoc;

struct ActorAddon;

impl Modify for ActorAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "actor",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(ACTOR_HEADER))),
            )
        }
    }
}

pub struct ApiRoutes;

impl ApiRoutes {
    pub fn create(state: SharedAppState) -> Router {
        let api = ApiDoc::openapi();

        let decision_router = Router::new()
            .route("/api/v1/health", get(health::health_handler))
            .route(
                "/api/v1/check-permission",
                get(check::check_permission_handler),
            )
            .route(
                "/api/v1/check-permission/by-id",
                get(check::check_permission_by_id_handler),
            );

        let catalog_router = Router::new()
            .route(
                "/api/v1/users",
                get(users::list_users_handler).post(users::create_user_handler),
            )
            .route("/api/v1/users/bulk", post(users::create_users_handler))
            .route(
                "/api/v1/users/{id}",
                get(users::get_user_handler)
                    .put(users::update_user_handler)
                    .delete(users::delete_user_handler),
            )
            .route(
                "/api/v1/users/{id}/effective-permissions",
                get(users::effective_permissions_handler),
            )
            .route(
                "/api/v1/roles",
                get(roles::list_roles_handler).post(roles::create_role_handler),
            )
            .route("/api/v1/roles/bulk", post(roles::create_roles_handler))
            .route(
                "/api/v1/roles/{id}",
                get(roles::get_role_handler)
                    .put(roles::update_role_handler)
                    .delete(roles::delete_role_handler),
            )
            .route(
                "/api/v1/permissions",
                get(permissions::list_permissions_handler)
                    .post(permissions::create_permission_handler),
            )
            .route(
                "/api/v1/permissions/bulk",
                post(permissions::create_permissions_handler),
            )
            .route(
                "/api/v1/permissions/{id}",
                get(permissions::get_permission_handler)
                    .put(permissions::update_permission_handler)
                    .delete(permissions::delete_permission_handler),
            )
            .route(
                "/api/v1/area-types",
                get(catalogs::list_area_types_handler).post(catalogs::create_area_type_handler),
            )
            .route(
                "/api/v1/area-types/bulk",
                post(catalogs::create_area_types_handler),
            )
            .route(
                "/api/v1/area-types/{id}",
                get(catalogs::get_area_type_handler)
                    .put(catalogs::update_area_type_handler)
                    .delete(catalogs::delete_area_type_handler),
            )
            .route(
                "/api/v1/permission-types",
                get(catalogs::list_permission_types_handler)
                    .post(catalogs::create_permission_type_handler),
            )
            .route(
                "/api/v1/permission-types/bulk",
                post(catalogs::create_permission_types_handler),
            )
            .route(
                "/api/v1/permission-types/{id}",
                get(catalogs::get_permission_type_handler)
                    .put(catalogs::update_permission_type_handler)
                    .delete(catalogs::delete_permission_type_handler),
            );

        let assignment_router = Router::new()
            .route(
                "/api/v1/users/{id}/roles",
                get(assignments::user_roles_handler),
            )
            .route(
                "/api/v1/users/{id}/roles/{role_id}",
                post(assignments::assign_role_handler).delete(assignments::remove_role_handler),
            )
            .route(
                "/api/v1/roles/{id}/permissions",
                get(assignments::role_permissions_handler),
            )
            .route(
                "/api/v1/roles/{id}/permissions/{permission_id}",
                post(assignments::assign_permission_handler)
                    .delete(assignments::remove_permission_handler),
            )
            .route(
                "/api/v1/users/{id}/overrides",
                get(overrides::list_overrides_handler),
            )
            .route(
                "/api/v1/users/{id}/permissions/{permission_id}",
                put(overrides::set_override_handler).delete(overrides::remove_override_handler),
            )
            .route(
                "/api/v1/users/{id}/permissions/{permission_id}/grant",
                post(overrides::grant_permission_handler),
            )
            .route(
                "/api/v1/users/{id}/permissions/{permission_id}/deny",
                post(overrides::deny_permission_handler),
            );

        Router::new()
            .merge(decision_router)
            .merge(catalog_router)
            .merge(assignment_router)
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
            .with_state(state)
    }
}
