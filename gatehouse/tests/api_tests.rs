use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::{TestRequest, TestServer};
use config::Config;
use gatehouse::api::actor::ACTOR_HEADER;
use gatehouse::api::router::ApiRoutes;
use gatehouse::settings::config::Settings;
use gatehouse::stop_flag::StopFlag;
use gatehouse::AppState;
use gatehouse_types::{
    AreaType, EffectiveCapability, Permission, PermissionType, Role, User, UserPermission,
};
use serde_json::{json, Value};

async fn create_server(settings: Settings) -> TestServer {
    let app_state = AppState::with_settings(settings, StopFlag::new())
        .await
        .expect("Failed to create app state");
    TestServer::new(ApiRoutes::create(app_state)).unwrap()
}

async fn empty_server() -> TestServer {
    create_server(Settings::default()).await
}

async fn seeded_server() -> TestServer {
    let builder = Config::builder().add_source(config::File::with_name("tests/test_settings"));
    let settings: Settings = builder.build().unwrap().try_deserialize().unwrap();
    create_server(settings).await
}

fn as_admin(request: TestRequest) -> TestRequest {
    request.add_header(
        HeaderName::from_static(ACTOR_HEADER),
        HeaderValue::from_static("admin@example.com"),
    )
}

async fn check(server: &TestServer, user_id: i64, area: &str, permission_type: &str) -> bool {
    let response = server
        .get(&format!(
            "/api/v1/check-permission?user_id={user_id}&area={area}&permission_type={permission_type}"
        ))
        .await;
    assert_eq!(response.status_code(), 200);
    response.json::<Value>()["allowed"].as_bool().unwrap()
}

/// Editor user holding a role linked to Articles/Edit
struct EditorSetup {
    user: User,
    role: Role,
    edit: Permission,
}

async fn setup_editor(server: &TestServer) -> EditorSetup {
    let area: AreaType = as_admin(server.post("/api/v1/area-types"))
        .json(&json!({"name": "Articles"}))
        .await
        .json();
    let permission_type: PermissionType = as_admin(server.post("/api/v1/permission-types"))
        .json(&json!({"name": "Edit"}))
        .await
        .json();
    let edit: Permission = as_admin(server.post("/api/v1/permissions"))
        .json(&json!({"area_type_id": area.id, "permission_type_id": permission_type.id}))
        .await
        .json();
    let role: Role = as_admin(server.post("/api/v1/roles"))
        .json(&json!({"name": "Editors"}))
        .await
        .json();
    let user: User = as_admin(server.post("/api/v1/users"))
        .json(&json!({"email": "editor@example.com", "first_name": "Eddie"}))
        .await
        .json();

    as_admin(server.post(&format!("/api/v1/users/{}/roles/{}", user.id, role.id)))
        .await
        .assert_status_ok();
    as_admin(server.post(&format!(
        "/api/v1/roles/{}/permissions/{}",
        role.id, edit.id
    )))
    .await
    .assert_status_ok();

    EditorSetup { user, role, edit }
}

#[tokio::test]
async fn test_health() {
    let server = empty_server().await;
    let response = server.get("/api/v1/health").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn test_role_grant_and_deny_override() {
    let server = empty_server().await;
    let EditorSetup { user, edit, .. } = setup_editor(&server).await;
    let user_id = user.id.value();

    assert!(check(&server, user_id, "Articles", "Edit").await);

    let response = as_admin(server.post(&format!(
        "/api/v1/users/{}/permissions/{}/deny",
        user.id, edit.id
    )))
    .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["outcome"], "inserted");
    assert!(!check(&server, user_id, "Articles", "Edit").await);

    // Switching to GRANT updates the single override row
    let response = as_admin(server.put(&format!(
        "/api/v1/users/{}/permissions/{}",
        user.id, edit.id
    )))
    .json(&json!({"mode": "grant"}))
    .await;
    assert_eq!(response.json::<Value>()["outcome"], "updated");
    let overrides: Vec<UserPermission> = server
        .get(&format!("/api/v1/users/{}/overrides", user.id))
        .await
        .json();
    assert_eq!(overrides.len(), 1);
    assert!(overrides[0].override_mode.is_grant());
    assert_eq!(overrides[0].audit.user_updated.as_deref(), Some("admin@example.com"));

    as_admin(server.delete(&format!(
        "/api/v1/users/{}/permissions/{}",
        user.id, edit.id
    )))
    .await
    .assert_status_ok();
    assert!(check(&server, user_id, "Articles", "Edit").await);
}

#[tokio::test]
async fn test_check_by_id_matches_check_by_name() {
    let server = empty_server().await;
    let EditorSetup { user, edit, .. } = setup_editor(&server).await;

    let response = server
        .get(&format!(
            "/api/v1/check-permission/by-id?user_id={}&area_type_id={}&permission_type_id={}",
            user.id, edit.area_type_id, edit.permission_type_id
        ))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["allowed"], true);

    // Unknown users and names are a plain "no"
    assert!(!check(&server, 999, "Articles", "Edit").await);
    assert!(!check(&server, user.id.value(), "Articles", "Publish").await);
}

#[tokio::test]
async fn test_assign_role_is_idempotent() {
    let server = empty_server().await;
    let EditorSetup { user, role, .. } = setup_editor(&server).await;

    let response =
        as_admin(server.post(&format!("/api/v1/users/{}/roles/{}", user.id, role.id))).await;
    assert_eq!(response.json::<Value>()["outcome"], "unchanged");
    assert_eq!(response.json::<Value>()["changed"], false);

    let memberships: Vec<Value> = server
        .get(&format!("/api/v1/users/{}/roles", user.id))
        .await
        .json();
    assert_eq!(memberships.len(), 1);
}

#[tokio::test]
async fn test_membership_window_from_body() {
    let server = empty_server().await;
    let EditorSetup { user, role, .. } = setup_editor(&server).await;

    as_admin(server.delete(&format!("/api/v1/users/{}/roles/{}", user.id, role.id)))
        .await
        .assert_status_ok();
    as_admin(server.post(&format!("/api/v1/users/{}/roles/{}", user.id, role.id)))
        .json(&json!({"effective_from": "2999-01-01T00:00:00Z"}))
        .await
        .assert_status_ok();

    assert!(!check(&server, user.id.value(), "Articles", "Edit").await);
}

#[tokio::test]
async fn test_mutations_require_actor() {
    let server = empty_server().await;

    let response = server
        .post("/api/v1/users")
        .json(&json!({"email": "nobody@example.com"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains(ACTOR_HEADER));

    let users: Vec<User> = server.get("/api/v1/users").await.json();
    assert!(users.is_empty());
}

#[tokio::test]
async fn test_invalid_override_mode_is_rejected() {
    let server = empty_server().await;
    let EditorSetup { user, edit, .. } = setup_editor(&server).await;

    let response = as_admin(server.put(&format!(
        "/api/v1/users/{}/permissions/{}",
        user.id, edit.id
    )))
    .json(&json!({"mode": "MAYBE"}))
    .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let overrides: Vec<UserPermission> = server
        .get(&format!("/api/v1/users/{}/overrides", user.id))
        .await
        .json();
    assert!(overrides.is_empty());
}

#[tokio::test]
async fn test_missing_entities() {
    let server = empty_server().await;

    let response = server.get("/api/v1/users/42").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = as_admin(server.put("/api/v1/roles/42"))
        .json(&json!({"name": "Ghosts"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = as_admin(server.post("/api/v1/users/1/roles/2")).await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    // Deleting something that is not there is fine
    let response = as_admin(server.delete("/api/v1/users/42")).await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["deleted"], false);
}

#[tokio::test]
async fn test_referenced_area_type_cannot_be_deleted() {
    let server = empty_server().await;
    let EditorSetup { edit, .. } = setup_editor(&server).await;

    let response = as_admin(server.delete(&format!(
        "/api/v1/area-types/{}",
        edit.area_type_id
    )))
    .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    // Once the permission is gone the area type can go as well
    as_admin(server.delete(&format!("/api/v1/permissions/{}", edit.id)))
        .await
        .assert_status_ok();
    let response = as_admin(server.delete(&format!(
        "/api/v1/area-types/{}",
        edit.area_type_id
    )))
    .await;
    assert_eq!(response.json::<Value>()["deleted"], true);
}

#[tokio::test]
async fn test_duplicate_catalog_name_is_a_conflict() {
    let server = empty_server().await;
    let EditorSetup { user, edit, .. } = setup_editor(&server).await;

    let response = as_admin(server.post("/api/v1/area-types"))
        .json(&json!({"name": "Articles"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let response = as_admin(server.post("/api/v1/permission-types/bulk"))
        .json(&json!([{"name": "Publish"}, {"name": "Edit"}]))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);
    let types: Vec<PermissionType> = server.get("/api/v1/permission-types").await.json();
    assert_eq!(types.len(), 1);

    let drafts: AreaType = as_admin(server.post("/api/v1/area-types"))
        .json(&json!({"name": "Drafts"}))
        .await
        .json();
    let response = as_admin(server.put(&format!("/api/v1/area-types/{}", drafts.id)))
        .json(&json!({"name": "Articles"}))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let by_id: Value = server
        .get(&format!(
            "/api/v1/check-permission/by-id?user_id={}&area_type_id={}&permission_type_id={}",
            user.id, edit.area_type_id, edit.permission_type_id
        ))
        .await
        .json();
    assert_eq!(by_id["allowed"], true);
    assert!(check(&server, user.id.value(), "Articles", "Edit").await);
}

#[tokio::test]
async fn test_bulk_create_is_all_or_nothing() {
    let server = empty_server().await;

    let response = as_admin(server.post("/api/v1/users/bulk"))
        .json(&json!([
            {"email": "first@example.com"},
            {"email": "not-an-email"}
        ]))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let users: Vec<User> = server.get("/api/v1/users").await.json();
    assert!(users.is_empty());

    let response = as_admin(server.post("/api/v1/users/bulk"))
        .json(&json!([
            {"email": "first@example.com"},
            {"email": "second@example.com"}
        ]))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let users: Vec<User> = response.json();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].audit.user_created, "admin@example.com");
}

#[tokio::test]
async fn test_seeded_demo_data() {
    let server = seeded_server().await;

    let users: Vec<User> = server.get("/api/v1/users").await.json();
    let alice = users
        .iter()
        .find(|u| u.email == "Alice.Smith@test.com")
        .unwrap();
    let bob = users
        .iter()
        .find(|u| u.email == "Bob.Jones@test.com")
        .unwrap();

    assert!(check(&server, alice.id.value(), "ODAG", "Write").await);
    assert!(!check(&server, bob.id.value(), "ODAG", "Write").await);
    assert!(check(&server, bob.id.value(), "Documents", "Read").await);

    let effective: Vec<EffectiveCapability> = server
        .get(&format!("/api/v1/users/{}/effective-permissions", alice.id))
        .await
        .json();
    let names: Vec<(&str, &str)> = effective
        .iter()
        .map(|c| (c.area.as_str(), c.permission_type.as_str()))
        .collect();
    assert_eq!(names, vec![("ODAG", "Read"), ("ODAG", "Write")]);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let server = empty_server().await;
    let response = server.get("/api-docs/openapi.json").await;
    assert_eq!(response.status_code(), 200);
    let doc: Value = response.json();
    assert!(doc["paths"]["/api/v1/check-permission"].is_object());
}
