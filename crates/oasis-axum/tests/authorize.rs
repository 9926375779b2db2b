//! End-to-end authorization tests over a real router.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use axum_test::TestServer;
use jiff::SignedDuration;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use oasis_auth::mock::MockDirectory;
use oasis_auth::types::{AuthContext, Membership, MembershipStatus, OrgRole, Profile};
use oasis_auth::{AuthConfig, AuthService, TokenClaims};
use oasis_axum::{AuthSession, Result, authorize};

const SECRET: &str = "integration-test-secret";
const ORG_HEADER: HeaderName = HeaderName::from_static("x-organization-id");

async fn admin_only(session: AuthSession) -> Result<Json<AuthContext>> {
    let context = authorize!(admin: session);
    Ok(Json(context))
}

async fn org_managers(session: AuthSession) -> Result<Json<AuthContext>> {
    let context = authorize!(roles: session, OrgRole::Owner, OrgRole::Admin);
    Ok(Json(context))
}

async fn org_content(session: AuthSession) -> Result<Json<AuthContext>> {
    let context = authorize!(member: session);
    Ok(Json(context))
}

async fn org_settings(
    Path(org_id): Path<String>,
    session: AuthSession,
) -> Result<Json<AuthContext>> {
    let context = authorize!(org: session, &org_id, OrgRole::Owner, OrgRole::Admin);
    Ok(Json(context))
}

fn test_server(directory: &MockDirectory) -> TestServer {
    let service = AuthService::from_config(
        &AuthConfig::symmetric(SECRET),
        Arc::new(directory.clone()),
        Arc::new(directory.clone()),
    )
    .unwrap();

    let router = Router::new()
        .route("/admin", get(admin_only))
        .route("/org/managers", get(org_managers))
        .route("/org/content", get(org_content))
        .route("/orgs/{org_id}/settings", get(org_settings))
        .with_state(service);

    TestServer::new(router).unwrap()
}

fn mint(subject: &str) -> String {
    let claims = TokenClaims::new(subject, "authenticated", SignedDuration::from_secs(3600));
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap()
}

fn seed_member(directory: &MockDirectory, role: OrgRole, status: MembershipStatus) {
    directory.insert_profile(Profile::new("u1", "u1@example.org"));
    directory.insert_membership(Membership::new("o1", "u1", role, status));
}

#[tokio::test]
async fn missing_token_is_401() {
    let directory = MockDirectory::new();
    let server = test_server(&directory);

    let response = server.get("/org/content").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<serde_json::Value>()["name"], "missing_auth_token");
}

#[tokio::test]
async fn tampered_token_is_opaque_401() {
    let directory = MockDirectory::new();
    seed_member(&directory, OrgRole::Owner, MembershipStatus::Active);
    let server = test_server(&directory);

    let mut token = mint("u1");
    let flipped = if token.ends_with('A') { 'B' } else { 'A' };
    token.pop();
    token.push(flipped);

    let response = server
        .get("/org/content")
        .authorization_bearer(&token)
        .add_header(ORG_HEADER, HeaderValue::from_static("o1"))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["name"], "unauthorized");
    assert!(body.get("context").is_none());
}

#[tokio::test]
async fn owner_passes_role_check() {
    let directory = MockDirectory::new();
    seed_member(&directory, OrgRole::Owner, MembershipStatus::Active);
    let server = test_server(&directory);

    let response = server
        .get("/org/managers")
        .authorization_bearer(&mint("u1"))
        .add_header(ORG_HEADER, HeaderValue::from_static("o1"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["effective_role"], "owner");
    assert_eq!(body["organization_id"], "o1");
    assert_eq!(body["profile"]["id"], "u1");
}

#[tokio::test]
async fn missing_org_header_is_400() {
    let directory = MockDirectory::new();
    seed_member(&directory, OrgRole::Owner, MembershipStatus::Active);
    let server = test_server(&directory);

    let response = server
        .get("/org/managers")
        .authorization_bearer(&mint("u1"))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_member_is_403() {
    let directory = MockDirectory::new();
    seed_member(&directory, OrgRole::Owner, MembershipStatus::Active);
    let server = test_server(&directory);

    let response = server
        .get("/org/content")
        .authorization_bearer(&mint("u1"))
        .add_header(ORG_HEADER, HeaderValue::from_static("o2"))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invited_member_is_403() {
    let directory = MockDirectory::new();
    seed_member(&directory, OrgRole::Admin, MembershipStatus::Invited);
    let server = test_server(&directory);

    let response = server
        .get("/org/content")
        .authorization_bearer(&mint("u1"))
        .add_header(ORG_HEADER, HeaderValue::from_static("o1"))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let body = response.json::<serde_json::Value>();
    assert!(body["context"].as_str().unwrap().contains("invited"));
}

#[tokio::test]
async fn insufficient_role_is_403_with_detail() {
    let directory = MockDirectory::new();
    seed_member(&directory, OrgRole::Facilitator, MembershipStatus::Active);
    let server = test_server(&directory);

    let response = server
        .get("/org/managers")
        .authorization_bearer(&mint("u1"))
        .add_header(ORG_HEADER, HeaderValue::from_static("o1"))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let context = response.json::<serde_json::Value>()["context"]
        .as_str()
        .unwrap()
        .to_owned();
    assert!(context.contains("owner"));
    assert!(context.contains("facilitator"));
}

#[tokio::test]
async fn member_check_admits_any_active_role() {
    let directory = MockDirectory::new();
    seed_member(&directory, OrgRole::Participant, MembershipStatus::Active);
    let server = test_server(&directory);

    let response = server
        .get("/org/content")
        .authorization_bearer(&mint("u1"))
        .add_header(ORG_HEADER, HeaderValue::from_static("o1"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>()["effective_role"], "participant");
}

#[tokio::test]
async fn platform_admin_needs_no_membership_or_scope() {
    let directory = MockDirectory::new();
    directory.insert_profile(Profile::new("a1", "root@example.org").with_platform_admin(true));
    let server = test_server(&directory);

    let response = server.get("/admin").authorization_bearer(&mint("a1")).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body = response.json::<serde_json::Value>();
    assert_eq!(body["effective_role"], "platform_admin");
    assert!(body["organization_id"].is_null());

    // The bypass also covers org-scoped routes without any membership row.
    let response = server
        .get("/org/managers")
        .authorization_bearer(&mint("a1"))
        .add_header(ORG_HEADER, HeaderValue::from_static("o1"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.json::<serde_json::Value>()["effective_role"],
        "platform_admin"
    );
}

#[tokio::test]
async fn path_scoped_route_ignores_the_header() {
    let directory = MockDirectory::new();
    seed_member(&directory, OrgRole::Admin, MembershipStatus::Active);
    let server = test_server(&directory);

    // Header points elsewhere; the path decides.
    let response = server
        .get("/orgs/o1/settings")
        .authorization_bearer(&mint("u1"))
        .add_header(ORG_HEADER, HeaderValue::from_static("o2"))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.json::<serde_json::Value>()["organization_id"], "o1");

    let response = server
        .get("/orgs/o2/settings")
        .authorization_bearer(&mint("u1"))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_subject_is_404() {
    let directory = MockDirectory::new();
    let server = test_server(&directory);

    let response = server
        .get("/org/content")
        .authorization_bearer(&mint("ghost"))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn store_fault_is_500() {
    let directory = MockDirectory::new();
    seed_member(&directory, OrgRole::Owner, MembershipStatus::Active);
    directory.fail_memberships(true);
    let server = test_server(&directory);

    let response = server
        .get("/org/content")
        .authorization_bearer(&mint("u1"))
        .add_header(ORG_HEADER, HeaderValue::from_static("o1"))
        .await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
}
