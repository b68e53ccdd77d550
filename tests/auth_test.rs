use actix_web::test::TestRequest;
use actix_web::FromRequest;

use asamblea::auth::{require_role, AuthContext, Role, ADMIN_ROLES};
use asamblea::errors::AppError;

fn full_request() -> TestRequest {
    TestRequest::default()
        .insert_header(("X-User-Id", "42"))
        .insert_header(("X-User-Role", "COMPLEX_ADMIN"))
        .insert_header(("X-Complex-Id", "7"))
        .insert_header(("X-Tenant-Schema", "tenant_mirador"))
}

#[actix_web::test]
async fn test_extracts_forwarded_identity() {
    let req = full_request().to_http_request();
    let ctx = AuthContext::extract(&req).await.unwrap();
    assert_eq!(ctx.user_id, 42);
    assert_eq!(ctx.role, Role::ComplexAdmin);
    assert_eq!(ctx.complex_id, 7);
    assert_eq!(ctx.tenant_schema, "tenant_mirador");
}

#[actix_web::test]
async fn test_missing_identity_header_is_unauthorized() {
    let req = TestRequest::default()
        .insert_header(("X-User-Id", "42"))
        .to_http_request();
    match AuthContext::extract(&req).await {
        Err(AppError::Unauthorized(msg)) => assert!(msg.contains("X-User-Role")),
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[actix_web::test]
async fn test_malformed_user_id_is_unauthorized() {
    let req = full_request()
        .insert_header(("X-User-Id", "not-a-number"))
        .to_http_request();
    assert!(matches!(
        AuthContext::extract(&req).await,
        Err(AppError::Unauthorized(_))
    ));
}

#[actix_web::test]
async fn test_unknown_role_is_unauthorized() {
    let req = TestRequest::default()
        .insert_header(("X-User-Id", "42"))
        .insert_header(("X-User-Role", "SUPERUSER"))
        .insert_header(("X-Complex-Id", "7"))
        .insert_header(("X-Tenant-Schema", "tenant_mirador"))
        .to_http_request();
    assert!(matches!(
        AuthContext::extract(&req).await,
        Err(AppError::Unauthorized(_))
    ));
}

#[test]
fn test_role_parse() {
    assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
    assert_eq!(Role::parse("COMPLEX_ADMIN"), Some(Role::ComplexAdmin));
    assert_eq!(Role::parse("RESIDENT"), Some(Role::Resident));
    assert_eq!(Role::parse("admin"), None);
}

#[test]
fn test_admin_gate() {
    let mut ctx = AuthContext {
        user_id: 1,
        role: Role::Resident,
        complex_id: 1,
        tenant_schema: "tenant_mirador".to_string(),
    };
    assert!(matches!(
        require_role(&ctx, ADMIN_ROLES),
        Err(AppError::Forbidden(_))
    ));

    ctx.role = Role::ComplexAdmin;
    assert!(require_role(&ctx, ADMIN_ROLES).is_ok());
    ctx.role = Role::Admin;
    assert!(require_role(&ctx, ADMIN_ROLES).is_ok());
}

#[test]
fn test_resident_allowed_where_listed() {
    let ctx = AuthContext {
        user_id: 1,
        role: Role::Resident,
        complex_id: 1,
        tenant_schema: "tenant_mirador".to_string(),
    };
    assert!(require_role(&ctx, &[Role::Resident, Role::Admin]).is_ok());
}
