//! Caller identity, as established by the upstream gateway.
//!
//! Token verification itself happens outside this service; the gateway
//! forwards the verified result as identity headers on every request:
//!
//! ```text
//! X-User-Id:        numeric user id
//! X-User-Role:      ADMIN | COMPLEX_ADMIN | RESIDENT
//! X-Complex-Id:     numeric complex id
//! X-Tenant-Schema:  tenant schema name
//! ```
//!
//! `AuthContext` extracts and validates these; a request missing any of them
//! is rejected with 401 before a handler runs. Role gating happens once at
//! the top of each operation via `require_role`.

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    ComplexAdmin,
    Resident,
}

impl Role {
    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "ADMIN" => Some(Role::Admin),
            "COMPLEX_ADMIN" => Some(Role::ComplexAdmin),
            "RESIDENT" => Some(Role::Resident),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::ComplexAdmin => "COMPLEX_ADMIN",
            Role::Resident => "RESIDENT",
        }
    }
}

/// Roles allowed to run administrator-only operations (lifecycle
/// transitions, opening/closing votings, deletes).
pub const ADMIN_ROLES: &[Role] = &[Role::Admin, Role::ComplexAdmin];

/// Verified caller identity for one request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: Role,
    pub complex_id: i64,
    pub tenant_schema: String,
}

fn header<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, AppError> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {name} header")))
}

fn extract(req: &HttpRequest) -> Result<AuthContext, AppError> {
    let user_id: i64 = header(req, "X-User-Id")?
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid X-User-Id header".to_string()))?;
    let role = Role::parse(header(req, "X-User-Role")?)
        .ok_or_else(|| AppError::Unauthorized("Invalid X-User-Role header".to_string()))?;
    let complex_id: i64 = header(req, "X-Complex-Id")?
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid X-Complex-Id header".to_string()))?;
    let tenant_schema = header(req, "X-Tenant-Schema")?.to_string();

    Ok(AuthContext {
        user_id,
        role,
        complex_id,
        tenant_schema,
    })
}

impl FromRequest for AuthContext {
    type Error = AppError;
    type Future = Ready<Result<AuthContext, AppError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

/// Check the caller's role against an allowed set; returns 403 if not held.
pub fn require_role(ctx: &AuthContext, allowed: &[Role]) -> Result<(), AppError> {
    if allowed.contains(&ctx.role) {
        Ok(())
    } else {
        Err(AppError::Forbidden(format!(
            "Role {} may not perform this operation",
            ctx.role.as_str()
        )))
    }
}
