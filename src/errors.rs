use actix_web::{HttpResponse, ResponseError};
use std::fmt;

/// Application error taxonomy, mapped onto HTTP statuses by `ResponseError`.
///
/// Precondition failures (Validation, Forbidden, NotFound, Conflict) are
/// raised before any mutation; Db wraps storage failures and renders as a
/// generic 500 so internals never leak to callers.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    Db(sqlx::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(msg) => write!(f, "Validation error: {msg}"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::NotFound(what) => write!(f, "{what} not found"),
            AppError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            AppError::Db(e) => write!(f, "Database error: {e}"),
        }
    }
}

fn json_message(status: actix_web::http::StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(serde_json::json!({ "message": message }))
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        use actix_web::http::StatusCode;
        match self {
            AppError::Validation(msg) => json_message(StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized(msg) => json_message(StatusCode::UNAUTHORIZED, msg),
            AppError::Forbidden(msg) => json_message(StatusCode::FORBIDDEN, msg),
            AppError::NotFound(what) => {
                json_message(StatusCode::NOT_FOUND, &format!("{what} not found"))
            }
            AppError::Conflict(msg) => json_message(StatusCode::CONFLICT, msg),
            AppError::Db(e) => {
                log::error!("Database error: {e}");
                json_message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Db(e)
    }
}

/// True when a sqlx error is a Postgres unique-constraint violation (23505).
/// Lost races on vote insertion and round opening land here and surface as
/// Conflict rather than a 500.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}

/// Map a sqlx error to Conflict with the given message if it is a unique
/// violation, otherwise pass it through as a database error.
pub fn conflict_on_unique(e: sqlx::Error, message: &str) -> AppError {
    if is_unique_violation(&e) {
        AppError::Conflict(message.to_string())
    } else {
        AppError::Db(e)
    }
}
