use actix_web::http::StatusCode;
use actix_web::ResponseError;

use asamblea::errors::{is_unique_violation, AppError};

#[test]
fn test_status_mapping() {
    let cases = [
        (AppError::Validation("bad".into()), StatusCode::BAD_REQUEST),
        (AppError::Unauthorized("no".into()), StatusCode::UNAUTHORIZED),
        (AppError::Forbidden("no".into()), StatusCode::FORBIDDEN),
        (AppError::NotFound("Assembly".into()), StatusCode::NOT_FOUND),
        (AppError::Conflict("dup".into()), StatusCode::CONFLICT),
        (
            AppError::Db(sqlx::Error::RowNotFound),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];
    for (err, expected) in cases {
        assert_eq!(err.error_response().status(), expected, "for {err}");
    }
}

#[test]
fn test_internal_errors_stay_generic() {
    // The response body must not leak storage details.
    let response = AppError::Db(sqlx::Error::PoolTimedOut).error_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[test]
fn test_non_database_errors_are_not_unique_violations() {
    assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
}

#[test]
fn test_display_messages() {
    assert_eq!(
        AppError::NotFound("Voting".into()).to_string(),
        "Voting not found"
    );
    assert!(AppError::Conflict("User has already voted in this round".into())
        .to_string()
        .contains("already voted"));
}
