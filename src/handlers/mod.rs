pub mod assembly_handlers;
pub mod attendance_handlers;
pub mod minutes_handlers;
pub mod settings_handlers;
pub mod voting_handlers;

use actix_web::{
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web, Error, HttpResponse,
};

/// Reject mutation requests that don't carry a JSON body.
///
/// Browsers cannot send cross-origin JSON with credentials via a simple
/// form POST, so the Content-Type check doubles as a CSRF guard for the
/// cookie-less API. GET requests are exempt (read-only).
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let method = req.method().clone();

    if method == actix_web::http::Method::POST
        || method == actix_web::http::Method::PUT
        || method == actix_web::http::Method::DELETE
    {
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        // DELETE carries no body; skip the check for it.
        if method != actix_web::http::Method::DELETE
            && !content_type.starts_with("application/json")
        {
            let body = serde_json::json!({
                "message": "Content-Type must be application/json for mutation requests"
            });
            let response = HttpResponse::BadRequest().json(body);
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Configure all routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/assemblies")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            // Literal segment BEFORE /{id} to avoid the routing conflict.
            .route("/voting/stats", web::get().to(voting_handlers::stats_by_agenda))
            .route("", web::post().to(assembly_handlers::crud::create))
            .route("", web::get().to(assembly_handlers::crud::list))
            .route("/{id}", web::get().to(assembly_handlers::crud::read))
            .route("/{id}", web::put().to(assembly_handlers::crud::update))
            .route("/{id}", web::delete().to(assembly_handlers::crud::delete))
            .route("/{id}/quorum", web::get().to(assembly_handlers::lifecycle::quorum))
            .route("/{id}/attendance", web::post().to(attendance_handlers::register))
            .route("/{id}/attendance", web::get().to(attendance_handlers::roll))
            .route("/{id}/votings", web::post().to(voting_handlers::open))
            .route("/{id}/votings", web::get().to(voting_handlers::list))
            .route("/{id}/vote", web::post().to(voting_handlers::cast))
            .route("/{id}/minutes", web::get().to(minutes_handlers::payload)),
    );
    cfg.service(
        web::scope("/votings")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("/{id}/close", web::post().to(voting_handlers::close))
            .route("/{id}/stats", web::get().to(voting_handlers::stats)),
    );
    cfg.service(
        web::scope("/settings")
            .wrap(actix_web::middleware::from_fn(require_json_content_type))
            .route("", web::get().to(settings_handlers::list))
            .route("", web::put().to(settings_handlers::save)),
    );
}
