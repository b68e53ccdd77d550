use actix_web::{middleware, web, App, HttpServer};

use asamblea::{audit, db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set (postgres://...)");
    let pool = db::init_pool(&database_url).await;

    // Provision every configured tenant schema and run audit retention.
    let tenants = db::Tenants::new(pool.clone());
    let schemas = std::env::var("TENANT_SCHEMAS").unwrap_or_default();
    for schema in schemas.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if let Err(e) = db::ensure_tenant_schema(&pool, schema).await {
            log::error!("Failed to provision tenant schema '{schema}': {e}");
            continue;
        }
        match tenants.handle(schema) {
            Ok(handle) => audit::cleanup_old_entries(&handle).await,
            Err(e) => log::warn!("Skipping audit cleanup for '{schema}': {e}"),
        }
    }

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(tenants.clone()))
            .configure(handlers::configure)
            .default_service(web::to(|| async {
                actix_web::HttpResponse::NotFound()
                    .json(serde_json::json!({ "message": "Not found" }))
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
