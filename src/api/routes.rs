//! Route table for the HTTP API.

use actix_web::web;

use super::handlers;

/// Mount all API routes under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::register))
                    .route("/login", web::post().to(handlers::login))
                    .route("/logout", web::post().to(handlers::logout)),
            )
            .service(
                web::scope("/records")
                    .route("", web::post().to(handlers::add_record))
                    .route("", web::get().to(handlers::list_records))
                    .route("/trend", web::get().to(handlers::trend_window))
                    .route("/report", web::get().to(handlers::export_summary))
                    .route("/{id}/report", web::get().to(handlers::export_record)),
            ),
    );
}
