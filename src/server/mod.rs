pub mod handlers;

use crate::{config::Config, session::GenerationSession};
use actix_web::{web, App, HttpServer};

pub use handlers::ApiError;

const INDEX_HTML: &str = include_str!("index.html");

/// Registers the studio page and its JSON API.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index)).service(
        web::scope("/api")
            .route("/aspect-ratios", web::get().to(handlers::aspect_ratios))
            .route("/session", web::get().to(handlers::session))
            .route("/generate", web::post().to(handlers::generate))
            .route("/history/{id}/select", web::post().to(handlers::select))
            .route("/history/{id}/download", web::get().to(handlers::download)),
    );
}

pub async fn run(config: &Config, session: GenerationSession) -> std::io::Result<()> {
    let (host, port) = config.bind_address();
    let session = web::Data::new(session);

    log::info!("🌐 Listening on http://{}:{}", host, port);
    HttpServer::new(move || App::new().app_data(session.clone()).configure(configure))
        .bind((host.as_str(), port))?
        .run()
        .await
}
