//! HTTP server setup

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, dev::Server, middleware::Logger, web};

use crate::{api, middleware::auth::Authentication, model::AppState};

/// Creates and binds the HTTP server.
///
/// Middleware order (outermost first): CORS, authentication, request log.
/// Authentication only annotates the request; authorization happens in the
/// handlers.
pub fn http_server(
    app_state: Arc<AppState>,
    address: String,
    port: u16,
) -> Result<Server, std::io::Error> {
    let frontend_url = app_state.configuration.frontend_url();

    Ok(HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&frontend_url)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();

        App::new()
            .wrap(Logger::default())
            .wrap(Authentication)
            .wrap(cors)
            .app_data(web::Data::from(app_state.clone()))
            .service(api::auth::routes())
            .service(api::tasks::routes())
            .service(api::meetings::routes())
            .service(api::notifications::routes())
            .service(api::organizations::routes())
            .service(api::analytics::routes())
            .service(api::activity_logs::routes())
            .service(api::ws::routes())
    })
    .bind((address, port))?
    .run())
}
