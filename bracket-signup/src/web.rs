use actix_web::{middleware, web, App, HttpRequest, HttpResponse, HttpServer, ResponseError};
use serde::Serialize;
use tracing::{info, warn};

use crate::cors::{self, CorsDecision, CorsPolicy};
use crate::error::SignupResult;
use crate::service::SignupService;
use crate::signup::{parse_signup, validate_signup};

/// Shared by every worker; holds no bracket state
pub struct AppState {
    pub service: SignupService,
    pub cors: CorsPolicy,
}

/// Turns a handler result into a JSON response carrying the CORS headers
fn respond<T: Serialize>(origin: Option<&str>, result: SignupResult<T>) -> HttpResponse {
    let response = match result {
        Ok(body) => HttpResponse::Ok().json(body),
        Err(e) => {
            warn!("request failed: {e}");
            e.error_response()
        }
    };
    cors::finish(origin, response)
}

// Signup endpoint
async fn signup(req: HttpRequest, body: web::Bytes, state: web::Data<AppState>) -> HttpResponse {
    let origin = match state.cors.evaluate(&req) {
        CorsDecision::Respond(response) => return response,
        CorsDecision::Proceed { origin } => origin,
    };

    let result = async {
        let request = parse_signup(&body)?;
        let signup = validate_signup(&request)?;
        state.service.signup(signup).await
    }
    .await;
    respond(origin.as_deref(), result)
}

// Bracket state endpoint
async fn get_state(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let origin = match state.cors.evaluate(&req) {
        CorsDecision::Respond(response) => return response,
        CorsDecision::Proceed { origin } => origin,
    };
    respond(origin.as_deref(), state.service.bracket_state().await)
}

// Preflight for either endpoint
async fn preflight(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    match state.cors.evaluate(&req) {
        CorsDecision::Respond(response) => response,
        CorsDecision::Proceed { origin } => cors::finish(origin.as_deref(), HttpResponse::NoContent().finish()),
    }
}

async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().body("Not Found.")
}

/// Registers the routes; shared by the server and the handler tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/signup")
            .route(web::post().to(signup))
            .route(web::method(actix_web::http::Method::OPTIONS).to(preflight))
            .default_service(web::to(not_found)),
    )
    .service(
        web::resource("/state")
            .route(web::get().to(get_state))
            .route(web::method(actix_web::http::Method::OPTIONS).to(preflight))
            .default_service(web::to(not_found)),
    );
}

pub async fn start_server(port: u16, state: AppState) -> std::io::Result<()> {
    let app_state = web::Data::new(state);
    info!("Starting signup server on port {}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
            .default_service(web::to(not_found))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
