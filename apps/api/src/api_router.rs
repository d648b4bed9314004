use axum::Router;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::routing::get;
use odoolink_core::AppError;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let api_routes = Router::new()
        .route(
            "/api/contact-messages",
            get(handlers::contact::list_contact_messages_handler)
                .post(handlers::contact::create_contact_message_handler),
        )
        .layer(build_cors_layer(frontend_url)?);

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/contact",
            get(handlers::contact::contact_form_handler)
                .post(handlers::contact::submit_contact_form_handler),
        )
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}

fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(frontend_url)
                .map_err(|error| AppError::Validation(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]))
}
