use crate::handlers::{appointments, providers, ws};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/medicos",
            get(providers::list_providers).post(providers::create_provider),
        )
        .route(
            "/medicos/{id}",
            put(providers::update_provider).delete(providers::delete_provider),
        )
        .route("/consultas", get(appointments::list_appointments))
        .route("/consultas/cancelar", post(appointments::cancel_appointment))
        .route("/agendar", post(appointments::book_appointment))
        .route("/ws", get(ws::ws_handler));

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
