//! # API REST
//!
//! REST host for the casenote documentation wizard.
//!
//! Handles:
//! - HTTP endpoints with axum, one wizard session per open record
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status codes)
//!
//! The wizard itself lives in `casenote-core`; this crate only translates requests into
//! controller calls and returns the resulting [`WizardView`](casenote_core::WizardView)
//! together with any notifications the call produced.

#![warn(rust_2018_idioms)]

pub mod dto;
mod handlers;
mod state;

pub use state::AppState;

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_sections,
        handlers::create_record,
        handlers::open_session,
        handlers::close_session,
        handlers::get_view,
        handlers::update_field,
        handlers::mark_complete,
        handlers::go_next,
        handlers::go_previous,
        handlers::go_to_section,
        handlers::save,
        handlers::finalize,
        handlers::request_delete,
        handlers::cancel_delete,
        handlers::confirm_delete,
        handlers::list_investigations,
    ),
    components(schemas(
        dto::HealthRes,
        dto::SectionRes,
        dto::ListSectionsRes,
        dto::CreateRecordReq,
        dto::OpenSessionReq,
        dto::UpdateFieldReq,
        dto::MarkCompleteReq,
        dto::WizardRes,
        dto::ListInvestigationsRes,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over `state`, including the Swagger UI.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/sections", get(handlers::list_sections))
        .route("/records", post(handlers::create_record))
        .route(
            "/records/:id/session",
            post(handlers::open_session).delete(handlers::close_session),
        )
        .route("/records/:id", get(handlers::get_view))
        .route("/records/:id/fields/:name", put(handlers::update_field))
        .route(
            "/records/:id/sections/:section/complete",
            post(handlers::mark_complete),
        )
        .route(
            "/records/:id/sections/:section/visit",
            post(handlers::go_to_section),
        )
        .route("/records/:id/next", post(handlers::go_next))
        .route("/records/:id/previous", post(handlers::go_previous))
        .route("/records/:id/save", post(handlers::save))
        .route("/records/:id/finalize", post(handlers::finalize))
        .route(
            "/records/:id/delete-request",
            post(handlers::request_delete).delete(handlers::cancel_delete),
        )
        .route("/records/:id/delete-confirm", post(handlers::confirm_delete))
        .route(
            "/records/:id/investigations",
            get(handlers::list_investigations),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
