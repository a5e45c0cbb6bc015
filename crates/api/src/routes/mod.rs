//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness check
//! GET    /health/ready              - Readiness check (storage reachable)
//!
//! # Clients
//! POST   /clients                   - Register a client
//! GET    /clients                   - List clients
//! GET    /clients/id/{id}           - Client detail
//! PUT    /clients                   - Update a client (ID in body)
//! DELETE /clients/{id}              - Delete a client and its deliveries
//!
//! # Deliveries
//! POST   /deliveries                - Create a delivery, resolving its client by CPF
//! GET    /deliveries                - List deliveries
//! GET    /deliveries/id/{id}        - Delivery detail
//! GET    /deliveries/city?cidade=X  - Deliveries in a city
//! PUT    /deliveries/{id}           - Update a delivery
//! DELETE /deliveries/{id}           - Delete a delivery
//! ```

pub mod clients;
pub mod deliveries;
pub mod health;

use std::str::FromStr;

use axum::{
    Router,
    extract::{FromRequest, Request},
    middleware::from_fn,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::middleware::{cors_layer, request_id_middleware};
use crate::services::ValidationError;
use crate::state::AppState;

/// JSON extractor/response that reports malformed bodies as
/// `{"error": "Erro ao decodificar o JSON"}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Parse an ID path segment, rejecting anything that isn't an integer.
///
/// # Errors
///
/// Returns `ValidationError::InvalidId` if `raw` doesn't parse.
pub fn parse_id<T: FromStr>(raw: &str) -> Result<T, ValidationError> {
    raw.parse().map_err(|_| ValidationError::InvalidId)
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(clients::router())
        .merge(deliveries::router())
}

/// Build the application router with its middleware stack.
///
/// Sentry layers are added by the binary, outside this stack.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config().cors_origins);

    routes()
        .with_state(state)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .layer(cors)
}
