//! Client API handlers.

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use deliveries_core::ClientId;
use tracing::instrument;

use super::{Json, parse_id};
use crate::error::Result;
use crate::models::{Client, ClientInput};
use crate::services::ClientService;
use crate::state::AppState;

/// Build the clients router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/clients", get(list).post(create).put(update))
        .route("/clients/id/{id}", get(show))
        .route("/clients/{id}", delete(destroy))
}

/// Register a client.
///
/// # Errors
///
/// 400 on a malformed body, missing name or invalid CPF; 409 if the CPF is
/// already registered.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ClientInput>,
) -> Result<(StatusCode, Json<Client>)> {
    let client = ClientService::new(state.store()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

/// List every client.
///
/// # Errors
///
/// 500 if storage fails.
#[instrument(skip_all)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Client>>> {
    Ok(Json(ClientService::new(state.store()).list().await?))
}

/// Show one client.
///
/// # Errors
///
/// 400 for a non-integer ID, 404 if the client doesn't exist.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Client>> {
    let id: ClientId = parse_id(&id)?;
    Ok(Json(ClientService::new(state.store()).get(id).await?))
}

/// Overwrite a client; the ID comes from the body.
///
/// # Errors
///
/// 400 on a malformed body, missing ID or invalid fields; 404 if the client
/// doesn't exist; 409 if the CPF belongs to another client.
#[instrument(skip_all)]
pub async fn update(
    State(state): State<AppState>,
    Json(input): Json<ClientInput>,
) -> Result<Json<Client>> {
    Ok(Json(ClientService::new(state.store()).update(&input).await?))
}

/// Delete a client together with its deliveries.
///
/// # Errors
///
/// 400 for a non-integer ID, 500 if storage fails.
#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    let id: ClientId = parse_id(&id)?;
    ClientService::new(state.store()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
