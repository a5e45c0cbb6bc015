//! Delivery API handlers.

use axum::{
    Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    routing::{get, put},
};
use deliveries_core::DeliveryId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{Json, parse_id};
use crate::error::Result;
use crate::models::{CreateDeliveryRequest, Delivery, DeliveryInput};
use crate::services::DeliveryService;
use crate::state::AppState;

/// Build the deliveries router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/deliveries", get(list).post(create))
        .route("/deliveries/id/{id}", get(show))
        .route("/deliveries/city", get(by_city))
        .route("/deliveries/{id}", put(update).delete(destroy))
}

/// Response for a successful creation.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub success: bool,
    pub id: DeliveryId,
    pub message: &'static str,
}

/// Response carrying only a confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Query for the city listing.
#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub cidade: Option<String>,
}

/// Create a delivery, resolving (or registering) its client by CPF.
///
/// # Errors
///
/// 400 with the first failing validation message, 500 if storage fails.
#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateDeliveryRequest>,
) -> Result<Json<CreatedResponse>> {
    let id = DeliveryService::new(state.store()).create(&request).await?;
    Ok(Json(CreatedResponse {
        success: true,
        id,
        message: "Entrega cadastrada com sucesso!",
    }))
}

/// List every delivery.
///
/// # Errors
///
/// 500 if storage fails.
#[instrument(skip_all)]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Delivery>>> {
    Ok(Json(DeliveryService::new(state.store()).list().await?))
}

/// Show one delivery.
///
/// # Errors
///
/// 400 for a non-integer ID, 404 if the delivery doesn't exist.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Delivery>> {
    let id: DeliveryId = parse_id(&id)?;
    Ok(Json(DeliveryService::new(state.store()).get(id).await?))
}

/// List deliveries in the city given by `?cidade=`.
///
/// # Errors
///
/// 400 if `cidade` is missing or empty.
#[instrument(skip_all)]
pub async fn by_city(
    State(state): State<AppState>,
    query: std::result::Result<Query<CityQuery>, QueryRejection>,
) -> Result<Json<Vec<Delivery>>> {
    let Query(query) = query?;
    let city = query.cidade.unwrap_or_default();
    Ok(Json(
        DeliveryService::new(state.store()).list_by_city(&city).await?,
    ))
}

/// Overwrite a delivery.
///
/// # Errors
///
/// 400 for a bad ID, malformed body or invalid fields; 404 if the delivery
/// doesn't exist; 409 if `cliente_id` references no client.
#[instrument(skip(state, input))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<DeliveryInput>,
) -> Result<Json<MessageResponse>> {
    let id: DeliveryId = parse_id(&id)?;
    DeliveryService::new(state.store()).update(id, &input).await?;
    Ok(Json(MessageResponse {
        message: "Entrega atualizada com sucesso!",
    }))
}

/// Delete a delivery. Unknown IDs succeed.
///
/// # Errors
///
/// 400 for a non-integer ID, 500 if storage fails.
#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let id: DeliveryId = parse_id(&id)?;
    DeliveryService::new(state.store()).delete(id).await?;
    Ok(Json(MessageResponse {
        message: "Entrega excluída com sucesso!",
    }))
}
