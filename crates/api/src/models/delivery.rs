//! Delivery domain types.

use serde::{Deserialize, Serialize};

use deliveries_core::{ClientId, DeliveryId};

use super::ClientInput;

/// A stored delivery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Delivery {
    /// Store-assigned delivery ID.
    pub id: DeliveryId,
    /// Owning client.
    #[serde(rename = "cliente_id")]
    pub client_id: ClientId,
    /// Weight, address and coordinates.
    #[serde(flatten)]
    pub details: DeliveryDetails,
}

/// Validated delivery fields (everything except the IDs).
///
/// Invariants: `weight > 0`, `address` and `city` are non-empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    /// Weight in kilograms.
    #[serde(rename = "peso")]
    pub weight: f64,
    /// Full free-text address.
    #[serde(rename = "endereco")]
    pub address: String,
    /// Street name.
    #[serde(rename = "logradouro")]
    pub street: String,
    /// Street number.
    #[serde(rename = "numero")]
    pub number: String,
    /// Neighborhood (bairro).
    #[serde(rename = "bairro")]
    pub neighborhood: String,
    /// Apartment, block, etc.
    #[serde(rename = "complemento")]
    pub complement: String,
    #[serde(rename = "cidade")]
    pub city: String,
    /// State (UF).
    #[serde(rename = "estado")]
    pub state: String,
    #[serde(rename = "pais")]
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Delivery fields as sent by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryInput {
    /// Ignored; the ID comes from the store or the request path.
    pub id: Option<DeliveryId>,
    /// Ignored on creation (the client is resolved by CPF), required on update.
    #[serde(rename = "cliente_id")]
    pub client_id: Option<ClientId>,
    #[serde(rename = "peso")]
    pub weight: Option<f64>,
    #[serde(rename = "endereco", deserialize_with = "super::null_as_default")]
    pub address: String,
    #[serde(rename = "logradouro", deserialize_with = "super::null_as_default")]
    pub street: String,
    #[serde(rename = "numero", deserialize_with = "super::null_as_default")]
    pub number: String,
    #[serde(rename = "bairro", deserialize_with = "super::null_as_default")]
    pub neighborhood: String,
    #[serde(rename = "complemento", deserialize_with = "super::null_as_default")]
    pub complement: String,
    #[serde(rename = "cidade", deserialize_with = "super::null_as_default")]
    pub city: String,
    #[serde(rename = "estado", deserialize_with = "super::null_as_default")]
    pub state: String,
    #[serde(rename = "pais", deserialize_with = "super::null_as_default")]
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Body of `POST /deliveries`: the delivery plus the client who owns it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateDeliveryRequest {
    #[serde(deserialize_with = "super::null_as_default")]
    pub delivery: DeliveryInput,
    #[serde(rename = "cliente", deserialize_with = "super::null_as_default")]
    pub client: ClientInput,
}
