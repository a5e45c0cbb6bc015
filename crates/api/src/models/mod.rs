//! Domain models for clients and deliveries.
//!
//! Each entity has a stored form (`Client`, `Delivery`), a lenient wire
//! input (`ClientInput`, `DeliveryInput`) that decodes whatever the caller
//! sent, and a validated form (`NewClient`, `DeliveryDetails`) produced by
//! the services layer and handed to storage.
//!
//! JSON field names are Portuguese (`nome`, `peso`, `cidade`, ...) to stay
//! compatible with the existing frontend.

use serde::{Deserialize, Deserializer};

pub mod client;
pub mod delivery;

pub use client::{Client, ClientInput, NewClient};
pub use delivery::{CreateDeliveryRequest, Delivery, DeliveryDetails, DeliveryInput};

/// Decodes an explicit JSON `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
