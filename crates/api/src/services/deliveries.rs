//! Delivery service: creation workflow, client resolution and CRUD.

use deliveries_core::{ClientId, Cpf, DeliveryId};
use tracing::{debug, info, instrument};

use super::{ServiceError, ValidationError, validate_client};
use crate::db::{RepositoryError, Store};
use crate::models::{
    ClientInput, CreateDeliveryRequest, Delivery, DeliveryDetails, DeliveryInput, NewClient,
};

/// Validate weight, address and city, in that order.
///
/// # Errors
///
/// Returns the first `ValidationError` encountered.
pub fn validate_details(input: &DeliveryInput) -> Result<DeliveryDetails, ValidationError> {
    let weight = match input.weight {
        Some(weight) if weight > 0.0 => weight,
        _ => return Err(ValidationError::MissingOrInvalidField("peso")),
    };
    if input.address.is_empty() {
        return Err(ValidationError::MissingField("endereco"));
    }
    if input.city.is_empty() {
        return Err(ValidationError::MissingField("cidade"));
    }

    Ok(DeliveryDetails {
        weight,
        address: input.address.clone(),
        street: input.street.clone(),
        number: input.number.clone(),
        neighborhood: input.neighborhood.clone(),
        complement: input.complement.clone(),
        city: input.city.clone(),
        state: input.state.clone(),
        country: input.country.clone(),
        latitude: input.latitude,
        longitude: input.longitude,
    })
}

/// Validate a delivery creation request.
///
/// The first failing check wins:
///
/// 1. client CPF checksum
/// 2. `peso` present and positive
/// 3. `endereco` present
/// 4. `cidade` present
/// 5. client `nome` present
/// 6. client `cpf` present
///
/// # Errors
///
/// Returns the first `ValidationError` encountered.
pub fn validate_new_delivery(
    delivery: &DeliveryInput,
    client: &ClientInput,
) -> Result<(NewClient, DeliveryDetails), ValidationError> {
    if Cpf::parse(&client.cpf).is_err() {
        return Err(ValidationError::InvalidCpf);
    }
    let details = validate_details(delivery)?;
    let client = validate_client(client)?;
    Ok((client, details))
}

/// Delivery operations.
pub struct DeliveryService<'a> {
    store: &'a dyn Store,
}

impl<'a> DeliveryService<'a> {
    /// Create a new delivery service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Validate the request, resolve its client by CPF and persist the
    /// delivery under that client.
    ///
    /// An existing client with the same CPF is reused as-is; otherwise the
    /// request's client is registered. Returns the new delivery's ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` per [`validate_new_delivery`].
    /// Returns `ServiceError::Storage` if resolution or the insert fails.
    #[instrument(skip_all)]
    pub async fn create(&self, request: &CreateDeliveryRequest) -> Result<DeliveryId, ServiceError> {
        let (client, details) = validate_new_delivery(&request.delivery, &request.client)?;

        let delivery = self.store.create_delivery(&client, &details).await?;

        info!(
            delivery_id = %delivery.id,
            client_id = %delivery.client_id,
            "Delivery created"
        );
        Ok(delivery.id)
    }

    /// Find the client registered under `candidate.cpf`, registering
    /// `candidate` if there is none.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn resolve_client(&self, candidate: &NewClient) -> Result<ClientId, ServiceError> {
        Ok(self.store.resolve_client(candidate).await?)
    }

    /// List every delivery.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn list(&self) -> Result<Vec<Delivery>, ServiceError> {
        Ok(self.store.list_deliveries().await?)
    }

    /// Get a delivery by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::DeliveryNotFound` if there is no such delivery.
    pub async fn get(&self, id: DeliveryId) -> Result<Delivery, ServiceError> {
        self.store
            .get_delivery(id)
            .await?
            .ok_or(ServiceError::DeliveryNotFound)
    }

    /// List deliveries whose city is exactly `city`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingQueryParam` if `city` is empty.
    pub async fn list_by_city(&self, city: &str) -> Result<Vec<Delivery>, ServiceError> {
        if city.is_empty() {
            return Err(ValidationError::MissingQueryParam("cidade").into());
        }
        Ok(self.store.list_deliveries_by_city(city).await?)
    }

    /// Overwrite the delivery `id` with `input`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for bad weight, address, city or a
    /// missing `cliente_id`.
    /// Returns `ServiceError::DeliveryNotFound` if the delivery doesn't exist.
    /// Returns `ServiceError::UnknownClient` if `cliente_id` references no client.
    pub async fn update(
        &self,
        id: DeliveryId,
        input: &DeliveryInput,
    ) -> Result<Delivery, ServiceError> {
        let details = validate_details(input)?;
        let client_id = input
            .client_id
            .ok_or(ValidationError::MissingField("cliente_id"))?;

        let delivery = self
            .store
            .update_delivery(id, client_id, &details)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::DeliveryNotFound,
                RepositoryError::Conflict(_) => ServiceError::UnknownClient,
                other => ServiceError::Storage(other),
            })?;

        info!(delivery_id = %id, "Delivery updated");
        Ok(delivery)
    }

    /// Delete a delivery. Deleting an unknown delivery is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn delete(&self, id: DeliveryId) -> Result<(), ServiceError> {
        if self.store.delete_delivery(id).await? {
            info!(delivery_id = %id, "Delivery deleted");
        } else {
            debug!(delivery_id = %id, "Delivery already absent");
        }
        Ok(())
    }
}
