//! In-memory implementation of [`Store`].
//!
//! Mirrors the `PostgreSQL` constraints (unique CPF, delivery → client
//! reference) so services behave the same on both backends. Every operation
//! holds the lock for its whole duration, which gives the same atomicity as
//! the single-statement upsert and the delete transaction in `PgStore`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use deliveries_core::{ClientId, DeliveryId};

use super::{RepositoryError, Store};
use crate::models::{Client, Delivery, DeliveryDetails, NewClient};

/// [`Store`] that keeps clients and deliveries in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    clients: BTreeMap<ClientId, Client>,
    deliveries: BTreeMap<DeliveryId, Delivery>,
    last_client_id: i32,
    last_delivery_id: i32,
}

impl MemoryState {
    fn client_by_cpf(&self, candidate: &NewClient) -> Option<&Client> {
        self.clients.values().find(|c| c.cpf == candidate.cpf)
    }

    fn insert_client(&mut self, candidate: &NewClient) -> Client {
        self.last_client_id += 1;
        let client = candidate.clone().with_id(ClientId::new(self.last_client_id));
        self.clients.insert(client.id, client.clone());
        client
    }

    fn resolve(&mut self, candidate: &NewClient) -> ClientId {
        match self.client_by_cpf(candidate) {
            Some(existing) => existing.id,
            None => self.insert_client(candidate).id,
        }
    }
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn create_client(&self, client: &NewClient) -> Result<Client, RepositoryError> {
        let mut state = self.state.write().await;
        if state.client_by_cpf(client).is_some() {
            return Err(RepositoryError::Conflict("cpf already registered".to_owned()));
        }
        Ok(state.insert_client(client))
    }

    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        Ok(self.state.read().await.clients.values().cloned().collect())
    }

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        Ok(self.state.read().await.clients.get(&id).cloned())
    }

    async fn update_client(&self, client: &Client) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if !state.clients.contains_key(&client.id) {
            return Err(RepositoryError::NotFound);
        }
        if state
            .clients
            .values()
            .any(|other| other.id != client.id && other.cpf == client.cpf)
        {
            return Err(RepositoryError::Conflict("cpf already registered".to_owned()));
        }
        state.clients.insert(client.id, client.clone());
        Ok(())
    }

    async fn delete_client(&self, id: ClientId) -> Result<u64, RepositoryError> {
        let mut state = self.state.write().await;
        let before = state.deliveries.len();
        state.deliveries.retain(|_, delivery| delivery.client_id != id);
        let removed = before - state.deliveries.len();
        state.clients.remove(&id);
        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    async fn resolve_client(&self, candidate: &NewClient) -> Result<ClientId, RepositoryError> {
        Ok(self.state.write().await.resolve(candidate))
    }

    async fn create_delivery(
        &self,
        client: &NewClient,
        details: &DeliveryDetails,
    ) -> Result<Delivery, RepositoryError> {
        let mut state = self.state.write().await;
        let client_id = state.resolve(client);

        state.last_delivery_id += 1;
        let delivery = Delivery {
            id: DeliveryId::new(state.last_delivery_id),
            client_id,
            details: details.clone(),
        };
        state.deliveries.insert(delivery.id, delivery.clone());
        Ok(delivery)
    }

    async fn list_deliveries(&self) -> Result<Vec<Delivery>, RepositoryError> {
        Ok(self.state.read().await.deliveries.values().cloned().collect())
    }

    async fn get_delivery(&self, id: DeliveryId) -> Result<Option<Delivery>, RepositoryError> {
        Ok(self.state.read().await.deliveries.get(&id).cloned())
    }

    async fn list_deliveries_by_city(&self, city: &str) -> Result<Vec<Delivery>, RepositoryError> {
        Ok(self
            .state
            .read()
            .await
            .deliveries
            .values()
            .filter(|delivery| delivery.details.city == city)
            .cloned()
            .collect())
    }

    async fn update_delivery(
        &self,
        id: DeliveryId,
        client_id: ClientId,
        details: &DeliveryDetails,
    ) -> Result<Delivery, RepositoryError> {
        let mut state = self.state.write().await;
        if !state.clients.contains_key(&client_id) {
            return Err(RepositoryError::Conflict("client does not exist".to_owned()));
        }
        let delivery = state
            .deliveries
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        delivery.client_id = client_id;
        delivery.details = details.clone();
        Ok(delivery.clone())
    }

    async fn delete_delivery(&self, id: DeliveryId) -> Result<bool, RepositoryError> {
        Ok(self.state.write().await.deliveries.remove(&id).is_some())
    }
}
