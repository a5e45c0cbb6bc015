//! `PostgreSQL` implementation of [`Store`].

use async_trait::async_trait;
use sqlx::PgPool;

use deliveries_core::{ClientId, DeliveryId};

use super::{ClientRepository, DeliveryRepository, RepositoryError, Store};
use crate::models::{Client, Delivery, DeliveryDetails, NewClient};

/// [`Store`] backed by a `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    const fn clients(&self) -> ClientRepository<'_> {
        ClientRepository::new(&self.pool)
    }

    const fn deliveries(&self) -> DeliveryRepository<'_> {
        DeliveryRepository::new(&self.pool)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_client(&self, client: &NewClient) -> Result<Client, RepositoryError> {
        self.clients().create(client).await
    }

    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError> {
        self.clients().list().await
    }

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        self.clients().get_by_id(id).await
    }

    async fn update_client(&self, client: &Client) -> Result<(), RepositoryError> {
        self.clients().update(client).await
    }

    async fn delete_client(&self, id: ClientId) -> Result<u64, RepositoryError> {
        self.clients().delete_with_deliveries(id).await
    }

    async fn resolve_client(&self, candidate: &NewClient) -> Result<ClientId, RepositoryError> {
        self.clients().resolve(candidate).await
    }

    async fn create_delivery(
        &self,
        client: &NewClient,
        details: &DeliveryDetails,
    ) -> Result<Delivery, RepositoryError> {
        self.deliveries().create_for_client(client, details).await
    }

    async fn list_deliveries(&self) -> Result<Vec<Delivery>, RepositoryError> {
        self.deliveries().list().await
    }

    async fn get_delivery(&self, id: DeliveryId) -> Result<Option<Delivery>, RepositoryError> {
        self.deliveries().get_by_id(id).await
    }

    async fn list_deliveries_by_city(&self, city: &str) -> Result<Vec<Delivery>, RepositoryError> {
        self.deliveries().list_by_city(city).await
    }

    async fn update_delivery(
        &self,
        id: DeliveryId,
        client_id: ClientId,
        details: &DeliveryDetails,
    ) -> Result<Delivery, RepositoryError> {
        self.deliveries().update(id, client_id, details).await
    }

    async fn delete_delivery(&self, id: DeliveryId) -> Result<bool, RepositoryError> {
        self.deliveries().delete(id).await
    }
}
