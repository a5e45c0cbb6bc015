//! Storage for clients and deliveries.
//!
//! # Tables (`PostgreSQL`)
//!
//! - `cliente` - Clients, unique on `cpf`
//! - `entrega` - Deliveries, `cliente_id` references `cliente(id)`
//!
//! The schema is managed outside this service; `sql/schema.sql` documents
//! what the queries expect. The unique constraint on `cliente.cpf` is what
//! makes client resolution atomic.
//!
//! # Backends
//!
//! Handlers and services talk to storage through the [`Store`] trait:
//!
//! - [`PgStore`] - `PostgreSQL` via `sqlx`, used in production
//! - [`MemoryStore`] - process-local maps, used for local development and tests

pub mod clients;
pub mod deliveries;
pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use deliveries_core::{ClientId, DeliveryId};

use crate::models::{Client, Delivery, DeliveryDetails, NewClient};

pub use clients::ClientRepository;
pub use deliveries::DeliveryRepository;
pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (unique CPF, unknown client reference).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Classify a write error, turning unique and foreign key violations
    /// into `Conflict` with the given message.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && (db_err.is_unique_violation() || db_err.is_foreign_key_violation())
        {
            return Self::Conflict(conflict.to_owned());
        }
        Self::Database(err)
    }
}

/// Persistence operations for clients and deliveries.
///
/// Implementations must keep two guarantees:
/// - [`Store::resolve_client`] and [`Store::create_delivery`] find-or-create
///   the client atomically, so concurrent requests with the same new CPF
///   end up with a single client row.
/// - [`Store::delete_client`] removes the client's deliveries and the client
///   together or not at all.
#[async_trait]
pub trait Store: Send + Sync {
    /// Check that the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Insert a new client.
    ///
    /// Returns `RepositoryError::Conflict` if the CPF is already registered.
    async fn create_client(&self, client: &NewClient) -> Result<Client, RepositoryError>;

    /// List every client, ordered by ID.
    async fn list_clients(&self) -> Result<Vec<Client>, RepositoryError>;

    /// Get a client by ID.
    async fn get_client(&self, id: ClientId) -> Result<Option<Client>, RepositoryError>;

    /// Overwrite every field of an existing client.
    ///
    /// Returns `RepositoryError::NotFound` if no client has `client.id`, and
    /// `RepositoryError::Conflict` if the new CPF belongs to another client.
    async fn update_client(&self, client: &Client) -> Result<(), RepositoryError>;

    /// Delete a client and all of its deliveries in one transaction.
    ///
    /// Returns the number of deliveries removed. Deleting an unknown client
    /// is not an error.
    async fn delete_client(&self, id: ClientId) -> Result<u64, RepositoryError>;

    /// Return the ID of the client registered under `candidate.cpf`, creating
    /// the client from `candidate` when there is none.
    ///
    /// An existing client is left untouched: the candidate's name, email and
    /// phone are discarded.
    async fn resolve_client(&self, candidate: &NewClient) -> Result<ClientId, RepositoryError>;

    /// Resolve `client` (see [`Store::resolve_client`]) and insert a delivery
    /// owned by it.
    async fn create_delivery(
        &self,
        client: &NewClient,
        details: &DeliveryDetails,
    ) -> Result<Delivery, RepositoryError>;

    /// List every delivery, ordered by ID.
    async fn list_deliveries(&self) -> Result<Vec<Delivery>, RepositoryError>;

    /// Get a delivery by ID.
    async fn get_delivery(&self, id: DeliveryId) -> Result<Option<Delivery>, RepositoryError>;

    /// List deliveries whose city matches `city` exactly.
    async fn list_deliveries_by_city(&self, city: &str) -> Result<Vec<Delivery>, RepositoryError>;

    /// Overwrite every field of an existing delivery.
    ///
    /// Returns `RepositoryError::NotFound` if the delivery doesn't exist and
    /// `RepositoryError::Conflict` if `client_id` references no client.
    async fn update_delivery(
        &self,
        id: DeliveryId,
        client_id: ClientId,
        details: &DeliveryDetails,
    ) -> Result<Delivery, RepositoryError>;

    /// Delete a delivery.
    ///
    /// Returns `true` if the delivery was deleted, `false` if it didn't exist.
    async fn delete_delivery(&self, id: DeliveryId) -> Result<bool, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
