//! Delivery repository for `PostgreSQL`.

use sqlx::{PgExecutor, PgPool};

use deliveries_core::{ClientId, DeliveryId};

use super::RepositoryError;
use super::clients::resolve_client_id;
use crate::models::{Delivery, DeliveryDetails, NewClient};

const UNKNOWN_CLIENT: &str = "client does not exist";

const DELIVERY_COLUMNS: &str = "id, cliente_id, peso, endereco, logradouro, numero, bairro, \
                                complemento, cidade, estado, pais, latitude, longitude";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for delivery queries.
#[derive(Debug, sqlx::FromRow)]
struct DeliveryRow {
    id: i32,
    cliente_id: i32,
    peso: f64,
    endereco: String,
    logradouro: Option<String>,
    numero: Option<String>,
    bairro: Option<String>,
    complemento: Option<String>,
    cidade: String,
    estado: Option<String>,
    pais: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl From<DeliveryRow> for Delivery {
    fn from(row: DeliveryRow) -> Self {
        Self {
            id: DeliveryId::new(row.id),
            client_id: ClientId::new(row.cliente_id),
            details: DeliveryDetails {
                weight: row.peso,
                address: row.endereco,
                street: row.logradouro.unwrap_or_default(),
                number: row.numero.unwrap_or_default(),
                neighborhood: row.bairro.unwrap_or_default(),
                complement: row.complemento.unwrap_or_default(),
                city: row.cidade,
                state: row.estado.unwrap_or_default(),
                country: row.pais.unwrap_or_default(),
                latitude: row.latitude,
                longitude: row.longitude,
            },
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for delivery database operations.
pub struct DeliveryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DeliveryRepository<'a> {
    /// Create a new delivery repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Resolve the owning client by CPF and insert the delivery.
    ///
    /// Client resolution and the insert share one transaction, so a failed
    /// insert never leaves a freshly created client behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create_for_client(
        &self,
        client: &NewClient,
        details: &DeliveryDetails,
    ) -> Result<Delivery, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let client_id = resolve_client_id(&mut *tx, client).await?;
        let delivery = insert(&mut *tx, client_id, details).await?;

        tx.commit().await?;

        Ok(delivery)
    }

    /// List all deliveries ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Delivery>, RepositoryError> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM entrega ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Delivery::from).collect())
    }

    /// Get a delivery by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: DeliveryId) -> Result<Option<Delivery>, RepositoryError> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM entrega WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Delivery::from))
    }

    /// List deliveries in a city (exact match), ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_city(&self, city: &str) -> Result<Vec<Delivery>, RepositoryError> {
        let rows = sqlx::query_as::<_, DeliveryRow>(&format!(
            "SELECT {DELIVERY_COLUMNS} FROM entrega WHERE cidade = $1 ORDER BY id"
        ))
        .bind(city)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Delivery::from).collect())
    }

    /// Overwrite an existing delivery.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the delivery doesn't exist.
    /// Returns `RepositoryError::Conflict` if `client_id` references no client.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: DeliveryId,
        client_id: ClientId,
        details: &DeliveryDetails,
    ) -> Result<Delivery, RepositoryError> {
        let row = sqlx::query_as::<_, DeliveryRow>(&format!(
            r"
            UPDATE entrega
            SET cliente_id = $1, peso = $2, endereco = $3, logradouro = $4, numero = $5,
                bairro = $6, complemento = $7, cidade = $8, estado = $9, pais = $10,
                latitude = $11, longitude = $12
            WHERE id = $13
            RETURNING {DELIVERY_COLUMNS}
            "
        ))
        .bind(client_id)
        .bind(details.weight)
        .bind(&details.address)
        .bind(&details.street)
        .bind(&details.number)
        .bind(&details.neighborhood)
        .bind(&details.complement)
        .bind(&details.city)
        .bind(&details.state)
        .bind(&details.country)
        .bind(details.latitude)
        .bind(details.longitude)
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, UNKNOWN_CLIENT))?;

        row.map(Delivery::from).ok_or(RepositoryError::NotFound)
    }

    /// Delete a delivery by ID.
    ///
    /// Returns `true` if the delivery was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: DeliveryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM entrega WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Insert a delivery for an already-resolved client.
async fn insert<'e, E>(
    executor: E,
    client_id: ClientId,
    details: &DeliveryDetails,
) -> Result<Delivery, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query_as::<_, DeliveryRow>(&format!(
        r"
        INSERT INTO entrega (cliente_id, peso, endereco, logradouro, numero, bairro,
                             complemento, cidade, estado, pais, latitude, longitude)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING {DELIVERY_COLUMNS}
        "
    ))
    .bind(client_id)
    .bind(details.weight)
    .bind(&details.address)
    .bind(&details.street)
    .bind(&details.number)
    .bind(&details.neighborhood)
    .bind(&details.complement)
    .bind(&details.city)
    .bind(&details.state)
    .bind(&details.country)
    .bind(details.latitude)
    .bind(details.longitude)
    .fetch_one(executor)
    .await
    .map_err(|e| RepositoryError::from_write(e, UNKNOWN_CLIENT))?;

    Ok(row.into())
}
