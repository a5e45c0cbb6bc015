//! Client repository for `PostgreSQL`.
//!
//! Queries are checked at runtime (`query_as` with `FromRow` rows) because
//! the schema lives outside this repository.

use sqlx::{PgExecutor, PgPool};

use deliveries_core::{ClientId, Cpf};

use super::RepositoryError;
use crate::models::{Client, NewClient};

const DUPLICATE_CPF: &str = "cpf already registered";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for client queries.
#[derive(Debug, sqlx::FromRow)]
struct ClientRow {
    id: i32,
    nome: String,
    cpf: Cpf,
    email: Option<String>,
    telefone: Option<String>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            id: ClientId::new(row.id),
            name: row.nome,
            cpf: row.cpf,
            email: row.email.unwrap_or_default(),
            phone: row.telefone.unwrap_or_default(),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for client database operations.
pub struct ClientRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ClientRepository<'a> {
    /// Create a new client repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the CPF is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, client: &NewClient) -> Result<Client, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(
            r"
            INSERT INTO cliente (nome, cpf, email, telefone)
            VALUES ($1, $2, $3, $4)
            RETURNING id, nome, cpf, email, telefone
            ",
        )
        .bind(&client.name)
        .bind(&client.cpf)
        .bind(&client.email)
        .bind(&client.phone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, DUPLICATE_CPF))?;

        Ok(row.into())
    }

    /// List all clients ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Client>, RepositoryError> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r"
            SELECT id, nome, cpf, email, telefone
            FROM cliente
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    /// Get a client by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ClientId) -> Result<Option<Client>, RepositoryError> {
        let row = sqlx::query_as::<_, ClientRow>(
            r"
            SELECT id, nome, cpf, email, telefone
            FROM cliente
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Client::from))
    }

    /// Overwrite an existing client.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the client doesn't exist.
    /// Returns `RepositoryError::Conflict` if the CPF belongs to another client.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(&self, client: &Client) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cliente
            SET nome = $1, cpf = $2, email = $3, telefone = $4
            WHERE id = $5
            ",
        )
        .bind(&client.name)
        .bind(&client.cpf)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(client.id)
        .execute(self.pool)
        .await
        .map_err(|e| RepositoryError::from_write(e, DUPLICATE_CPF))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a client together with all of its deliveries.
    ///
    /// Both deletes run in one transaction. Returns the number of deliveries
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either delete fails; nothing is
    /// removed in that case.
    pub async fn delete_with_deliveries(&self, id: ClientId) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deliveries = sqlx::query("DELETE FROM entrega WHERE cliente_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM cliente WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(deliveries)
    }

    /// Find-or-create a client by CPF, see [`resolve_client_id`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the statement fails.
    pub async fn resolve(&self, candidate: &NewClient) -> Result<ClientId, RepositoryError> {
        resolve_client_id(self.pool, candidate).await
    }
}

/// Return the ID of the client with `candidate.cpf`, inserting `candidate`
/// if there is none.
///
/// Runs as a single upsert against the unique index on `cpf`, so two
/// concurrent callers with the same new CPF get the same row. The no-op
/// `DO UPDATE` makes `RETURNING` yield the existing ID without modifying the
/// stored name, email or phone.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the statement fails.
pub(crate) async fn resolve_client_id<'e, E>(
    executor: E,
    candidate: &NewClient,
) -> Result<ClientId, RepositoryError>
where
    E: PgExecutor<'e>,
{
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO cliente (nome, cpf, email, telefone)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (cpf) DO UPDATE SET cpf = EXCLUDED.cpf
        RETURNING id
        ",
    )
    .bind(&candidate.name)
    .bind(&candidate.cpf)
    .bind(&candidate.email)
    .bind(&candidate.phone)
    .fetch_one(executor)
    .await?;

    Ok(ClientId::new(id))
}
