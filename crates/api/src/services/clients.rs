//! Client service.

use deliveries_core::{ClientId, Cpf};
use tracing::{debug, info};

use super::{ServiceError, ValidationError};
use crate::db::{RepositoryError, Store};
use crate::models::{Client, ClientInput, NewClient};

/// Validate caller-supplied client fields.
///
/// Checks run in order: name present, CPF present, CPF checksum. The CPF
/// is normalized on success.
///
/// # Errors
///
/// Returns the first `ValidationError` encountered.
pub fn validate_client(input: &ClientInput) -> Result<NewClient, ValidationError> {
    if input.name.is_empty() {
        return Err(ValidationError::MissingClientField("nome"));
    }
    if input.cpf.is_empty() {
        return Err(ValidationError::MissingClientField("cpf"));
    }
    let cpf = Cpf::parse(&input.cpf).map_err(|_| ValidationError::InvalidCpf)?;

    Ok(NewClient {
        name: input.name.clone(),
        cpf,
        email: input.email.clone(),
        phone: input.phone.clone(),
    })
}

/// Client CRUD operations.
pub struct ClientService<'a> {
    store: &'a dyn Store,
}

impl<'a> ClientService<'a> {
    /// Create a new client service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Register a new client.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a missing name or bad CPF.
    /// Returns `ServiceError::DuplicateCpf` if the CPF is already registered.
    pub async fn create(&self, input: &ClientInput) -> Result<Client, ServiceError> {
        let candidate = validate_client(input)?;

        let client = self
            .store
            .create_client(&candidate)
            .await
            .map_err(duplicate_cpf)?;

        info!(client_id = %client.id, "Client created");
        Ok(client)
    }

    /// List every client.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails.
    pub async fn list(&self) -> Result<Vec<Client>, ServiceError> {
        Ok(self.store.list_clients().await?)
    }

    /// Get a client by ID.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::ClientNotFound` if there is no such client.
    pub async fn get(&self, id: ClientId) -> Result<Client, ServiceError> {
        self.store
            .get_client(id)
            .await?
            .ok_or(ServiceError::ClientNotFound)
    }

    /// Overwrite the client identified by `input.id`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidId` if the body carries no ID.
    /// Returns `ServiceError::ClientNotFound` if the client doesn't exist.
    /// Returns `ServiceError::DuplicateCpf` if the CPF belongs to another client.
    pub async fn update(&self, input: &ClientInput) -> Result<Client, ServiceError> {
        let id = input.id.ok_or(ValidationError::InvalidId)?;
        let client = validate_client(input)?.with_id(id);

        self.store
            .update_client(&client)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => ServiceError::ClientNotFound,
                other => duplicate_cpf(other),
            })?;

        info!(client_id = %id, "Client updated");
        Ok(client)
    }

    /// Delete a client and all of its deliveries.
    ///
    /// Deleting an unknown client is a no-op. Returns the number of
    /// deliveries removed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Storage` if the store fails; nothing is removed
    /// in that case.
    pub async fn delete(&self, id: ClientId) -> Result<u64, ServiceError> {
        let deliveries = self.store.delete_client(id).await?;
        if deliveries == 0 {
            debug!(client_id = %id, "Client deleted without deliveries");
        } else {
            info!(client_id = %id, deliveries, "Client deleted with deliveries");
        }
        Ok(deliveries)
    }
}

fn duplicate_cpf(err: RepositoryError) -> ServiceError {
    match err {
        RepositoryError::Conflict(_) => ServiceError::DuplicateCpf,
        other => ServiceError::Storage(other),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn input(name: &str, cpf: &str) -> ClientInput {
        ClientInput {
            id: None,
            name: name.to_string(),
            cpf: cpf.to_string(),
            email: "maria@example.com".to_string(),
            phone: "81 99999-0000".to_string(),
        }
    }

    #[test]
    fn test_validate_client_order() {
        assert_eq!(
            validate_client(&input("", "")),
            Err(ValidationError::MissingClientField("nome"))
        );
        assert_eq!(
            validate_client(&input("Maria", "")),
            Err(ValidationError::MissingClientField("cpf"))
        );
        assert_eq!(
            validate_client(&input(" ", " ")),
            Err(ValidationError::InvalidCpf)
        );
        assert_eq!(
            validate_client(&input("Maria", "123.456.789-00")),
            Err(ValidationError::InvalidCpf)
        );
    }

    #[test]
    fn test_validate_client_normalizes_cpf() {
        let client = validate_client(&input("Maria", "529.982.247-25")).unwrap();
        assert_eq!(client.cpf.as_str(), "52998224725");
        assert_eq!(client.name, "Maria");
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryStore::new();
        let service = ClientService::new(&store);

        let created = service.create(&input("Maria", "529.982.247-25")).await.unwrap();
        let fetched = service.get(created.id).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(service.list().await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_create_duplicate_cpf() {
        let store = MemoryStore::new();
        let service = ClientService::new(&store);

        service.create(&input("Maria", "52998224725")).await.unwrap();
        let err = service
            .create(&input("Joana", "529.982.247-25"))
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::DuplicateCpf));
    }

    #[tokio::test]
    async fn test_get_missing_client() {
        let store = MemoryStore::new();
        let err = ClientService::new(&store)
            .get(ClientId::new(7))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::ClientNotFound));
    }

    #[tokio::test]
    async fn test_update_requires_id_and_existing_client() {
        let store = MemoryStore::new();
        let service = ClientService::new(&store);

        let err = service.update(&input("Maria", "52998224725")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation(ValidationError::InvalidId)
        ));

        let ghost = ClientInput {
            id: Some(ClientId::new(3)),
            ..input("Maria", "52998224725")
        };
        let err = service.update(&ghost).await.unwrap_err();
        assert!(matches!(err, ServiceError::ClientNotFound));
    }

    #[tokio::test]
    async fn test_update_overwrites_fields() {
        let store = MemoryStore::new();
        let service = ClientService::new(&store);
        let created = service.create(&input("Maria", "52998224725")).await.unwrap();

        let changed = ClientInput {
            id: Some(created.id),
            email: "nova@example.com".to_string(),
            ..input("Maria Silva", "111.444.777-35")
        };
        let updated = service.update(&changed).await.unwrap();

        assert_eq!(updated.name, "Maria Silva");
        assert_eq!(updated.cpf.as_str(), "11144477735");
        assert_eq!(service.get(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_delete_unknown_client_succeeds() {
        let store = MemoryStore::new();
        let removed = ClientService::new(&store)
            .delete(ClientId::new(99))
            .await
            .unwrap();
        assert_eq!(removed, 0);
    }
}
