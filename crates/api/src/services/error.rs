//! Service-layer error types.
//!
//! The `Display` text of these errors is what callers see in the `error`
//! field of a failed response, so the messages are kept verbatim.

use thiserror::Error;

use crate::db::RepositoryError;

/// A request that decoded fine but breaks a domain rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The client's CPF fails the checksum.
    #[error("CPF inválido")]
    InvalidCpf,

    /// A numeric field is absent or not strictly positive.
    #[error("O campo '{0}' é obrigatório e deve ser maior que zero")]
    MissingOrInvalidField(&'static str),

    /// A required delivery field is absent or empty.
    #[error("O campo '{0}' é obrigatório")]
    MissingField(&'static str),

    /// A required client field is absent or empty.
    #[error("O campo '{0}' do cliente é obrigatório")]
    MissingClientField(&'static str),

    /// An ID in the path or body is missing or not an integer.
    #[error("ID inválido")]
    InvalidId,

    /// A required query parameter is absent or empty.
    #[error("O parâmetro '{0}' é obrigatório")]
    MissingQueryParam(&'static str),
}

/// Errors returned by [`ClientService`](super::ClientService) and
/// [`DeliveryService`](super::DeliveryService).
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cliente não encontrado")]
    ClientNotFound,

    #[error("Entrega não encontrada")]
    DeliveryNotFound,

    /// Another client already holds this CPF.
    #[error("CPF já cadastrado")]
    DuplicateCpf,

    /// `cliente_id` on a delivery update references no client.
    #[error("Cliente informado não existe")]
    UnknownClient,

    /// Storage failure; never shown to the caller.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}
