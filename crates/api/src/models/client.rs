//! Client domain types.

use serde::{Deserialize, Serialize};

use deliveries_core::{ClientId, Cpf};

/// A stored client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Store-assigned client ID.
    pub id: ClientId,
    /// Full name.
    #[serde(rename = "nome")]
    pub name: String,
    /// CPF in normalized form (11 digits). Unique across clients.
    pub cpf: Cpf,
    /// Contact email (not validated).
    pub email: String,
    /// Contact phone (not validated).
    #[serde(rename = "telefone")]
    pub phone: String,
}

/// Client fields as sent by the caller.
///
/// Every field is optional on the wire; missing or `null` strings decode as
/// empty so validation can report which field is missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientInput {
    /// Present on updates, ignored on creation.
    pub id: Option<ClientId>,
    #[serde(rename = "nome", deserialize_with = "super::null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub cpf: String,
    #[serde(deserialize_with = "super::null_as_default")]
    pub email: String,
    #[serde(rename = "telefone", deserialize_with = "super::null_as_default")]
    pub phone: String,
}

/// A validated client candidate, ready to be inserted or resolved by CPF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub cpf: Cpf,
    pub email: String,
    pub phone: String,
}

impl NewClient {
    /// Attach a store-assigned ID.
    #[must_use]
    pub fn with_id(self, id: ClientId) -> Client {
        Client {
            id,
            name: self.name,
            cpf: self.cpf,
            email: self.email,
            phone: self.phone,
        }
    }
}
