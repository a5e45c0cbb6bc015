//! Business logic for clients and deliveries.
//!
//! # Services
//!
//! - `clients` - Client CRUD with name/CPF validation
//! - `deliveries` - Delivery creation workflow (validation + client
//!   resolution by CPF) and delivery CRUD
//!
//! Services borrow the [`Store`](crate::db::Store) for the length of a
//! request and translate storage outcomes into [`ServiceError`].

mod clients;
mod deliveries;
mod error;

pub use clients::{ClientService, validate_client};
pub use deliveries::{DeliveryService, validate_details, validate_new_delivery};
pub use error::{ServiceError, ValidationError};
