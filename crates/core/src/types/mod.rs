//! Core types for the deliveries backend.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cpf;
pub mod id;

pub use cpf::{Cpf, CpfError, normalize_cpf, validate_cpf};
pub use id::*;
