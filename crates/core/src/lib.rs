//! Deliveries Core - Shared types library.
//!
//! This crate provides the types shared by the deliveries backend components:
//! - `api` - HTTP backend for clients and their deliveries
//! - `integration-tests` - End-to-end tests against the HTTP router
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs and the CPF taxpayer number

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
