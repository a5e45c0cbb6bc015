//! Client and delivery registry API.
//!
//! This crate provides the HTTP service as a library so it can be driven by
//! the binary and by the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
