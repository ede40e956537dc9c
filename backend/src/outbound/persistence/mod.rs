//! PostgreSQL persistence adapters.
//!
//! The Diesel repositories implement the domain's storage ports over an
//! async connection pool. Schema and row types stay private to this module;
//! only the pool and the repositories are exposed.

mod diesel_contribution_repository;
mod diesel_credential_repository;
mod error_mapping;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_contribution_repository::DieselContributionRepository;
pub use diesel_credential_repository::DieselCredentialRepository;
pub use migrations::run_pending_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
