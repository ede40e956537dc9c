//! Core domain model and use-case services.
//!
//! Everything in here is transport and storage agnostic: services depend on
//! the driven ports in [`ports`], and adapters live under `outbound`.

pub mod admin;
pub mod contribution;
pub mod contribution_service;
pub mod credential;
mod error;
pub mod login;
pub mod ports;
pub mod registration;
pub mod search;
pub mod token;

pub use error::{Error, ErrorCode};
