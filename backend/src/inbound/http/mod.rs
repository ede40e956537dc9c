//! HTTP inbound adapter exposing REST endpoints.

pub mod accounts;
pub mod admin;
pub mod auth;
pub mod contributions;
pub mod error;
pub mod health;
pub mod rate_limit;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
