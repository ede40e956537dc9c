//! Outbound adapters for persistence and email dispatch.

pub mod email;
pub mod persistence;
