//! Port abstraction for contribution persistence adapters and their errors.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::contribution::{Contribution, ContributionWithAuthor};

/// Persistence errors raised by contribution store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContributionStoreError {
    /// Store connection could not be established.
    #[error("contribution store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("contribution store query failed: {message}")]
    Query { message: String },
}

impl ContributionStoreError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Driven port persisting faculty reviews.
#[async_trait]
pub trait ContributionRepository: Send + Sync {
    /// Persist a new contribution. The faculty email is lowercased on write.
    async fn insert(&self, contribution: &Contribution) -> Result<(), ContributionStoreError>;

    /// Whether the owner already reviewed this faculty email.
    ///
    /// The comparison uses the submitted address as given against stored
    /// (lowercased) values; only the write path lowercases. Together with
    /// the later insert this is a documented check-then-act race.
    async fn exists_for_faculty(
        &self,
        owner_id: Uuid,
        faculty_email: &str,
    ) -> Result<bool, ContributionStoreError>;

    /// All contributions owned by the given user, in storage order, joined
    /// with the owner's display name.
    async fn list_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<ContributionWithAuthor>, ContributionStoreError>;

    /// Every contribution across all users, in storage order.
    async fn list_all(&self) -> Result<Vec<ContributionWithAuthor>, ContributionStoreError>;

    /// Case-insensitive substring match on faculty name or faculty email.
    async fn search(
        &self,
        query: &str,
    ) -> Result<Vec<ContributionWithAuthor>, ContributionStoreError>;

    /// Delete one contribution; returns false when no record matched.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ContributionStoreError>;
}
