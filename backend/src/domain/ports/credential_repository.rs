//! Port abstraction for credential persistence adapters and their errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::credential::{Credential, VerificationCode};

/// Persistence errors raised by credential store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialStoreError {
    /// Store connection could not be established.
    #[error("credential store connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("credential store query failed: {message}")]
    Query { message: String },
    /// The email address is already registered (unique constraint).
    #[error("email address already registered")]
    DuplicateEmail,
}

impl CredentialStoreError {
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

/// Driven port persisting user identity and verification state.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// Insert a new credential record.
    ///
    /// Email uniqueness is the store's constraint; a duplicate insert fails
    /// with [`CredentialStoreError::DuplicateEmail`].
    async fn insert(&self, credential: &Credential) -> Result<(), CredentialStoreError>;

    /// Fetch a credential by exact email match (addresses are stored
    /// lowercased).
    async fn find_by_email(&self, email: &str)
        -> Result<Option<Credential>, CredentialStoreError>;

    /// Replace the pending verification code and its expiry.
    async fn set_pending_code(
        &self,
        id: Uuid,
        code: &VerificationCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError>;

    /// Clear both verification code fields without verifying.
    async fn clear_code(&self, id: Uuid) -> Result<(), CredentialStoreError>;

    /// Flip the verified flag and clear both code fields.
    async fn mark_verified(&self, id: Uuid) -> Result<(), CredentialStoreError>;

    /// Delete the credential and every contribution it owns.
    ///
    /// Adapters with transactional storage perform both deletions in a
    /// single transaction; contributions go first either way so a partial
    /// failure leaves orphaned reviews rather than an undeletable account.
    async fn delete_cascade(&self, id: Uuid) -> Result<(), CredentialStoreError>;
}
