//! Administrative gate: shared-password auth and targeted deletion.

use std::sync::Arc;

use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::ports::{
    ContributionRepository, ContributionStoreError, CredentialRepository, CredentialStoreError,
};
use super::Error;

fn map_credential_error(error: CredentialStoreError) -> Error {
    match error {
        CredentialStoreError::Connection { message } => Error::service_unavailable(message),
        other => Error::internal(other.to_string()),
    }
}

fn map_contribution_error(error: ContributionStoreError) -> Error {
    match error {
        ContributionStoreError::Connection { message } => Error::service_unavailable(message),
        ContributionStoreError::Query { message } => Error::internal(message),
    }
}

/// What an admin asked to delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    /// A user account plus everything it owns, addressed by email.
    User(String),
    /// A single review, addressed by id.
    Contribution(Uuid),
}

/// What a delete removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    UserRemoved,
    ContributionRemoved,
}

/// Admin service guarding destructive operations behind a shared password.
#[derive(Clone)]
pub struct AdminService {
    credentials: Arc<dyn CredentialRepository>,
    contributions: Arc<dyn ContributionRepository>,
    password: Arc<str>,
}

impl AdminService {
    /// Create the service with the configured shared password.
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        contributions: Arc<dyn ContributionRepository>,
        password: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            credentials,
            contributions,
            password: password.into(),
        }
    }

    /// Check the shared password in constant time.
    pub fn authenticate(&self, submitted: &str) -> Result<(), Error> {
        let matched: bool = self.password.as_bytes().ct_eq(submitted.as_bytes()).into();
        if matched {
            Ok(())
        } else {
            Err(Error::forbidden("Incorrect admin password."))
        }
    }

    /// Authenticate, then delete the addressed record.
    pub async fn delete(
        &self,
        submitted_password: &str,
        target: DeleteTarget,
    ) -> Result<DeleteOutcome, Error> {
        self.authenticate(submitted_password)?;
        match target {
            DeleteTarget::User(email) => {
                // Matched exactly as submitted; stored addresses are already
                // lowercase, so a mixed-case lookup finds nothing.
                let credential = self
                    .credentials
                    .find_by_email(&email)
                    .await
                    .map_err(map_credential_error)?
                    .ok_or_else(|| Error::not_found("User not found."))?;
                self.credentials
                    .delete_cascade(credential.id)
                    .await
                    .map_err(map_credential_error)?;
                Ok(DeleteOutcome::UserRemoved)
            }
            DeleteTarget::Contribution(id) => {
                let removed = self
                    .contributions
                    .delete_by_id(id)
                    .await
                    .map_err(map_contribution_error)?;
                if removed {
                    Ok(DeleteOutcome::ContributionRemoved)
                } else {
                    Err(Error::not_found("Contribution not found."))
                }
            }
        }
    }
}
