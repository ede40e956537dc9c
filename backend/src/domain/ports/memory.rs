//! In-memory adapters for the persistence ports.
//!
//! These back the integration tests and the database-less development server
//! the same way fixture ports do elsewhere in the tree. Both repositories
//! share one [`MemoryStore`] so cascading deletes span the two record types.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::contribution::{Contribution, ContributionWithAuthor};
use crate::domain::credential::{Credential, VerificationCode, VerificationStatus};

use super::contribution_repository::{ContributionRepository, ContributionStoreError};
use super::credential_repository::{CredentialRepository, CredentialStoreError};

#[derive(Debug, Default)]
struct MemoryState {
    credentials: Vec<Credential>,
    contributions: Vec<Contribution>,
}

/// Shared in-memory backing store for both repositories.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Number of stored credentials, for test assertions.
    pub fn credential_count(&self) -> usize {
        self.lock().credentials.len()
    }

    /// Number of stored contributions, for test assertions.
    pub fn contribution_count(&self) -> usize {
        self.lock().contributions.len()
    }
}

/// In-memory [`CredentialRepository`].
#[derive(Debug, Clone)]
pub struct MemoryCredentialRepository {
    store: Arc<MemoryStore>,
}

impl MemoryCredentialRepository {
    /// Create a repository over the shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

fn missing_credential() -> CredentialStoreError {
    CredentialStoreError::query("credential not found")
}

#[async_trait]
impl CredentialRepository for MemoryCredentialRepository {
    async fn insert(&self, credential: &Credential) -> Result<(), CredentialStoreError> {
        let mut state = self.store.lock();
        if state
            .credentials
            .iter()
            .any(|existing| existing.email == credential.email)
        {
            return Err(CredentialStoreError::DuplicateEmail);
        }
        state.credentials.push(credential.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credential>, CredentialStoreError> {
        let state = self.store.lock();
        Ok(state
            .credentials
            .iter()
            .find(|credential| credential.email.as_ref() == email)
            .cloned())
    }

    async fn set_pending_code(
        &self,
        id: Uuid,
        code: &VerificationCode,
        expires_at: DateTime<Utc>,
    ) -> Result<(), CredentialStoreError> {
        let mut state = self.store.lock();
        let credential = state
            .credentials
            .iter_mut()
            .find(|credential| credential.id == id)
            .ok_or_else(missing_credential)?;
        credential.status = VerificationStatus::Pending {
            code: code.clone(),
            expires_at,
        };
        Ok(())
    }

    async fn clear_code(&self, id: Uuid) -> Result<(), CredentialStoreError> {
        let mut state = self.store.lock();
        let credential = state
            .credentials
            .iter_mut()
            .find(|credential| credential.id == id)
            .ok_or_else(missing_credential)?;
        if !credential.is_verified() {
            credential.status = VerificationStatus::CodeCleared;
        }
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), CredentialStoreError> {
        let mut state = self.store.lock();
        let credential = state
            .credentials
            .iter_mut()
            .find(|credential| credential.id == id)
            .ok_or_else(missing_credential)?;
        credential.status = VerificationStatus::Verified;
        Ok(())
    }

    async fn delete_cascade(&self, id: Uuid) -> Result<(), CredentialStoreError> {
        let mut state = self.store.lock();
        state
            .contributions
            .retain(|contribution| contribution.owner_id != id);
        state.credentials.retain(|credential| credential.id != id);
        Ok(())
    }
}

/// In-memory [`ContributionRepository`].
#[derive(Debug, Clone)]
pub struct MemoryContributionRepository {
    store: Arc<MemoryStore>,
}

impl MemoryContributionRepository {
    /// Create a repository over the shared store.
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self { store }
    }
}

fn with_author(state: &MemoryState, contribution: &Contribution) -> ContributionWithAuthor {
    let reviewer_name = state
        .credentials
        .iter()
        .find(|credential| credential.id == contribution.owner_id)
        .map(|credential| credential.name.as_ref().to_owned())
        .unwrap_or_default();
    ContributionWithAuthor {
        contribution: contribution.clone(),
        reviewer_name,
    }
}

#[async_trait]
impl ContributionRepository for MemoryContributionRepository {
    async fn insert(&self, contribution: &Contribution) -> Result<(), ContributionStoreError> {
        let mut stored = contribution.clone();
        stored.faculty_email = stored.faculty_email.to_lowercase();
        self.store.lock().contributions.push(stored);
        Ok(())
    }

    async fn exists_for_faculty(
        &self,
        owner_id: Uuid,
        faculty_email: &str,
    ) -> Result<bool, ContributionStoreError> {
        let state = self.store.lock();
        Ok(state.contributions.iter().any(|contribution| {
            contribution.owner_id == owner_id && contribution.faculty_email == faculty_email
        }))
    }

    async fn list_for_owner(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<ContributionWithAuthor>, ContributionStoreError> {
        let state = self.store.lock();
        Ok(state
            .contributions
            .iter()
            .filter(|contribution| contribution.owner_id == owner_id)
            .map(|contribution| with_author(&state, contribution))
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<ContributionWithAuthor>, ContributionStoreError> {
        let state = self.store.lock();
        Ok(state
            .contributions
            .iter()
            .map(|contribution| with_author(&state, contribution))
            .collect())
    }

    async fn search(
        &self,
        query: &str,
    ) -> Result<Vec<ContributionWithAuthor>, ContributionStoreError> {
        let needle = query.to_lowercase();
        let state = self.store.lock();
        Ok(state
            .contributions
            .iter()
            .filter(|contribution| {
                contribution.faculty_name.to_lowercase().contains(&needle)
                    || contribution.faculty_email.to_lowercase().contains(&needle)
            })
            .map(|contribution| with_author(&state, contribution))
            .collect())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool, ContributionStoreError> {
        let mut state = self.store.lock();
        let before = state.contributions.len();
        state.contributions.retain(|contribution| contribution.id != id);
        Ok(state.contributions.len() < before)
    }
}
