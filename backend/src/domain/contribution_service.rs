//! Contribution write and read use-cases, plus account removal.

use std::sync::Arc;

use uuid::Uuid;

use super::contribution::{
    ContentFilter, Contribution, ContributionValidationError, ContributionWithAuthor, Rating,
    ReviewText,
};
use super::ports::{
    Clock, ContributionRepository, ContributionStoreError, CredentialRepository,
    CredentialStoreError,
};
use super::Error;

fn map_contribution_error(error: ContributionStoreError) -> Error {
    match error {
        ContributionStoreError::Connection { message } => Error::service_unavailable(message),
        ContributionStoreError::Query { message } => Error::internal(message),
    }
}

fn map_credential_error(error: CredentialStoreError) -> Error {
    match error {
        CredentialStoreError::Connection { message } => Error::service_unavailable(message),
        other => Error::internal(other.to_string()),
    }
}

/// Raw submission fields as received from the client.
#[derive(Debug, Clone)]
pub struct NewContribution {
    pub faculty_name: String,
    pub faculty_email: String,
    pub rating: i32,
    pub review: String,
}

/// Contribution submission, listing, and account-removal service.
#[derive(Clone)]
pub struct ContributionService {
    contributions: Arc<dyn ContributionRepository>,
    credentials: Arc<dyn CredentialRepository>,
    filter: Arc<dyn ContentFilter>,
    clock: Arc<dyn Clock>,
}

impl ContributionService {
    /// Create the service over its ports.
    pub fn new(
        contributions: Arc<dyn ContributionRepository>,
        credentials: Arc<dyn CredentialRepository>,
        filter: Arc<dyn ContentFilter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            contributions,
            credentials,
            filter,
            clock,
        }
    }

    /// Store a new review for the authenticated owner.
    ///
    /// The one-review-per-faculty check runs before content validation, so a
    /// duplicate is reported as a duplicate even when its text would also
    /// have been rejected.
    pub async fn submit(&self, owner_id: Uuid, input: NewContribution) -> Result<Uuid, Error> {
        if input.faculty_name.trim().is_empty()
            || input.faculty_email.trim().is_empty()
            || input.review.trim().is_empty()
        {
            return Err(ContributionValidationError::MissingField.into());
        }

        let duplicate = self
            .contributions
            .exists_for_faculty(owner_id, &input.faculty_email)
            .await
            .map_err(map_contribution_error)?;
        if duplicate {
            return Err(Error::conflict(
                "You have already submitted a review for this teacher.",
            ));
        }

        let rating = Rating::new(input.rating)?;
        let review = ReviewText::new(&input.review, self.filter.as_ref())?;

        let contribution = Contribution {
            id: Uuid::new_v4(),
            owner_id,
            faculty_name: input.faculty_name.trim().to_owned(),
            faculty_email: input.faculty_email.clone(),
            rating,
            review,
            // Submission time is assigned here, never taken from the client.
            created_at: self.clock.now(),
        };
        self.contributions
            .insert(&contribution)
            .await
            .map_err(map_contribution_error)?;
        Ok(contribution.id)
    }

    /// Every review owned by the authenticated user.
    pub async fn list_mine(&self, owner_id: Uuid) -> Result<Vec<ContributionWithAuthor>, Error> {
        self.contributions
            .list_for_owner(owner_id)
            .await
            .map_err(map_contribution_error)
    }

    /// Remove the authenticated user's account and every review they own.
    pub async fn delete_account(&self, owner_id: Uuid) -> Result<(), Error> {
        self.credentials
            .delete_cascade(owner_id)
            .await
            .map_err(map_credential_error)
    }
}

#[cfg(test)]
mod tests {
    //! Submission ordering and account-removal coverage.
    use super::*;
    use crate::domain::contribution::DenylistFilter;
    use crate::domain::credential::{
        Credential, DisplayName, EmailPolicy, PasswordHash, VerificationStatus,
    };
    use crate::domain::ports::{
        FixedClock, MemoryContributionRepository, MemoryCredentialRepository, MemoryStore,
    };
    use crate::domain::ErrorCode;
    use chrono::Utc;

    struct Harness {
        store: Arc<MemoryStore>,
        credentials: Arc<MemoryCredentialRepository>,
        service: ContributionService,
    }

    fn harness() -> Harness {
        let store = Arc::new(MemoryStore::default());
        let credentials = Arc::new(MemoryCredentialRepository::new(store.clone()));
        let contributions = Arc::new(MemoryContributionRepository::new(store.clone()));
        let service = ContributionService::new(
            contributions,
            credentials.clone(),
            Arc::new(DenylistFilter::default()),
            Arc::new(FixedClock::at(Utc::now())),
        );
        Harness {
            store,
            credentials,
            service,
        }
    }

    async fn seed_user(h: &Harness, email: &str) -> Uuid {
        let credential = Credential {
            id: Uuid::new_v4(),
            name: DisplayName::new("Jane Doe").expect("valid name"),
            email: EmailPolicy::default().parse(email).expect("valid email"),
            password_hash: PasswordHash::from_stored("$2b$10$stub"),
            status: VerificationStatus::Verified,
            created_at: Utc::now(),
        };
        h.credentials
            .insert(&credential)
            .await
            .expect("seed insert succeeds");
        credential.id
    }

    fn submission() -> NewContribution {
        NewContribution {
            faculty_name: "Dr. Rao".to_owned(),
            faculty_email: "rao@gitam.edu".to_owned(),
            rating: 4,
            review: "Clear lectures and fair grading.".to_owned(),
        }
    }

    #[tokio::test]
    async fn a_valid_submission_is_stored_with_a_server_timestamp() {
        let h = harness();
        let owner = seed_user(&h, "jane@student.gitam.edu").await;
        h.service
            .submit(owner, submission())
            .await
            .expect("submission succeeds");
        assert_eq!(h.store.contribution_count(), 1);
    }

    #[tokio::test]
    async fn a_second_review_for_the_same_faculty_conflicts() {
        let h = harness();
        let owner = seed_user(&h, "jane@student.gitam.edu").await;
        h.service
            .submit(owner, submission())
            .await
            .expect("first submission succeeds");
        let err = h
            .service
            .submit(owner, submission())
            .await
            .expect_err("duplicate must fail");
        assert_eq!(err.code(), ErrorCode::Conflict);
        assert_eq!(
            err.message(),
            "You have already submitted a review for this teacher."
        );
    }

    #[tokio::test]
    async fn the_duplicate_check_runs_before_content_validation() {
        let h = harness();
        let owner = seed_user(&h, "jane@student.gitam.edu").await;
        h.service
            .submit(owner, submission())
            .await
            .expect("first submission succeeds");

        let mut dup = submission();
        dup.review = vec!["word"; 101].join(" ");
        let err = h
            .service
            .submit(owner, dup)
            .await
            .expect_err("duplicate must fail");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn different_users_may_review_the_same_faculty() {
        let h = harness();
        let first = seed_user(&h, "jane@student.gitam.edu").await;
        let second = seed_user(&h, "amit@student.gitam.edu").await;
        h.service
            .submit(first, submission())
            .await
            .expect("first user's review succeeds");
        h.service
            .submit(second, submission())
            .await
            .expect("second user's review succeeds");
        assert_eq!(h.store.contribution_count(), 2);
    }

    #[tokio::test]
    async fn flagged_content_is_rejected() {
        let h = harness();
        let owner = seed_user(&h, "jane@student.gitam.edu").await;
        let mut input = submission();
        input.review = "An OFFENSIVE experience overall.".to_owned();
        let err = h
            .service
            .submit(owner, input)
            .await
            .expect_err("flagged review must fail");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            err.message(),
            "Your review contains abusive words. It cannot be submitted."
        );
    }

    #[tokio::test]
    async fn listing_returns_only_the_owners_reviews() {
        let h = harness();
        let owner = seed_user(&h, "jane@student.gitam.edu").await;
        let other = seed_user(&h, "amit@student.gitam.edu").await;
        h.service
            .submit(owner, submission())
            .await
            .expect("owner's review succeeds");
        h.service
            .submit(other, submission())
            .await
            .expect("other user's review succeeds");

        let mine = h.service.list_mine(owner).await.expect("listing succeeds");
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].contribution.owner_id, owner);
        assert_eq!(mine[0].reviewer_name, "Jane Doe");
    }

    #[tokio::test]
    async fn deleting_an_account_removes_its_reviews() {
        let h = harness();
        let owner = seed_user(&h, "jane@student.gitam.edu").await;
        let other = seed_user(&h, "amit@student.gitam.edu").await;
        h.service
            .submit(owner, submission())
            .await
            .expect("owner's review succeeds");
        h.service
            .submit(other, submission())
            .await
            .expect("other user's review succeeds");

        h.service
            .delete_account(owner)
            .await
            .expect("deletion succeeds");
        assert_eq!(h.store.credential_count(), 1);
        assert_eq!(h.store.contribution_count(), 1);
    }
}
