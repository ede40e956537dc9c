//! Registration and email-verification use-cases.
//!
//! Owns the verification-code lifecycle: codes are minted here, persisted on
//! the credential record, dispatched by email, and redeemed or expired by
//! [`RegistrationService::verify_email`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::credential::{
    code_ttl, Credential, DisplayName, EmailPolicy, PasswordHash, VerificationCode,
    VerificationStatus,
};
use super::ports::{
    Clock, CredentialRepository, CredentialStoreError, MailContext, MailerError, VerificationMailer,
};
use super::Error;

fn map_store_error(error: CredentialStoreError) -> Error {
    match error {
        CredentialStoreError::Connection { message } => Error::service_unavailable(message),
        CredentialStoreError::Query { message } => Error::internal(message),
        CredentialStoreError::DuplicateEmail => {
            Error::conflict("User with this email already exists.")
        }
    }
}

// Dispatch failures deliberately surface as the same generic failure as any
// other server error; clients cannot distinguish a dead mail relay.
fn map_mailer_error(error: MailerError) -> Error {
    Error::internal(error.to_string())
}

/// Mints, persists, and dispatches one-time verification codes.
#[derive(Clone)]
pub struct CodeIssuer {
    credentials: Arc<dyn CredentialRepository>,
    mailer: Arc<dyn VerificationMailer>,
    clock: Arc<dyn Clock>,
}

impl CodeIssuer {
    /// Create an issuer over the given ports.
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        mailer: Arc<dyn VerificationMailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            mailer,
            clock,
        }
    }

    /// Generate a fresh code and its expiry without persisting anything.
    pub fn mint(&self) -> (VerificationCode, DateTime<Utc>) {
        let code = VerificationCode::generate(&mut rand::thread_rng());
        (code, self.clock.now() + code_ttl())
    }

    /// Persist a fresh code onto an existing record and email it out.
    pub async fn reissue(
        &self,
        credential: &Credential,
        context: MailContext,
    ) -> Result<(), Error> {
        let (code, expires_at) = self.mint();
        self.credentials
            .set_pending_code(credential.id, &code, expires_at)
            .await
            .map_err(map_store_error)?;
        self.mailer
            .send_verification_code(&credential.email, &code, context)
            .await
            .map_err(map_mailer_error)
    }

    /// Email a code that was already persisted as part of a new record.
    pub async fn dispatch(
        &self,
        credential: &Credential,
        code: &VerificationCode,
        context: MailContext,
    ) -> Result<(), Error> {
        self.mailer
            .send_verification_code(&credential.email, code, context)
            .await
            .map_err(map_mailer_error)
    }
}

/// Outcome of a registration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A new record was created and a code dispatched.
    Registered,
    /// The address was already registered but unverified; a fresh code went
    /// out to the existing record.
    CodeResent,
}

/// Outcome of a verification attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The verified flag flipped and the code fields cleared.
    Verified,
    /// The record was already verified; nothing changed.
    AlreadyVerified,
}

/// Registration and email-verification service.
#[derive(Clone)]
pub struct RegistrationService {
    credentials: Arc<dyn CredentialRepository>,
    issuer: CodeIssuer,
    clock: Arc<dyn Clock>,
    policy: EmailPolicy,
}

impl RegistrationService {
    /// Create the service over its ports and the configured email policy.
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        issuer: CodeIssuer,
        clock: Arc<dyn Clock>,
        policy: EmailPolicy,
    ) -> Self {
        Self {
            credentials,
            issuer,
            clock,
            policy,
        }
    }

    /// Register a new user, or re-issue a code to an unverified one.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RegistrationOutcome, Error> {
        let name = DisplayName::new(name)?;
        let email = self.policy.parse(email)?;

        if let Some(existing) = self
            .credentials
            .find_by_email(email.as_ref())
            .await
            .map_err(map_store_error)?
        {
            if existing.is_verified() {
                return Err(Error::conflict(
                    "User with this email already exists and is verified.",
                ));
            }
            self.issuer
                .reissue(&existing, MailContext::Registration)
                .await?;
            return Ok(RegistrationOutcome::CodeResent);
        }

        let password_hash = PasswordHash::from_plain(password)?;
        let (code, expires_at) = self.issuer.mint();
        let credential = Credential {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            status: VerificationStatus::Pending {
                code: code.clone(),
                expires_at,
            },
            created_at: self.clock.now(),
        };
        // Check-then-insert: a concurrent identical registration can still
        // trip the store's unique constraint, which maps to Conflict.
        self.credentials
            .insert(&credential)
            .await
            .map_err(map_store_error)?;
        self.issuer
            .dispatch(&credential, &code, MailContext::Registration)
            .await?;
        Ok(RegistrationOutcome::Registered)
    }

    /// Redeem a verification code.
    pub async fn verify_email(&self, email: &str, code: &str) -> Result<VerifyOutcome, Error> {
        let credential = self
            .credentials
            .find_by_email(&email.to_lowercase())
            .await
            .map_err(map_store_error)?
            .ok_or_else(|| Error::not_found("User not found."))?;

        match &credential.status {
            VerificationStatus::Verified => Ok(VerifyOutcome::AlreadyVerified),
            VerificationStatus::CodeCleared => {
                Err(Error::invalid_request("Invalid verification code."))
            }
            VerificationStatus::Pending {
                code: stored,
                expires_at,
            } => {
                // Comparison first, expiry second, matching the published
                // contract: a wrong code never clears a live one.
                if !stored.matches(code) {
                    return Err(Error::invalid_request("Invalid verification code."));
                }
                if *expires_at < self.clock.now() {
                    self.credentials
                        .clear_code(credential.id)
                        .await
                        .map_err(map_store_error)?;
                    return Err(Error::invalid_request(
                        "Verification code has expired. Please register again to get a new code.",
                    ));
                }
                self.credentials
                    .mark_verified(credential.id)
                    .await
                    .map_err(map_store_error)?;
                Ok(VerifyOutcome::Verified)
            }
        }
    }
}
