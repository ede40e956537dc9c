//! Credential record: user identity and email-verification state.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use super::{Error, ErrorCode};

/// Default organisational domain accepted for registration.
pub const DEFAULT_EMAIL_DOMAIN: &str = "student.gitam.edu";

/// Validity window for a pending verification code.
pub fn code_ttl() -> Duration {
    Duration::minutes(10)
}

/// Validation errors raised while constructing credential components.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    #[error("Name, email, and password are required.")]
    MissingField,
    #[error("Invalid email format. Only @{domain} emails are allowed.")]
    EmailOutsideDomain { domain: String },
}

impl From<CredentialValidationError> for Error {
    fn from(value: CredentialValidationError) -> Self {
        Self::new(ErrorCode::InvalidRequest, value.to_string())
    }
}

/// Registration email policy: local part plus a fixed organisational domain.
///
/// The accepted domain is configuration, injected at startup; the pattern is
/// compiled once and shared by every registration attempt.
#[derive(Debug, Clone)]
pub struct EmailPolicy {
    domain: String,
    pattern: Regex,
}

impl EmailPolicy {
    /// Build a policy accepting addresses under the given domain.
    pub fn new(domain: impl Into<String>) -> Result<Self, Error> {
        let domain = domain.into();
        let pattern = Regex::new(&format!(
            "^[A-Za-z0-9._%+-]+@{}$",
            regex::escape(&domain)
        ))
        .map_err(|err| Error::internal(format!("email policy pattern failed to compile: {err}")))?;
        Ok(Self { domain, pattern })
    }

    /// The accepted organisational domain.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Validate a raw address and normalise it to lowercase for storage.
    ///
    /// Validation runs against the input as submitted; only storage is
    /// lowercased, mirroring the registration contract.
    pub fn parse(&self, raw: &str) -> Result<StudentEmail, CredentialValidationError> {
        if !self.pattern.is_match(raw) {
            return Err(CredentialValidationError::EmailOutsideDomain {
                domain: self.domain.clone(),
            });
        }
        Ok(StudentEmail(raw.to_lowercase()))
    }
}

impl Default for EmailPolicy {
    fn default() -> Self {
        match Self::new(DEFAULT_EMAIL_DOMAIN) {
            Ok(policy) => policy,
            Err(err) => unreachable!("default email policy must compile: {err}"),
        }
    }
}

/// A validated, lowercased institutional email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StudentEmail(String);

impl StudentEmail {
    /// Rehydrate an address previously validated and stored lowercased.
    ///
    /// Persistence adapters use this when loading rows; new addresses must go
    /// through [`EmailPolicy::parse`].
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl AsRef<str> for StudentEmail {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StudentEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Human readable display name, stored trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DisplayName(String);

impl DisplayName {
    /// Trim and validate a display name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CredentialValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(CredentialValidationError::MissingField);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Rehydrate a name previously validated and stored trimmed.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Salted one-way password hash. The plaintext is never retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

/// bcrypt work factor, matching the original deployment.
const BCRYPT_COST: u32 = 10;

impl PasswordHash {
    /// Hash a plaintext password.
    pub fn from_plain(plain: &str) -> Result<Self, Error> {
        bcrypt::hash(plain, BCRYPT_COST)
            .map(Self)
            .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
    }

    /// Rehydrate a hash loaded from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Verify a candidate password against this hash.
    ///
    /// bcrypt's comparison is constant-time over the digest.
    pub fn verify(&self, plain: &str) -> Result<bool, Error> {
        bcrypt::verify(plain, &self.0)
            .map_err(|err| Error::internal(format!("password verification failed: {err}")))
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// A six-digit one-time verification code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Draw a uniformly random code in `100000..=999999`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(100_000..=999_999u32).to_string())
    }

    /// Rehydrate a code loaded from storage.
    pub fn from_stored(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Compare against a submitted code: exact string match, no
    /// normalisation, constant-time over the bytes.
    pub fn matches(&self, submitted: &str) -> bool {
        self.0.as_bytes().ct_eq(submitted.as_bytes()).into()
    }
}

impl AsRef<str> for VerificationCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Email-verification state of a credential record.
///
/// A record is either verified (code fields cleared), unverified with a
/// pending code, or unverified with the code expired-and-cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationStatus {
    /// The address has been proven; code fields are cleared.
    Verified,
    /// A code is outstanding and may still be redeemed before `expires_at`.
    Pending {
        code: VerificationCode,
        expires_at: DateTime<Utc>,
    },
    /// Unverified with no redeemable code on file.
    CodeCleared,
}

impl VerificationStatus {
    /// Whether the record still holds a redeemable, unexpired code.
    pub fn has_live_code(&self, now: DateTime<Utc>) -> bool {
        matches!(self, Self::Pending { expires_at, .. } if *expires_at >= now)
    }
}

/// A registered user's identity and verification state.
#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub id: Uuid,
    pub name: DisplayName,
    pub email: StudentEmail,
    pub password_hash: PasswordHash,
    pub status: VerificationStatus,
    pub created_at: DateTime<Utc>,
}

impl Credential {
    /// Whether the email address has been verified.
    pub fn is_verified(&self) -> bool {
        matches!(self.status, VerificationStatus::Verified)
    }
}
