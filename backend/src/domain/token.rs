//! Signed bearer tokens proving an authenticated session.
//!
//! Tokens are HS256 JWTs embedding the user's id, email, and name, valid for
//! one hour. There is no revocation mechanism; expiry is the only
//! invalidation path.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credential::Credential;
use super::Error;

/// Fixed token lifetime.
pub fn token_ttl() -> Duration {
    Duration::hours(1)
}

/// JWT claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a UUID string.
    pub sub: String,
    pub email: String,
    pub name: String,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Issue time, seconds since the Unix epoch.
    pub iat: i64,
}

/// The authenticated caller decoded from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

/// Issues and verifies session tokens with a process-lifetime secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    /// Build a signer from the configured secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is the contract; no leeway.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign a token for the credential, expiring one hour from `now`.
    pub fn issue(&self, credential: &Credential, now: DateTime<Utc>) -> Result<String, Error> {
        let claims = Claims {
            sub: credential.id.to_string(),
            email: credential.email.as_ref().to_owned(),
            name: credential.name.as_ref().to_owned(),
            iat: now.timestamp(),
            exp: (now + token_ttl()).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| Error::internal(format!("token signing failed: {err}")))
    }

    /// Verify a presented token and decode the caller it names.
    ///
    /// Any decode failure, a bad signature and an expired token included,
    /// maps to the same Forbidden error so clients learn nothing about why.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, Error> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| Error::forbidden("Invalid or expired token."))?;
        let id = Uuid::parse_str(&data.claims.sub)
            .map_err(|_| Error::forbidden("Invalid or expired token."))?;
        Ok(AuthenticatedUser {
            id,
            email: data.claims.email,
            name: data.claims.name,
        })
    }
}
