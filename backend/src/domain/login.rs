//! Login use-case: password checks, verification gating, and token issue.

use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use super::credential::Credential;
use super::ports::{Clock, CredentialRepository, CredentialStoreError, MailContext};
use super::registration::CodeIssuer;
use super::token::TokenSigner;
use super::Error;

fn map_store_error(error: CredentialStoreError) -> Error {
    match error {
        CredentialStoreError::Connection { message } => Error::service_unavailable(message),
        other => Error::internal(other.to_string()),
    }
}

/// Profile fields echoed back alongside a fresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
}

impl From<&Credential> for SessionUser {
    fn from(credential: &Credential) -> Self {
        Self {
            name: credential.name.as_ref().to_owned(),
            email: credential.email.as_ref().to_owned(),
        }
    }
}

/// A successful login: a signed bearer token plus the profile projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

/// Login service over the credential store and the token signer.
#[derive(Clone)]
pub struct LoginService {
    credentials: Arc<dyn CredentialRepository>,
    issuer: CodeIssuer,
    signer: Arc<TokenSigner>,
    clock: Arc<dyn Clock>,
}

impl LoginService {
    /// Create the service over its ports.
    pub fn new(
        credentials: Arc<dyn CredentialRepository>,
        issuer: CodeIssuer,
        signer: Arc<TokenSigner>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            issuer,
            signer,
            clock,
        }
    }

    /// Authenticate an email and password pair.
    ///
    /// Unknown addresses and wrong passwords share one response, so a caller
    /// cannot probe which addresses are registered.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, Error> {
        let invalid = || Error::unauthorized("Invalid credentials.");

        let Some(credential) = self
            .credentials
            .find_by_email(&email.to_lowercase())
            .await
            .map_err(map_store_error)?
        else {
            return Err(invalid());
        };

        // The verification gate runs before the password comparison; an
        // unverified account answers Forbidden regardless of the password,
        // reissuing a code when the pending one has lapsed.
        if !credential.is_verified() {
            if credential.status.has_live_code(self.clock.now()) {
                return Err(Error::forbidden(
                    "Please verify your email address before logging in.",
                ));
            }
            self.issuer
                .reissue(&credential, MailContext::LoginResend)
                .await?;
            return Err(Error::forbidden(
                "Please verify your email address before logging in. \
                 A new verification code has been sent to your email.",
            ));
        }

        if !credential.password_hash.verify(password)? {
            return Err(invalid());
        }

        let token = self.signer.issue(&credential, self.clock.now())?;
        Ok(Session {
            token,
            user: SessionUser::from(&credential),
        })
    }
}
