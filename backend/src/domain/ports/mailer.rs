//! Driven port for outbound verification email dispatch.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::domain::credential::{StudentEmail, VerificationCode};

/// Which flow triggered the email; picks the subject and body copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailContext {
    /// First registration or a registration retry.
    Registration,
    /// A login attempt against an unverified account re-issued the code.
    LoginResend,
}

/// Dispatch errors raised by mailer adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailerError {
    /// The mail relay could not be reached.
    #[error("mail dispatch transport failed: {message}")]
    Transport { message: String },
    /// The relay answered with a non-success status.
    #[error("mail relay rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl MailerError {
    /// Create a transport error with the given message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a rejection error with the relay's status and message.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

/// Driven port dispatching one-time verification codes by email.
#[async_trait]
pub trait VerificationMailer: Send + Sync {
    /// Send the code to the address. One outbound email per call.
    async fn send_verification_code(
        &self,
        to: &StudentEmail,
        code: &VerificationCode,
        context: MailContext,
    ) -> Result<(), MailerError>;
}

/// In-memory mailer recording every dispatch, for tests and local runs.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

/// A dispatch captured by [`RecordingMailer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub code: String,
    pub context: MailContext,
}

impl RecordingMailer {
    /// Snapshot of every dispatch so far, oldest first.
    pub fn sent(&self) -> Vec<SentMail> {
        match self.sent.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Number of dispatches so far.
    pub fn sent_count(&self) -> usize {
        self.sent().len()
    }
}

#[async_trait]
impl VerificationMailer for RecordingMailer {
    async fn send_verification_code(
        &self,
        to: &StudentEmail,
        code: &VerificationCode,
        context: MailContext,
    ) -> Result<(), MailerError> {
        let mut guard = match self.sent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(SentMail {
            to: to.as_ref().to_owned(),
            code: code.as_ref().to_owned(),
            context,
        });
        Ok(())
    }
}
