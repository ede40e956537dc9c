//! Domain ports and supporting types for the hexagonal boundary.

mod clock;
mod contribution_repository;
mod credential_repository;
mod mailer;
mod memory;

pub use clock::{Clock, FixedClock, SystemClock};
pub use contribution_repository::{ContributionRepository, ContributionStoreError};
pub use credential_repository::{CredentialRepository, CredentialStoreError};
pub use mailer::{MailContext, MailerError, RecordingMailer, SentMail, VerificationMailer};
pub use memory::{MemoryContributionRepository, MemoryCredentialRepository, MemoryStore};
