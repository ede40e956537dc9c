//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::domain::credential::EmailPolicy;
use crate::domain::ports::VerificationMailer;
use crate::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) jwt_secret: String,
    pub(crate) admin_password: String,
    pub(crate) email_policy: EmailPolicy,
    pub(crate) db_pool: Option<DbPool>,
    pub(crate) mailer: Option<Arc<dyn VerificationMailer>>,
}

impl ServerConfig {
    /// Construct a server configuration from the required secrets.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        jwt_secret: impl Into<String>,
        admin_password: impl Into<String>,
    ) -> Self {
        Self {
            bind_addr,
            jwt_secret: jwt_secret.into(),
            admin_password: admin_password.into(),
            email_policy: EmailPolicy::default(),
            db_pool: None,
            mailer: None,
        }
    }

    /// Attach a database connection pool for persistence adapters.
    ///
    /// When provided, the server uses database-backed repositories;
    /// otherwise it falls back to in-memory stores for local runs.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Attach an outbound mailer. Without one, dispatches are recorded
    /// in memory and never leave the process.
    #[must_use]
    pub fn with_mailer(mut self, mailer: Arc<dyn VerificationMailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Override the accepted email domain.
    #[must_use]
    pub fn with_email_policy(mut self, policy: EmailPolicy) -> Self {
        self.email_policy = policy;
        self
    }
}
