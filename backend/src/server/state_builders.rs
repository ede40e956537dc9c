//! Builders for HTTP state ports with in-memory fallbacks.

use std::sync::Arc;

use actix_web::web;
use chrono::Duration;
use tracing::warn;

use crate::domain::contribution::DenylistFilter;
use crate::domain::ports::{
    ContributionRepository, CredentialRepository, MemoryContributionRepository,
    MemoryCredentialRepository, MemoryStore, RecordingMailer, SystemClock, VerificationMailer,
};
use crate::domain::token::TokenSigner;
use crate::inbound::http::rate_limit::FixedWindowLimiter;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::persistence::{DieselContributionRepository, DieselCredentialRepository};

use super::ServerConfig;

/// Window applied to the admin delete endpoint per client address.
const ADMIN_MAX_ATTEMPTS: u32 = 5;
const ADMIN_WINDOW_MINUTES: i64 = 15;
const ADMIN_LIMIT_MESSAGE: &str =
    "Too many login attempts from this IP, please try again after 15 minutes.";

fn build_repositories(
    config: &ServerConfig,
) -> (Arc<dyn CredentialRepository>, Arc<dyn ContributionRepository>) {
    match &config.db_pool {
        Some(pool) => (
            Arc::new(DieselCredentialRepository::new(pool.clone())),
            Arc::new(DieselContributionRepository::new(pool.clone())),
        ),
        None => {
            warn!("no database configured; falling back to in-memory stores");
            let store = Arc::new(MemoryStore::default());
            (
                Arc::new(MemoryCredentialRepository::new(store.clone())),
                Arc::new(MemoryContributionRepository::new(store)),
            )
        }
    }
}

fn build_mailer(config: &ServerConfig) -> Arc<dyn VerificationMailer> {
    match &config.mailer {
        Some(mailer) => mailer.clone(),
        None => {
            warn!("no mail relay configured; verification codes stay in memory");
            Arc::new(RecordingMailer::default())
        }
    }
}

/// Build the shared HTTP state from configured ports and fallbacks.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let (credentials, contributions) = build_repositories(config);
    let mailer = build_mailer(config);
    let clock = Arc::new(SystemClock);
    let admin_limiter = Arc::new(FixedWindowLimiter::new(
        ADMIN_MAX_ATTEMPTS,
        Duration::minutes(ADMIN_WINDOW_MINUTES),
        ADMIN_LIMIT_MESSAGE,
        clock.clone(),
    ));

    web::Data::new(HttpState::new(HttpStatePorts {
        credentials,
        contributions,
        mailer,
        clock,
        filter: Arc::new(DenylistFilter::default()),
        policy: config.email_policy.clone(),
        signer: Arc::new(TokenSigner::new(&config.jwt_secret)),
        admin_password: config.admin_password.clone(),
        admin_limiter,
    }))
}
