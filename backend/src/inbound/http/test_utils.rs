//! Shared fixtures for HTTP adapter tests.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::contribution::DenylistFilter;
use crate::domain::credential::EmailPolicy;
use crate::domain::ports::{
    FixedClock, MemoryContributionRepository, MemoryCredentialRepository, MemoryStore,
    RecordingMailer,
};
use crate::domain::token::TokenSigner;
use crate::inbound::http::rate_limit::FixedWindowLimiter;
use crate::inbound::http::state::{HttpState, HttpStatePorts};

pub(crate) const TEST_JWT_SECRET: &str = "test-secret";
pub(crate) const TEST_ADMIN_PASSWORD: &str = "swordfish";

/// Handles onto the in-memory adapters backing a test [`HttpState`].
pub(crate) struct MemoryFixtures {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<FixedClock>,
}

/// An [`HttpState`] wired entirely over in-memory adapters.
pub(crate) fn memory_state() -> (HttpState, MemoryFixtures) {
    let store = Arc::new(MemoryStore::default());
    let mailer = Arc::new(RecordingMailer::default());
    let clock = Arc::new(FixedClock::at(Utc::now()));
    let admin_limiter = Arc::new(FixedWindowLimiter::new(
        5,
        Duration::minutes(15),
        "Too many login attempts from this IP, please try again after 15 minutes.",
        clock.clone(),
    ));
    let state = HttpState::new(HttpStatePorts {
        credentials: Arc::new(MemoryCredentialRepository::new(store.clone())),
        contributions: Arc::new(MemoryContributionRepository::new(store.clone())),
        mailer: mailer.clone(),
        clock: clock.clone(),
        filter: Arc::new(DenylistFilter::default()),
        policy: EmailPolicy::default(),
        signer: Arc::new(TokenSigner::new(TEST_JWT_SECRET)),
        admin_password: TEST_ADMIN_PASSWORD.to_owned(),
        admin_limiter,
    });
    (
        state,
        MemoryFixtures {
            store,
            mailer,
            clock,
        },
    )
}
