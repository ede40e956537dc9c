//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data`, so they depend only
//! on domain services and stay testable without I/O.

use std::sync::Arc;

use crate::domain::admin::AdminService;
use crate::domain::contribution::ContentFilter;
use crate::domain::contribution_service::ContributionService;
use crate::domain::credential::EmailPolicy;
use crate::domain::login::LoginService;
use crate::domain::ports::{
    Clock, ContributionRepository, CredentialRepository, VerificationMailer,
};
use crate::domain::registration::{CodeIssuer, RegistrationService};
use crate::domain::search::SearchService;
use crate::domain::token::TokenSigner;
use crate::inbound::http::rate_limit::FixedWindowLimiter;

/// Parameter object bundling every port and secret the HTTP surface needs.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub credentials: Arc<dyn CredentialRepository>,
    pub contributions: Arc<dyn ContributionRepository>,
    pub mailer: Arc<dyn VerificationMailer>,
    pub clock: Arc<dyn Clock>,
    pub filter: Arc<dyn ContentFilter>,
    pub policy: EmailPolicy,
    pub signer: Arc<TokenSigner>,
    pub admin_password: String,
    pub admin_limiter: Arc<FixedWindowLimiter>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: RegistrationService,
    pub login: LoginService,
    pub contributions: ContributionService,
    pub search: SearchService,
    pub admin: AdminService,
    pub signer: Arc<TokenSigner>,
    pub admin_limiter: Arc<FixedWindowLimiter>,
}

impl HttpState {
    /// Wire the domain services from a ports bundle.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            credentials,
            contributions,
            mailer,
            clock,
            filter,
            policy,
            signer,
            admin_password,
            admin_limiter,
        } = ports;

        let issuer = CodeIssuer::new(credentials.clone(), mailer, clock.clone());
        let registration = RegistrationService::new(
            credentials.clone(),
            issuer.clone(),
            clock.clone(),
            policy,
        );
        let login = LoginService::new(credentials.clone(), issuer, signer.clone(), clock.clone());
        let contribution_service =
            ContributionService::new(contributions.clone(), credentials.clone(), filter, clock);
        let search = SearchService::new(contributions.clone());
        let admin = AdminService::new(credentials, contributions, admin_password);

        Self {
            registration,
            login,
            contributions: contribution_service,
            search,
            admin,
            signer,
            admin_limiter,
        }
    }
}
