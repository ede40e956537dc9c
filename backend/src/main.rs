//! Backend entry-point: wires REST endpoints and OpenAPI docs.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::web;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use backend::domain::credential::EmailPolicy;
use backend::inbound::http::health::HealthState;
use backend::outbound::email::SendGridMailer;
use backend::outbound::persistence::{run_pending_migrations, DbPool, PoolConfig};
use backend::server::{create_server, ServerConfig};

const DEFAULT_PORT: u16 = 5000;

fn required_secret(name: &str) -> std::io::Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ if cfg!(debug_assertions) => {
            warn!(variable = name, "using placeholder secret (dev only)");
            Ok(format!("dev-{}", name.to_lowercase()))
        }
        _ => Err(std::io::Error::other(format!("{name} must be set"))),
    }
}

fn bind_addr_from_env() -> std::io::Result<SocketAddr> {
    let port = match env::var("PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .map_err(|err| std::io::Error::other(format!("invalid PORT {raw:?}: {err}")))?,
        Err(_) => DEFAULT_PORT,
    };
    Ok(SocketAddr::from(([0, 0, 0, 0], port)))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let bind_addr = bind_addr_from_env()?;
    let jwt_secret = required_secret("JWT_SECRET")?;
    let admin_password = required_secret("ADMIN_PASSWORD")?;

    let mut config = ServerConfig::new(bind_addr, jwt_secret, admin_password);

    if let Ok(domain) = env::var("EMAIL_DOMAIN") {
        let policy = EmailPolicy::new(&domain)
            .map_err(|err| std::io::Error::other(format!("invalid EMAIL_DOMAIN: {err}")))?;
        config = config.with_email_policy(policy);
    }

    if let Ok(database_url) = env::var("DATABASE_URL") {
        run_pending_migrations(&database_url)
            .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
        let pool = DbPool::new(PoolConfig::new(database_url))
            .await
            .map_err(|err| std::io::Error::other(format!("database pool failed: {err}")))?;
        config = config.with_db_pool(pool);
    }

    match (env::var("SENDGRID_API_KEY"), env::var("SENDER_EMAIL")) {
        (Ok(api_key), Ok(sender)) => {
            let mailer = SendGridMailer::new(api_key, sender)
                .map_err(|err| std::io::Error::other(format!("mailer setup failed: {err}")))?;
            config = config.with_mailer(Arc::new(mailer));
        }
        _ => warn!("SENDGRID_API_KEY or SENDER_EMAIL unset; outbound email disabled"),
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await
}
