//! Outbound email adapters.

mod sendgrid;

pub use sendgrid::SendGridMailer;
