//! SendGrid-backed verification mailer.
//!
//! This adapter owns transport details only: building the v3 `mail/send`
//! payload, HTTP error mapping, and nothing else. Message copy lives here
//! because the relay is the only consumer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::credential::{StudentEmail, VerificationCode};
use crate::domain::ports::{MailContext, MailerError, VerificationMailer};

const DEFAULT_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Verification mailer dispatching through the SendGrid v3 HTTP API.
pub struct SendGridMailer {
    client: Client,
    endpoint: Url,
    api_key: String,
    sender: String,
}

impl SendGridMailer {
    /// Build a mailer against the production SendGrid endpoint.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(api_key: impl Into<String>, sender: impl Into<String>) -> Result<Self, MailerError> {
        let endpoint = Url::parse(DEFAULT_ENDPOINT)
            .map_err(|err| MailerError::transport(format!("invalid relay endpoint: {err}")))?;
        Self::with_endpoint(endpoint, api_key, sender)
    }

    /// Build a mailer against an explicit endpoint, for stub relays in tests.
    ///
    /// # Errors
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_endpoint(
        endpoint: Url,
        api_key: impl Into<String>,
        sender: impl Into<String>,
    ) -> Result<Self, MailerError> {
        let client = Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|err| MailerError::transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
            sender: sender.into(),
        })
    }
}

#[derive(Debug, Serialize)]
struct MailSendRequest<'a> {
    personalizations: [Personalization<'a>; 1],
    from: Address<'a>,
    subject: &'a str,
    content: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: [Address<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: String,
}

fn subject_for(context: MailContext) -> &'static str {
    match context {
        MailContext::Registration => "Gitam Student Portal: Verify Your Email",
        MailContext::LoginResend => "Gitam Student Portal: New Verification Code",
    }
}

fn body_for(context: MailContext, code: &VerificationCode) -> String {
    let code = code.as_ref();
    match context {
        MailContext::Registration => format!(
            "<p>Hello,</p><p>Thank you for registering. Your 6-digit verification code \
             is:</p><h3>{code}</h3><p>This code will expire in 10 minutes.</p><p>If you did \
             not request this, please ignore this email.</p>"
        ),
        MailContext::LoginResend => format!(
            "<p>Hello,</p><p>You tried to log in but your email is not verified. Your new \
             6-digit verification code is:</p><h3>{code}</h3><p>This code will expire in 10 \
             minutes.</p>"
        ),
    }
}

fn map_transport_error(error: reqwest::Error) -> MailerError {
    MailerError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> MailerError {
    MailerError::rejected(status.as_u16(), body_preview(body))
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[async_trait]
impl VerificationMailer for SendGridMailer {
    async fn send_verification_code(
        &self,
        to: &StudentEmail,
        code: &VerificationCode,
        context: MailContext,
    ) -> Result<(), MailerError> {
        let payload = MailSendRequest {
            personalizations: [Personalization {
                to: [Address { email: to.as_ref() }],
            }],
            from: Address {
                email: self.sender.as_str(),
            },
            subject: subject_for(context),
            content: [Content {
                content_type: "text/html",
                value: body_for(context, code),
            }],
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.map_err(map_transport_error)?;
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(MailContext::Registration, "Verify Your Email")]
    #[case(MailContext::LoginResend, "New Verification Code")]
    fn each_context_picks_its_subject(#[case] context: MailContext, #[case] expected: &str) {
        assert!(subject_for(context).contains(expected));
    }

    #[rstest]
    fn the_body_embeds_the_code_and_the_expiry_window() {
        let code = VerificationCode::from_stored("123456");

        let registration = body_for(MailContext::Registration, &code);
        assert!(registration.contains("<h3>123456</h3>"));
        assert!(registration.contains("expire in 10 minutes"));
        assert!(registration.contains("Thank you for registering"));

        let resend = body_for(MailContext::LoginResend, &code);
        assert!(resend.contains("<h3>123456</h3>"));
        assert!(resend.contains("your email is not verified"));
    }

    #[rstest]
    fn rejection_errors_carry_a_trimmed_body_preview() {
        let long_body = "x".repeat(400);
        let error = map_status_error(StatusCode::UNAUTHORIZED, long_body.as_bytes());
        let MailerError::Rejected { status, message } = error else {
            panic!("non-success statuses must map to rejection");
        };
        assert_eq!(status, 401);
        assert!(message.chars().count() <= 163);
        assert!(message.ends_with("..."));
    }

    #[rstest]
    fn the_payload_serialises_to_the_v3_shape() {
        let payload = MailSendRequest {
            personalizations: [Personalization {
                to: [Address {
                    email: "a@student.gitam.edu",
                }],
            }],
            from: Address {
                email: "portal@example.edu",
            },
            subject: "Gitam Student Portal: Verify Your Email",
            content: [Content {
                content_type: "text/html",
                value: "<p>body</p>".to_owned(),
            }],
        };

        let json = serde_json::to_value(&payload).map_or_else(
            |err| panic!("payload must serialise: {err}"),
            |value| value,
        );
        assert_eq!(
            json["personalizations"][0]["to"][0]["email"],
            "a@student.gitam.edu"
        );
        assert_eq!(json["from"]["email"], "portal@example.edu");
        assert_eq!(json["content"][0]["type"], "text/html");
    }
}
