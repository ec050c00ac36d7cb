//! Email service for account confirmation mail.
//!
//! Uses SMTP via lettre for delivery with Askama HTML and text templates.
//! Without an SMTP host the message is written to the log instead, so local
//! development needs no mail server.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

/// HTML body of the confirmation email.
#[derive(Template)]
#[template(path = "email/confirm.html")]
struct ConfirmEmailHtml<'a> {
    name: &'a str,
    confirm_url: &'a str,
}

/// Plain text body of the confirmation email.
#[derive(Template)]
#[template(path = "email/confirm.txt")]
struct ConfirmEmailText<'a> {
    name: &'a str,
    confirm_url: &'a str,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

#[derive(Clone)]
enum Transport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Log,
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    transport: Transport,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let transport = match &config.smtp {
            Some(smtp) => {
                let credentials = Credentials::new(
                    smtp.username.clone(),
                    smtp.password.expose_secret().to_owned(),
                );
                let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
                    .port(smtp.port)
                    .credentials(credentials)
                    .build();
                Transport::Smtp(mailer)
            }
            None => {
                tracing::warn!("SMTP_HOST not set, emails will be logged instead of sent");
                Transport::Log
            }
        };

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }

    /// Send the account confirmation email with its link.
    ///
    /// # Errors
    ///
    /// Returns error if email fails to send or template fails to render.
    pub async fn send_confirmation(
        &self,
        to: &str,
        name: &str,
        confirm_url: &str,
    ) -> Result<(), EmailError> {
        let html = ConfirmEmailHtml { name, confirm_url }.render()?;
        let text = ConfirmEmailText { name, confirm_url }.render()?;

        self.send_multipart_email(to, "Por favor confirma tu correo", &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = build_message(&self.from_address, to, subject, text_body, html_body)?;

        match &self.transport {
            Transport::Smtp(mailer) => {
                mailer.send(email).await?;
                tracing::info!(to = %to, subject = %subject, "Email sent successfully");
            }
            Transport::Log => {
                tracing::info!(to = %to, subject = %subject, body = %text_body, "Email logged (no SMTP)");
            }
        }
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_owned()))
}

fn build_message(
    from: &str,
    to: &str,
    subject: &str,
    text_body: &str,
    html_body: &str,
) -> Result<Message, EmailError> {
    let message = Message::builder()
        .from(parse_mailbox(from)?)
        .to(parse_mailbox(to)?)
        .subject(subject)
        .multipart(
            MultiPart::alternative()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(text_body.to_owned()),
                )
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_HTML)
                        .body(html_body.to_owned()),
                ),
        )?;
    Ok(message)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_templates_include_link() {
        let url = "https://tienda.example/auth/confirm/abc.def.ghi";
        let html = ConfirmEmailHtml {
            name: "Ana",
            confirm_url: url,
        }
        .render()
        .unwrap();
        let text = ConfirmEmailText {
            name: "Ana",
            confirm_url: url,
        }
        .render()
        .unwrap();

        assert!(html.contains(url));
        assert!(html.contains("Ana"));
        assert!(text.contains(url));
    }

    #[test]
    fn test_invalid_recipient_rejected() {
        let err = build_message("tienda@example.com", "not an address", "s", "t", "h").unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_log_transport_sends_without_smtp() {
        let service = EmailService::new(&EmailConfig {
            smtp: None,
            from_address: "tienda@example.com".to_owned(),
        })
        .unwrap();

        service
            .send_confirmation("ana@example.com", "Ana", "http://localhost/auth/confirm/x")
            .await
            .unwrap();
    }
}
