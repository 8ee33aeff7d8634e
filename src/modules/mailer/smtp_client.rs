use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{debug, info};

use crate::core::config::SmtpConfig;
use crate::core::error::{AppError, Result};
use crate::modules::mailer::{Mailer, OutgoingEmail};

/// SMTP mail transport built from configuration, initialized once at startup.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| AppError::Internal(format!("Invalid SMTP_FROM address: {}", e)))?;

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
                .map_err(|e| AppError::Internal(format!("Invalid SMTP relay: {}", e)))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
        };

        let builder = builder.port(config.port);
        let builder = if let (Some(user), Some(pass)) = (&config.username, &config.password) {
            builder.credentials(Credentials::new(user.clone(), pass.clone()))
        } else {
            builder
        };

        info!(
            host = %config.host,
            port = config.port,
            starttls = config.starttls,
            "SMTP mailer initialized"
        );

        Ok(Self {
            transport: builder.build(),
            from,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {}", e)))?;

        // HTML body plus inline (cid-referenced) attachments form the
        // multipart/related part; regular attachments go on the outer
        // multipart/mixed.
        let mut related = MultiPart::related().singlepart(SinglePart::html(email.html_body.clone()));

        let mut mixed_parts: Vec<SinglePart> = Vec::new();
        for attachment in &email.attachments {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                AppError::Internal(format!(
                    "Invalid attachment content type '{}': {}",
                    attachment.content_type, e
                ))
            })?;

            match &attachment.inline_cid {
                Some(cid) => {
                    related = related.singlepart(
                        Attachment::new_inline(cid.clone())
                            .body(attachment.bytes.clone(), content_type),
                    );
                }
                None => {
                    mixed_parts.push(
                        Attachment::new(attachment.filename.clone())
                            .body(attachment.bytes.clone(), content_type),
                    );
                }
            }
        }

        let mut mixed = MultiPart::mixed().multipart(related);
        for part in mixed_parts {
            mixed = mixed.singlepart(part);
        }

        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(email.subject.clone())
            .multipart(mixed)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let message = self.build_message(&email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AppError::Upstream(format!("SMTP send failed: {}", e)))?;

        debug!(to = %email.to, subject = %email.subject, "Email sent");
        Ok(())
    }
}
