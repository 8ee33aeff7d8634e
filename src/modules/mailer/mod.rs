//! Outbound mail transport
//!
//! SMTP delivery via lettre, behind the `Mailer` trait so notification
//! composition can be tested against a recording double.

mod smtp_client;

use async_trait::async_trait;

use crate::core::error::Result;

/// One attachment of an outgoing email.
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    /// When set, the attachment is embedded inline and referenced from the
    /// HTML body via `cid:`.
    pub inline_cid: Option<String>,
}

/// A fully composed outgoing email.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<EmailAttachment>,
}

/// Mail transport seam.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;
}

pub use smtp_client::SmtpMailer;
