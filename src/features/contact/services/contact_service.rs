use minijinja::context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::NotificationConfig;
use crate::core::error::Result;
use crate::features::contact::dtos::FaqContactDto;
use crate::modules::mailer::{EmailAttachment, Mailer, OutgoingEmail};
use crate::shared::templates::render_email;

const LOGO_CID: &str = "rechtlylogo";

/// Forwards FAQ contact messages: the message body goes to the operations
/// mailbox, the sender gets a short confirmation.
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    ops_mailbox: String,
    logo: Option<Vec<u8>>,
}

impl ContactService {
    pub fn new(mailer: Arc<dyn Mailer>, config: &NotificationConfig) -> Self {
        let logo = config.logo_path.as_deref().and_then(|path| {
            std::fs::read(path)
                .inspect_err(|e| warn!("Logo {} not readable, emails go out without it: {}", path, e))
                .ok()
        });

        Self {
            mailer,
            ops_mailbox: config.ops_mailbox.clone(),
            logo,
        }
    }

    fn logo_attachment(&self) -> Vec<EmailAttachment> {
        match &self.logo {
            Some(logo) => vec![EmailAttachment {
                filename: "rechtly-logo.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: logo.clone(),
                inline_cid: Some(LOGO_CID.to_string()),
            }],
            None => Vec::new(),
        }
    }

    /// Send both emails for one contact message.
    ///
    /// The operations copy goes out first; when it fails the sender gets no
    /// confirmation and the caller sees the error.
    pub async fn send_faq_contact(&self, dto: FaqContactDto) -> Result<()> {
        let team_html = render_email(
            "faq_team.html",
            context! {
                has_logo => self.logo.is_some(),
                vorname => &dto.vorname,
                nachname => &dto.nachname,
                email => &dto.email,
                telefon => &dto.telefon,
                nachricht => &dto.nachricht,
            },
        )?;

        self.mailer
            .send(OutgoingEmail {
                to: self.ops_mailbox.clone(),
                subject: format!("Neue FAQ-Anfrage von {} {}", dto.vorname, dto.nachname),
                html_body: team_html,
                attachments: self.logo_attachment(),
            })
            .await?;

        let confirmation_html = render_email(
            "faq_confirmation.html",
            context! {
                has_logo => self.logo.is_some(),
                vorname => &dto.vorname,
                nachricht => &dto.nachricht,
            },
        )?;

        self.mailer
            .send(OutgoingEmail {
                to: dto.email.clone(),
                subject: "Ihre Anfrage bei Rechtly".to_string(),
                html_body: confirmation_html,
                attachments: self.logo_attachment(),
            })
            .await?;

        info!("FAQ contact message forwarded to {}", self.ops_mailbox);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> Result<()> {
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    struct FailingMailer {
        attempts: Mutex<usize>,
    }

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _email: OutgoingEmail) -> Result<()> {
            *self.attempts.lock().unwrap() += 1;
            Err(AppError::Upstream("smtp down".to_string()))
        }
    }

    fn config() -> NotificationConfig {
        NotificationConfig {
            ops_mailbox: "anfragen@rechtly.de".to_string(),
            logo_path: None,
            poll_interval: Duration::from_secs(1),
            max_attempts: 3,
        }
    }

    fn message() -> FaqContactDto {
        FaqContactDto {
            vorname: "Max".to_string(),
            nachname: "Mustermann".to_string(),
            email: "max@example.de".to_string(),
            telefon: "+49 170 1234567".to_string(),
            nachricht: "Wie lange dauert ein Einspruch?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sends_ops_copy_then_sender_confirmation() {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
        });
        let service = ContactService::new(Arc::clone(&mailer) as Arc<dyn Mailer>, &config());

        service.send_faq_contact(message()).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);

        assert_eq!(sent[0].to, "anfragen@rechtly.de");
        assert_eq!(sent[0].subject, "Neue FAQ-Anfrage von Max Mustermann");
        assert!(sent[0].html_body.contains("Wie lange dauert ein Einspruch?"));
        assert!(sent[0].html_body.contains("+49 170 1234567"));

        assert_eq!(sent[1].to, "max@example.de");
        assert_eq!(sent[1].subject, "Ihre Anfrage bei Rechtly");
        assert!(sent[1].html_body.contains("Hallo Max,"));
    }

    #[tokio::test]
    async fn test_ops_failure_skips_sender_confirmation() {
        let mailer = Arc::new(FailingMailer {
            attempts: Mutex::new(0),
        });
        let service = ContactService::new(Arc::clone(&mailer) as Arc<dyn Mailer>, &config());

        let err = service.send_faq_contact(message()).await.unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(*mailer.attempts.lock().unwrap(), 1);
    }

    #[test]
    fn test_no_logo_means_no_attachments() {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
        });
        let service = ContactService::new(mailer as Arc<dyn Mailer>, &config());
        assert!(service.logo_attachment().is_empty());
    }
}
