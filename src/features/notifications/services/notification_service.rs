use futures::future::join_all;
use minijinja::context;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::config::NotificationConfig;
use crate::core::error::Result;
use crate::features::notifications::services::fields::{summary_fields, variant_name};
use crate::features::notifications::services::pdf_service::render_summary_pdf;
use crate::features::requests::dtos::AnfrageResponseDto;
use crate::features::requests::models::DokumentRef;
use crate::modules::mailer::{EmailAttachment, Mailer, OutgoingEmail};
use crate::modules::storage::ObjectStore;
use crate::shared::templates::render_email;

const LOGO_CID: &str = "rechtlylogo";

/// Outcome of pulling referenced documents from the object store.
///
/// A fetch failure drops the document from the attachment set instead of
/// aborting the send, so both halves are reported explicitly.
#[derive(Debug)]
pub struct DocumentFetchResult {
    pub succeeded: Vec<EmailAttachment>,
    pub failed: Vec<String>,
}

/// Composes and sends the two per-submission emails: a confirmation to the
/// submitter and a data dump to the operations mailbox. Both carry the same
/// attachments: inline logo, rendered PDF summary, every fetched document.
pub struct NotificationService {
    store: Arc<dyn ObjectStore>,
    mailer: Arc<dyn Mailer>,
    ops_mailbox: String,
    logo: Option<Vec<u8>>,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
        config: &NotificationConfig,
    ) -> Self {
        let logo = config.logo_path.as_deref().and_then(|path| {
            std::fs::read(path)
                .inspect_err(|e| warn!("Logo {} not readable, emails go out without it: {}", path, e))
                .ok()
        });

        Self {
            store,
            mailer,
            ops_mailbox: config.ops_mailbox.clone(),
            logo,
        }
    }

    /// Send both notification emails for one submission.
    ///
    /// Not idempotent: calling this twice sends four emails. Deduplication
    /// is the outbox's job. The operations email goes out first; a failure
    /// there skips the customer email entirely.
    pub async fn notify(&self, anfrage: &AnfrageResponseDto) -> Result<()> {
        let name = variant_name(anfrage.anfrage_typ);
        let fields = summary_fields(anfrage);

        let pdf = render_summary_pdf(
            &format!("{}-Anfrage Übersicht", name),
            &fields,
            self.logo.as_deref(),
        )?;

        let documents = self.fetch_documents(&anfrage.dokumente).await;
        for path in &documents.failed {
            warn!(anfrage_id = %anfrage.id, path = %path, "Attachment dropped, fetch failed");
        }

        let mut attachments: Vec<EmailAttachment> = Vec::new();
        if let Some(logo) = &self.logo {
            attachments.push(EmailAttachment {
                filename: "rechtly-logo.png".to_string(),
                content_type: "image/png".to_string(),
                bytes: logo.clone(),
                inline_cid: Some(LOGO_CID.to_string()),
            });
        }
        attachments.push(EmailAttachment {
            filename: format!("{}-Anfrage.pdf", name),
            content_type: "application/pdf".to_string(),
            bytes: pdf,
            inline_cid: None,
        });
        attachments.extend(documents.succeeded.iter().cloned());

        let field_ctx: Vec<_> = fields
            .iter()
            .map(|(label, value)| context! { label => label, value => value })
            .collect();
        let attachment_count = documents.succeeded.len();

        let team_html = render_email(
            "team_notification.html",
            context! {
                has_logo => self.logo.is_some(),
                variant_name => name,
                fields => field_ctx.clone(),
                attachment_count => attachment_count,
                eingegangen_am => anfrage.erstellt_am.format("%d.%m.%Y, %H:%M").to_string(),
            },
        )?;

        let customer_html = render_email(
            "customer_confirmation.html",
            context! {
                has_logo => self.logo.is_some(),
                variant_name => name,
                vorname => anfrage.vorname,
                nachname => anfrage.nachname,
                fields => field_ctx,
                attachment_count => attachment_count,
            },
        )?;

        self.mailer
            .send(OutgoingEmail {
                to: self.ops_mailbox.clone(),
                subject: format!("Neue {}-Anfrage", name),
                html_body: team_html,
                attachments: attachments.clone(),
            })
            .await?;

        self.mailer
            .send(OutgoingEmail {
                to: anfrage.email.clone(),
                subject: format!("Ihre {}-Anfrage bei Rechtly", name),
                html_body: customer_html,
                attachments,
            })
            .await?;

        info!(
            anfrage_id = %anfrage.id,
            attachments = attachment_count,
            "notification emails sent"
        );

        Ok(())
    }

    /// Pull every referenced document from the object store concurrently.
    async fn fetch_documents(&self, dokumente: &[DokumentRef]) -> DocumentFetchResult {
        let fetches = dokumente.iter().map(|doc| async move {
            match self.store.get(&doc.path).await {
                Ok(bytes) => Ok(EmailAttachment {
                    filename: doc.name.clone(),
                    content_type: guess_content_type(&doc.name).to_string(),
                    bytes,
                    inline_cid: None,
                }),
                Err(_) => Err(doc.path.clone()),
            }
        });

        let mut result = DocumentFetchResult {
            succeeded: Vec::new(),
            failed: Vec::new(),
        };
        for outcome in join_all(fetches).await {
            match outcome {
                Ok(attachment) => result.succeeded.push(attachment),
                Err(path) => result.failed.push(path),
            }
        }
        result
    }
}

fn guess_content_type(filename: &str) -> &'static str {
    match filename.rsplit('.').next() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::features::requests::models::{
        AnfrageDetails, AnfrageStatus, AnfrageTyp, BussgeldDetails,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use uuid::Uuid;

    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingEmail>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, email: OutgoingEmail) -> crate::core::error::Result<()> {
            self.sent.lock().unwrap().push(email);
            Ok(())
        }
    }

    struct MemoryStore {
        objects: HashMap<String, Vec<u8>>,
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn put(
            &self,
            _key: &str,
            _data: Vec<u8>,
            _content_type: &str,
        ) -> crate::core::error::Result<()> {
            Ok(())
        }

        async fn get(&self, key: &str) -> crate::core::error::Result<Vec<u8>> {
            self.objects
                .get(key)
                .cloned()
                .ok_or_else(|| AppError::Upstream(format!("no object {}", key)))
        }

        async fn delete(&self, _key: &str) -> crate::core::error::Result<()> {
            Ok(())
        }

        async fn exists(&self, key: &str) -> crate::core::error::Result<bool> {
            Ok(self.objects.contains_key(key))
        }
    }

    fn config() -> NotificationConfig {
        NotificationConfig {
            ops_mailbox: "anfragen@rechtly.de".to_string(),
            logo_path: None,
            poll_interval: Duration::from_secs(10),
            max_attempts: 3,
        }
    }

    fn anfrage(dokumente: Vec<DokumentRef>) -> AnfrageResponseDto {
        AnfrageResponseDto {
            id: Uuid::new_v4(),
            anfrage_typ: AnfrageTyp::Bussgeld,
            anrede: None,
            titel: None,
            vorname: "Max".to_string(),
            nachname: "Mustermann".to_string(),
            email: "max@example.com".to_string(),
            telefon: None,
            strasse: "Hauptstrasse".to_string(),
            hausnummer: None,
            plz: "50667".to_string(),
            ort: "Köln".to_string(),
            details: AnfrageDetails::Bussgeld(BussgeldDetails::default()),
            dokumente,
            datenschutz: true,
            anwalt_einwilligung: true,
            status: AnfrageStatus::Neu,
            erstellt_am: Utc::now(),
            aktualisiert_am: Utc::now(),
        }
    }

    fn service(objects: HashMap<String, Vec<u8>>) -> (NotificationService, Arc<RecordingMailer>) {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
        });
        let service = NotificationService::new(
            Arc::new(MemoryStore { objects }),
            mailer.clone(),
            &config(),
        );
        (service, mailer)
    }

    #[tokio::test]
    async fn test_sends_ops_mail_first_then_customer() {
        let (service, mailer) = service(HashMap::new());

        service.notify(&anfrage(vec![])).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "anfragen@rechtly.de");
        assert_eq!(sent[0].subject, "Neue Bußgeld-Anfrage");
        assert_eq!(sent[1].to, "max@example.com");
        assert_eq!(sent[1].subject, "Ihre Bußgeld-Anfrage bei Rechtly");
    }

    #[tokio::test]
    async fn test_both_mails_carry_pdf_and_documents() {
        let doc_id = Uuid::new_v4();
        let mut objects = HashMap::new();
        objects.insert(
            "requests/REQ-20260829-1000/BUSSGELD/bescheid-pdf-1.pdf".to_string(),
            b"fake pdf bytes".to_vec(),
        );
        let (service, mailer) = service(objects);

        let anfrage = anfrage(vec![DokumentRef {
            id: doc_id,
            name: "bescheid-pdf-1.pdf".to_string(),
            path: "requests/REQ-20260829-1000/BUSSGELD/bescheid-pdf-1.pdf".to_string(),
        }]);
        service.notify(&anfrage).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        for email in sent.iter() {
            assert_eq!(email.attachments.len(), 2);
            assert_eq!(email.attachments[0].filename, "Bußgeld-Anfrage.pdf");
            assert!(email.attachments[0].bytes.starts_with(b"%PDF"));
            assert_eq!(email.attachments[1].filename, "bescheid-pdf-1.pdf");
        }
    }

    #[tokio::test]
    async fn test_unfetchable_document_is_dropped_not_fatal() {
        let (service, mailer) = service(HashMap::new());

        let anfrage = anfrage(vec![DokumentRef {
            id: Uuid::new_v4(),
            name: "weg.png".to_string(),
            path: "requests/REQ-20260829-1000/BUSSGELD/weg.png".to_string(),
        }]);
        service.notify(&anfrage).await.unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        // Only the PDF summary remains attached.
        assert_eq!(sent[0].attachments.len(), 1);
    }

    #[tokio::test]
    async fn test_notify_twice_sends_four_emails() {
        let (service, mailer) = service(HashMap::new());
        let anfrage = anfrage(vec![]);

        service.notify(&anfrage).await.unwrap();
        service.notify(&anfrage).await.unwrap();

        assert_eq!(mailer.sent.lock().unwrap().len(), 4);
    }
}
