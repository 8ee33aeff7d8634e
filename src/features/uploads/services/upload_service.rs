use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::uploads::dtos::{
    is_mime_type_allowed, AcceptedFileDto, RejectedFileDto, UploadResultDto, MAX_FILE_SIZE,
};
use crate::features::uploads::models::{Document, DokumentArt};
use crate::modules::storage::ObjectStore;

/// One file part taken from the multipart request.
#[derive(Debug)]
pub struct IncomingFile {
    pub original_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Optional metadata accompanying an upload batch.
#[derive(Debug, Default)]
pub struct UploadMetadata {
    pub anfrage_id: Option<String>,
    pub dokument_typ: Option<DokumentArt>,
    pub kontakt_name: Option<String>,
    pub kontakt_email: Option<String>,
    pub kontakt_telefon: Option<String>,
}

/// Generate a correlation id in format: REQ-YYYYMMDD-HHMM
///
/// Minute resolution is deliberate: uploads within the same minute share a
/// correlation id so the intake form can group them. Blob keys stay unique
/// via the per-file timestamp salt in [`safe_filename`].
pub fn generate_anfrage_id(now: DateTime<Utc>) -> String {
    format!("REQ-{}-{}", now.format("%Y%m%d"), now.format("%H%M"))
}

/// Build a storage-safe, unique filename from the client-supplied name.
///
/// The whole original name (extension included) is lower-cased with every
/// non-alphanumeric character replaced by `-`, then salted with a
/// millisecond timestamp and re-suffixed with the original extension:
/// `schaden.png` becomes `schaden-png-1718190000000.png`.
pub fn safe_filename(original_name: &str, now: DateTime<Utc>) -> String {
    let sanitized: String = original_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect();

    let extension = original_name.rsplit('.').next().unwrap_or("bin");

    format!(
        "{}-{}.{}",
        sanitized,
        now.timestamp_millis(),
        extension.to_ascii_lowercase()
    )
}

/// Object store key for an uploaded document.
pub fn storage_key(anfrage_id: &str, art: DokumentArt, filename: &str) -> String {
    format!("requests/{}/{}/{}", anfrage_id, art, filename)
}

/// Per-file admission gate: mime type and size.
fn check_constraints(file: &IncomingFile) -> Result<()> {
    if !is_mime_type_allowed(&file.content_type) {
        return Err(AppError::Validation(format!(
            "File type '{}' is not allowed. Only images and PDFs are accepted",
            file.content_type
        )));
    }

    if file.bytes.len() > MAX_FILE_SIZE {
        return Err(AppError::Validation(format!(
            "File too large. Maximum size is {} bytes",
            MAX_FILE_SIZE
        )));
    }

    Ok(())
}

/// Split a batch into storable candidates and constraint rejections.
fn partition_by_constraints(
    files: Vec<IncomingFile>,
) -> (Vec<IncomingFile>, Vec<RejectedFileDto>) {
    let mut candidates = Vec::new();
    let mut rejected = Vec::new();
    for file in files {
        match check_constraints(&file) {
            Ok(()) => candidates.push(file),
            Err(e) => rejected.push(RejectedFileDto {
                originalname: file.original_name,
                reason: e.to_string(),
            }),
        }
    }
    (candidates, rejected)
}

/// Upload coordinator: writes file blobs to the object store and one
/// metadata row per accepted file.
pub struct UploadService {
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
}

impl UploadService {
    pub fn new(pool: PgPool, store: Arc<dyn ObjectStore>) -> Self {
        Self { pool, store }
    }

    /// Store a batch of uploaded files.
    ///
    /// Each file is written to the object store, then recorded in the
    /// documents table. The two writes are not atomic: a failure in either
    /// skips that file (it lands in `rejected`) and processing continues
    /// with the next one. The call only fails when no file at all could be
    /// stored.
    pub async fn upload_files(
        &self,
        files: Vec<IncomingFile>,
        mut metadata: UploadMetadata,
    ) -> Result<UploadResultDto> {
        if files.is_empty() {
            return Err(AppError::BadRequest("No files to upload".to_string()));
        }

        let anfrage_id = metadata
            .anfrage_id
            .take()
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| generate_anfrage_id(Utc::now()));
        let art = metadata.dokument_typ.unwrap_or(DokumentArt::Bussgeld);

        debug!(
            anfrage_id = %anfrage_id,
            art = %art,
            count = files.len(),
            "Processing upload batch"
        );

        let (candidates, mut rejected) = partition_by_constraints(files);
        let mut accepted = Vec::new();

        for file in candidates {
            match self.store_one(&anfrage_id, art, &metadata, &file).await {
                Ok(dto) => accepted.push(dto),
                Err(e) => {
                    warn!(
                        originalname = %file.original_name,
                        "Skipping file in upload batch: {}",
                        e
                    );
                    rejected.push(RejectedFileDto {
                        originalname: file.original_name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if accepted.is_empty() {
            return Err(AppError::Internal(
                "No files could be uploaded".to_string(),
            ));
        }

        info!(
            anfrage_id = %anfrage_id,
            accepted = accepted.len(),
            rejected = rejected.len(),
            "Upload batch completed"
        );

        Ok(UploadResultDto {
            files: accepted,
            rejected,
            anfrage_id,
        })
    }

    /// Store one admitted file: blob write, then the metadata row.
    async fn store_one(
        &self,
        anfrage_id: &str,
        art: DokumentArt,
        metadata: &UploadMetadata,
        file: &IncomingFile,
    ) -> Result<AcceptedFileDto> {
        let filename = safe_filename(&file.original_name, Utc::now());
        let key = storage_key(anfrage_id, art, &filename);

        self.store
            .put(&key, file.bytes.clone(), &file.content_type)
            .await?;

        debug!("File uploaded to object store: {}", key);

        let document = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (
                anfrage_id, art, kontakt_name, kontakt_email, kontakt_telefon, filename, pfad
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(anfrage_id)
        .bind(art)
        .bind(&metadata.kontakt_name)
        .bind(&metadata.kontakt_email)
        .bind(&metadata.kontakt_telefon)
        .bind(&filename)
        .bind(&key)
        .fetch_one(&self.pool)
        .await?;

        info!(
            "Document metadata saved: id={}, key={}",
            document.id, document.pfad
        );

        Ok(AcceptedFileDto {
            id: document.id,
            originalname: file.original_name.clone(),
            filename: document.filename,
            path: document.pfad,
            mimetype: file.content_type.clone(),
            size: file.bytes.len(),
        })
    }

    /// Delete an uploaded document: blob first, then the metadata row.
    ///
    /// The two deletes are sequential and not transactional; a failure
    /// between them can leave an orphan on either side.
    pub async fn delete_document(&self, document_id: Uuid) -> Result<()> {
        let document =
            sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
                .bind(document_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        self.store.delete(&document.pfad).await?;
        debug!("Blob deleted from object store: {}", document.pfad);

        sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await?;

        info!("Document deleted: id={}, key={}", document.id, document.pfad);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_anfrage_id_format() {
        let now = Utc.with_ymd_and_hms(2025, 6, 12, 9, 5, 30).unwrap();
        assert_eq!(generate_anfrage_id(now), "REQ-20250612-0905");
    }

    #[test]
    fn test_anfrage_id_collides_within_same_minute() {
        // Minute resolution means ids collide inside one minute; that is
        // the accepted grouping behavior, not a bug.
        let a = Utc.with_ymd_and_hms(2025, 6, 12, 9, 5, 1).unwrap();
        let b = Utc.with_ymd_and_hms(2025, 6, 12, 9, 5, 59).unwrap();
        assert_eq!(generate_anfrage_id(a), generate_anfrage_id(b));
    }

    #[test]
    fn test_safe_filename_sanitizes_and_salts() {
        let now = Utc.with_ymd_and_hms(2025, 6, 12, 9, 5, 0).unwrap();
        let millis = now.timestamp_millis();
        assert_eq!(
            safe_filename("schaden.png", now),
            format!("schaden-png-{}.png", millis)
        );
        assert_eq!(
            safe_filename("Unfall Bericht (2).PDF", now),
            format!("unfall-bericht--2--pdf-{}.pdf", millis)
        );
    }

    #[test]
    fn test_safe_filename_without_extension() {
        let now = Utc.with_ymd_and_hms(2025, 6, 12, 9, 5, 0).unwrap();
        let name = safe_filename("scan", now);
        // No dot in the name: the whole name doubles as the extension.
        assert_eq!(name, format!("scan-{}.scan", now.timestamp_millis()));
    }

    #[test]
    fn test_storage_key_layout() {
        let key = storage_key("REQ-20250612-0905", DokumentArt::Verkehrsunfall, "a-1.png");
        assert_eq!(key, "requests/REQ-20250612-0905/VERKEHRSUNFALL/a-1.png");
    }

    #[test]
    fn test_identical_names_get_distinct_keys() {
        let a = Utc.with_ymd_and_hms(2025, 6, 12, 9, 5, 0).unwrap();
        let b = a + chrono::Duration::milliseconds(1);
        assert_ne!(safe_filename("schaden.png", a), safe_filename("schaden.png", b));
    }

    fn incoming(name: &str, mime: &str, size: usize) -> IncomingFile {
        IncomingFile {
            original_name: name.to_string(),
            content_type: mime.to_string(),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn test_partition_keeps_valid_files_and_rejects_oversized() {
        let files = vec![
            incoming("a.png", "image/png", 128),
            incoming("b.jpg", "image/jpeg", 256),
            incoming("riesig.pdf", "application/pdf", MAX_FILE_SIZE + 1),
            incoming("c.pdf", "application/pdf", 512),
        ];

        let (candidates, rejected) = partition_by_constraints(files);

        assert_eq!(candidates.len(), 3);
        assert_eq!(
            candidates.iter().map(|f| f.original_name.as_str()).collect::<Vec<_>>(),
            vec!["a.png", "b.jpg", "c.pdf"]
        );
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].originalname, "riesig.pdf");
        assert!(rejected[0].reason.contains("too large"));
    }

    #[test]
    fn test_partition_rejects_disallowed_mime_type() {
        let files = vec![
            incoming("macro.exe", "application/x-msdownload", 64),
            incoming("a.png", "image/png", 64),
        ];

        let (candidates, rejected) = partition_by_constraints(files);

        assert_eq!(candidates.len(), 1);
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].originalname, "macro.exe");
        assert!(rejected[0].reason.contains("not allowed"));
    }

    /// Store double that must never be reached when every file is
    /// rejected up front.
    struct UnreachableStore;

    #[async_trait::async_trait]
    impl ObjectStore for UnreachableStore {
        async fn put(&self, _key: &str, _data: Vec<u8>, _content_type: &str) -> Result<()> {
            panic!("put called for a batch with no admissible file");
        }

        async fn get(&self, _key: &str) -> Result<Vec<u8>> {
            panic!("get called for a batch with no admissible file");
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            panic!("delete called for a batch with no admissible file");
        }

        async fn exists(&self, _key: &str) -> Result<bool> {
            panic!("exists called for a batch with no admissible file");
        }
    }

    fn lazy_service() -> UploadService {
        // connect_lazy opens no connection; these tests never reach the
        // database because nothing passes the admission gate.
        let pool = PgPool::connect_lazy("postgres://localhost/unreachable").unwrap();
        UploadService::new(pool, Arc::new(UnreachableStore))
    }

    #[tokio::test]
    async fn test_batch_with_no_admissible_file_is_a_server_error() {
        let service = lazy_service();
        let metadata = UploadMetadata {
            anfrage_id: Some("REQ-20250612-0905".to_string()),
            ..Default::default()
        };
        let files = vec![
            incoming("riesig.pdf", "application/pdf", MAX_FILE_SIZE + 1),
            incoming("macro.exe", "application/x-msdownload", 64),
        ];

        let err = service.upload_files(files, metadata).await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_bad_request() {
        let service = lazy_service();
        let err = service
            .upload_files(Vec::new(), UploadMetadata::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
