use sqlx::PgPool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::services::outbox;
use crate::features::requests::dtos::{SubmitAnfrageDto, UpdateAnfrageDto};
use crate::features::requests::models::{Anfrage, AnfrageDetails, AnfrageTyp, DokumentRef};
use crate::features::uploads::models::Document;
use crate::shared::types::PaginationQuery;
use crate::shared::validation::{EMAIL_REGEX, PLZ_REGEX};

/// Consent requirements per intake variant.
///
/// Assessment requests are pre-contractual quotes, so consent is implied by
/// submission. The two legal-representation variants need explicit opt-ins.
#[derive(Debug, Clone, Copy)]
pub struct ConsentPolicy {
    pub datenschutz_required: bool,
    pub anwalt_required: bool,
}

impl ConsentPolicy {
    pub fn for_typ(typ: AnfrageTyp) -> Self {
        match typ {
            AnfrageTyp::Bussgeld | AnfrageTyp::Verkehrsunfall => Self {
                datenschutz_required: true,
                anwalt_required: true,
            },
            AnfrageTyp::KfzGutachten => Self {
                datenschutz_required: false,
                anwalt_required: false,
            },
        }
    }
}

/// Validate contact data and resolve the consent flags for a submission.
///
/// Returns the effective `(datenschutz, anwalt_einwilligung)` pair. Consents
/// that the variant does not require default to granted.
pub fn validate_submission(typ: AnfrageTyp, dto: &SubmitAnfrageDto) -> Result<(bool, bool)> {
    let mut errors: Vec<String> = Vec::new();

    let required = [
        ("vorname", &dto.vorname),
        ("nachname", &dto.nachname),
        ("email", &dto.email),
        ("strasse", &dto.strasse),
        ("plz", &dto.plz),
        ("ort", &dto.ort),
    ];
    for (field, value) in required {
        if value.as_deref().map(str::trim).unwrap_or("").is_empty() {
            errors.push(format!("{} ist erforderlich", field));
        }
    }

    if let Some(email) = dto.email.as_deref() {
        if !email.trim().is_empty() && !EMAIL_REGEX.is_match(email.trim()) {
            errors.push("email ist ungültig".to_string());
        }
    }
    if let Some(plz) = dto.plz.as_deref() {
        if !plz.trim().is_empty() && !PLZ_REGEX.is_match(plz.trim()) {
            errors.push("plz muss aus fünf Ziffern bestehen".to_string());
        }
    }

    let policy = ConsentPolicy::for_typ(typ);
    let datenschutz = dto.dsgvo_einwilligung.unwrap_or(!policy.datenschutz_required);
    let anwalt = dto.anwalt_einwilligung.unwrap_or(!policy.anwalt_required);

    if policy.datenschutz_required && !datenschutz {
        errors.push("dsgvoEinwilligung ist erforderlich".to_string());
    }
    if policy.anwalt_required && !anwalt {
        errors.push("anwaltEinwilligung ist erforderlich".to_string());
    }

    if errors.is_empty() {
        Ok((datenschutz, anwalt))
    } else {
        Err(AppError::Validation(errors.join("; ")))
    }
}

/// Intake request service: validates submissions, snapshots attached
/// documents and persists the request together with its outbox entry.
pub struct AnfrageService {
    pool: PgPool,
}

impl AnfrageService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new intake request and enqueue its notifications.
    ///
    /// The request row and the outbox row are written in one transaction,
    /// so a committed request always has pending notifications.
    pub async fn submit(&self, typ: AnfrageTyp, dto: SubmitAnfrageDto) -> Result<Anfrage> {
        let (datenschutz, anwalt_einwilligung) = validate_submission(typ, &dto)?;
        let details = dto.details_for(typ);
        let dokumente = self.resolve_documents(&dto.dokument_ids).await?;

        debug!(
            anfrage_typ = %typ,
            dokumente = dokumente.len(),
            "storing intake request"
        );

        let mut tx = self.pool.begin().await?;

        let anfrage = sqlx::query_as::<_, Anfrage>(
            r#"
            INSERT INTO anfragen (
                anfrage_typ, anrede, titel, vorname, nachname, email, telefon,
                strasse, hausnummer, plz, ort, details, dokumente,
                datenschutz, anwalt_einwilligung
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(typ)
        .bind(dto.anrede.as_deref().map(str::trim))
        .bind(dto.titel.as_deref().map(str::trim))
        .bind(dto.vorname.as_deref().map(str::trim))
        .bind(dto.nachname.as_deref().map(str::trim))
        .bind(dto.email.as_deref().map(str::trim))
        .bind(dto.telefon.as_deref().map(str::trim))
        .bind(dto.strasse.as_deref().map(str::trim))
        .bind(dto.hausnummer.as_deref().map(str::trim))
        .bind(dto.plz.as_deref().map(str::trim))
        .bind(dto.ort.as_deref().map(str::trim))
        .bind(sqlx::types::Json(&details))
        .bind(sqlx::types::Json(&dokumente))
        .bind(datenschutz)
        .bind(anwalt_einwilligung)
        .fetch_one(&mut *tx)
        .await?;

        outbox::enqueue(&mut tx, &anfrage).await?;

        tx.commit().await?;

        info!(
            anfrage_id = %anfrage.id,
            anfrage_typ = %typ,
            "intake request stored"
        );

        Ok(anfrage)
    }

    /// Snapshot the referenced documents in the order they were submitted.
    ///
    /// Unknown ids are dropped silently; the client may reference uploads
    /// that were already deleted again.
    async fn resolve_documents(&self, dokument_ids: &[Uuid]) -> Result<Vec<DokumentRef>> {
        if dokument_ids.is_empty() {
            return Ok(Vec::new());
        }

        let documents = sqlx::query_as::<_, Document>(
            "SELECT * FROM documents WHERE id = ANY($1)",
        )
        .bind(dokument_ids)
        .fetch_all(&self.pool)
        .await?;

        let refs = dokument_ids
            .iter()
            .filter_map(|id| {
                documents.iter().find(|d| d.id == *id).map(|d| DokumentRef {
                    id: d.id,
                    name: d.filename.clone(),
                    path: d.pfad.clone(),
                })
            })
            .collect();

        Ok(refs)
    }

    pub async fn list(&self, pagination: &PaginationQuery) -> Result<(Vec<Anfrage>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM anfragen")
            .fetch_one(&self.pool)
            .await?;

        let anfragen = sqlx::query_as::<_, Anfrage>(
            "SELECT * FROM anfragen ORDER BY erstellt_am DESC LIMIT $1 OFFSET $2",
        )
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((anfragen, total))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Anfrage> {
        sqlx::query_as::<_, Anfrage>("SELECT * FROM anfragen WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Anfrage {} not found", id)))
    }

    /// Update status and/or variant payload of a stored request.
    ///
    /// A replacement payload must carry the same variant tag as the stored
    /// request; the variant of a request never changes after submission.
    pub async fn update(&self, id: Uuid, dto: UpdateAnfrageDto) -> Result<Anfrage> {
        let existing = self.get_by_id(id).await?;

        if let Some(details) = &dto.details {
            let matches = matches!(
                (details, existing.anfrage_typ),
                (AnfrageDetails::Bussgeld(_), AnfrageTyp::Bussgeld)
                    | (AnfrageDetails::Verkehrsunfall(_), AnfrageTyp::Verkehrsunfall)
                    | (AnfrageDetails::KfzGutachten(_), AnfrageTyp::KfzGutachten)
            );
            if !matches {
                return Err(AppError::Validation(format!(
                    "details passen nicht zum Anfragetyp {}",
                    existing.anfrage_typ
                )));
            }
        }

        let status = dto.status.unwrap_or(existing.status);
        let details = dto.details.unwrap_or(existing.details.0);

        let anfrage = sqlx::query_as::<_, Anfrage>(
            r#"
            UPDATE anfragen
            SET status = $2, details = $3, aktualisiert_am = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(sqlx::types::Json(&details))
        .fetch_one(&self.pool)
        .await?;

        Ok(anfrage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_dto() -> SubmitAnfrageDto {
        serde_json::from_str(
            r#"{
                "vorname": "Max",
                "nachname": "Mustermann",
                "email": "max@example.com",
                "strasse": "Hauptstrasse",
                "hausnummer": "12",
                "plz": "50667",
                "ort": "Köln",
                "dsgvoEinwilligung": true,
                "anwaltEinwilligung": "true"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_submission_passes() {
        let (datenschutz, anwalt) =
            validate_submission(AnfrageTyp::Bussgeld, &valid_dto()).unwrap();
        assert!(datenschutz);
        assert!(anwalt);
    }

    #[test]
    fn test_missing_contact_fields_rejected() {
        let mut dto = valid_dto();
        dto.vorname = None;
        dto.ort = Some("   ".to_string());

        let err = validate_submission(AnfrageTyp::Bussgeld, &dto).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("vorname"));
                assert!(msg.contains("ort"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_email_and_plz_rejected() {
        let mut dto = valid_dto();
        dto.email = Some("not-an-email".to_string());
        dto.plz = Some("507".to_string());

        let err = validate_submission(AnfrageTyp::Verkehrsunfall, &dto).unwrap_err();
        match err {
            AppError::Validation(msg) => {
                assert!(msg.contains("email"));
                assert!(msg.contains("plz"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_legal_variants_require_both_consents() {
        let mut dto = valid_dto();
        dto.anwalt_einwilligung = Some(false);

        let err = validate_submission(AnfrageTyp::Bussgeld, &dto).unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("anwaltEinwilligung")));

        let mut dto = valid_dto();
        dto.dsgvo_einwilligung = None;
        assert!(validate_submission(AnfrageTyp::Verkehrsunfall, &dto).is_err());
    }

    #[test]
    fn test_assessment_variant_defaults_consents_to_granted() {
        let mut dto = valid_dto();
        dto.dsgvo_einwilligung = None;
        dto.anwalt_einwilligung = None;

        let (datenschutz, anwalt) =
            validate_submission(AnfrageTyp::KfzGutachten, &dto).unwrap();
        assert!(datenschutz);
        assert!(anwalt);
    }
}
