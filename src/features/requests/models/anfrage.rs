use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::requests::models::AnfrageDetails;

/// Intake request variant enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "anfrage_typ", rename_all = "snake_case")]
#[serde(rename_all = "kebab-case")]
pub enum AnfrageTyp {
    Bussgeld,
    Verkehrsunfall,
    KfzGutachten,
}

impl std::fmt::Display for AnfrageTyp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnfrageTyp::Bussgeld => write!(f, "bussgeld"),
            AnfrageTyp::Verkehrsunfall => write!(f, "verkehrsunfall"),
            AnfrageTyp::KfzGutachten => write!(f, "kfz-gutachten"),
        }
    }
}

/// Processing status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "anfrage_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AnfrageStatus {
    Neu,
    InBearbeitung,
    Abgeschlossen,
}

/// Embedded snapshot of an uploaded document at submission time.
///
/// Deliberately denormalized: deleting the source document later must not
/// corrupt an already-submitted Anfrage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DokumentRef {
    pub id: Uuid,
    pub name: String,
    pub path: String,
}

/// Database model for an intake request
#[derive(Debug, Clone, FromRow)]
pub struct Anfrage {
    pub id: Uuid,
    pub anfrage_typ: AnfrageTyp,
    pub anrede: Option<String>,
    pub titel: Option<String>,
    pub vorname: String,
    pub nachname: String,
    pub email: String,
    pub telefon: Option<String>,
    pub strasse: String,
    pub hausnummer: Option<String>,
    pub plz: String,
    pub ort: String,
    pub details: Json<AnfrageDetails>,
    pub dokumente: Json<Vec<DokumentRef>>,
    pub datenschutz: bool,
    pub anwalt_einwilligung: bool,
    pub status: AnfrageStatus,
    pub erstellt_am: DateTime<Utc>,
    pub aktualisiert_am: DateTime<Utc>,
}
