use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Document category enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "dokument_art", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DokumentArt {
    Bussgeld,
    Kfzgutachten,
    Verkehrsunfall,
}

impl std::fmt::Display for DokumentArt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DokumentArt::Bussgeld => write!(f, "BUSSGELD"),
            DokumentArt::Kfzgutachten => write!(f, "KFZGUTACHTEN"),
            DokumentArt::Verkehrsunfall => write!(f, "VERKEHRSUNFALL"),
        }
    }
}

impl std::str::FromStr for DokumentArt {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BUSSGELD" => Ok(DokumentArt::Bussgeld),
            "KFZGUTACHTEN" => Ok(DokumentArt::Kfzgutachten),
            "VERKEHRSUNFALL" => Ok(DokumentArt::Verkehrsunfall),
            _ => Err(()),
        }
    }
}

/// Database model for uploaded document metadata.
///
/// One row per accepted file. Rows are immutable after insert; the only
/// lifecycle operation is deletion by id, which also removes the blob.
#[derive(Debug, Clone, FromRow)]
pub struct Document {
    pub id: Uuid,
    pub anfrage_id: String,
    pub art: DokumentArt,
    pub kontakt_name: Option<String>,
    pub kontakt_email: Option<String>,
    pub kontakt_telefon: Option<String>,
    pub filename: String,
    pub pfad: String,
    pub upload_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
