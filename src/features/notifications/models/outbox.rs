use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::features::requests::dtos::AnfrageResponseDto;
use crate::features::requests::models::AnfrageTyp;

/// Delivery state of a queued notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "outbox_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    Pending,
    Sent,
    Failed,
}

/// Durable notification task, written in the same transaction as the
/// Anfrage it belongs to. Delivery is at-least-once: the worker marks an
/// entry sent only after both emails went out, so a crash in between can
/// resend on the next claim.
#[derive(Debug, Clone, FromRow)]
pub struct OutboxEntry {
    pub id: Uuid,
    pub anfrage_id: Uuid,
    pub anfrage_typ: AnfrageTyp,
    pub payload: Json<AnfrageResponseDto>,
    pub status: OutboxStatus,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // An outbox row is a plain data snapshot; the whole entry, payload
    // DTO included, has to stay cloneable.
    #[test]
    fn test_claimed_entries_can_be_cloned() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<OutboxEntry>();
    }
}
