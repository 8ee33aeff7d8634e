//! Durable notification outbox.
//!
//! Intake writes an outbox row in the same transaction as the Anfrage; a
//! background worker claims pending rows and drives the composer. Delivery
//! is at-least-once, a retried entry can resend both emails.

use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::config::NotificationConfig;
use crate::core::error::Result;
use crate::features::notifications::models::{OutboxEntry, OutboxStatus};
use crate::features::notifications::services::NotificationService;
use crate::features::requests::dtos::AnfrageResponseDto;
use crate::features::requests::models::Anfrage;

/// Queue both notification emails for a freshly persisted Anfrage.
///
/// Must run inside the transaction that inserts the Anfrage itself.
pub async fn enqueue(tx: &mut Transaction<'_, Postgres>, anfrage: &Anfrage) -> Result<()> {
    let payload = AnfrageResponseDto::from(anfrage.clone());

    sqlx::query(
        r#"
        INSERT INTO notification_outbox (anfrage_id, anfrage_typ, payload)
        VALUES ($1, $2, $3)
        "#,
    )
    .bind(anfrage.id)
    .bind(anfrage.anfrage_typ)
    .bind(sqlx::types::Json(&payload))
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Background worker polling the outbox and dispatching notifications.
pub struct OutboxWorker {
    pool: PgPool,
    notifier: Arc<NotificationService>,
    poll_interval: Duration,
    max_attempts: i32,
}

impl OutboxWorker {
    pub fn new(
        pool: PgPool,
        notifier: Arc<NotificationService>,
        config: &NotificationConfig,
    ) -> Self {
        Self {
            pool,
            notifier,
            poll_interval: config.poll_interval,
            max_attempts: config.max_attempts,
        }
    }

    /// Poll loop; runs until the process exits.
    pub async fn run(self) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "notification outbox worker started"
        );
        loop {
            match self.drain().await {
                Ok(0) => {}
                Ok(n) => debug!(processed = n, "outbox batch done"),
                Err(e) => error!("outbox drain failed: {}", e),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Claim and process pending entries until none are left or one fails.
    /// Stopping on failure defers the retry to the next poll instead of
    /// burning all attempts back to back.
    pub async fn drain(&self) -> Result<usize> {
        let mut processed = 0;
        while let Some(entry) = self.claim_next().await? {
            let delivered = self.process(entry).await?;
            processed += 1;
            if !delivered {
                break;
            }
        }
        Ok(processed)
    }

    /// Claim the oldest pending entry, bumping its attempt counter.
    ///
    /// `FOR UPDATE SKIP LOCKED` keeps concurrent workers off the same row.
    async fn claim_next(&self) -> Result<Option<OutboxEntry>> {
        let entry = sqlx::query_as::<_, OutboxEntry>(
            r#"
            UPDATE notification_outbox
            SET attempts = attempts + 1, updated_at = NOW()
            WHERE id = (
                SELECT id FROM notification_outbox
                WHERE status = 'pending'
                ORDER BY created_at
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            RETURNING *
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    async fn process(&self, entry: OutboxEntry) -> Result<bool> {
        match self.notifier.notify(&entry.payload.0).await {
            Ok(()) => {
                self.mark(entry.id, OutboxStatus::Sent, None).await?;
                Ok(true)
            }
            Err(e) => {
                let status = if entry.attempts >= self.max_attempts {
                    warn!(
                        outbox_id = %entry.id,
                        attempts = entry.attempts,
                        "giving up on notification: {}", e
                    );
                    OutboxStatus::Failed
                } else {
                    warn!(
                        outbox_id = %entry.id,
                        attempts = entry.attempts,
                        "notification attempt failed, will retry: {}", e
                    );
                    OutboxStatus::Pending
                };
                self.mark(entry.id, status, Some(e.to_string())).await?;
                Ok(false)
            }
        }
    }

    async fn mark(&self, id: Uuid, status: OutboxStatus, last_error: Option<String>) -> Result<()> {
        sqlx::query(
            "UPDATE notification_outbox SET status = $2, last_error = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .bind(last_error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
