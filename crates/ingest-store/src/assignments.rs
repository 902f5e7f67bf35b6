use ingest_core::types::Assignment;
use sqlx::postgres::PgListener;
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{instrument, warn};

use crate::error::Result;

pub const ASSIGNMENT_UPDATED_CHANNEL: &str = "assignment_updated";
const POLL_FALLBACK: Duration = Duration::from_secs(30);

/// Assignment store (C2): writes the whole assignment map in one
/// transaction, bumping `version` and issuing `NOTIFY` before commit so
/// listeners waiting on `PgListener` observe the change atomically with the
/// write (§OQ-3).
#[instrument(skip(pool, assignments))]
pub async fn write_all(pool: &PgPool, assignments: &HashMap<String, (Vec<i64>, String)>) -> Result<()> {
    let mut tx = pool.begin().await?;
    for (identity_id, (chat_ids, summary)) in assignments {
        sqlx::query(
            r#"
            INSERT INTO assignments (identity_id, chat_ids, version, last_summary, updated_at)
            VALUES ($1, $2, 1, $3, now())
            ON CONFLICT (identity_id) DO UPDATE SET
                chat_ids = EXCLUDED.chat_ids,
                version = assignments.version + 1,
                last_summary = EXCLUDED.last_summary,
                updated_at = now()
            "#,
        )
        .bind(identity_id)
        .bind(chat_ids)
        .bind(summary)
        .execute(&mut *tx)
        .await?;
    }
    sqlx::query(&format!("NOTIFY {}", ASSIGNMENT_UPDATED_CHANNEL))
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(())
}

/// Chat-ids currently allowed for `identity_id` (§4.2 "get_allowed").
pub async fn get_allowed(pool: &PgPool, identity_id: &str) -> Result<Vec<i64>> {
    let row: Option<(Vec<i64>,)> =
        sqlx::query_as("SELECT chat_ids FROM assignments WHERE identity_id = $1")
            .bind(identity_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(ids,)| ids).unwrap_or_default())
}

pub async fn get_assignment(pool: &PgPool, identity_id: &str) -> Result<Option<Assignment>> {
    let row: Option<(Vec<i64>, i64, Option<String>)> = sqlx::query_as(
        "SELECT chat_ids, version, last_summary FROM assignments WHERE identity_id = $1",
    )
    .bind(identity_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(chat_ids, version, last_summary)| Assignment {
        identity_id: identity_id.to_string(),
        chat_ids,
        version,
        last_summary,
    }))
}

/// Waits for the next `assignment_updated` notification, or returns after
/// the 30s poll fallback if the listener connection drops (§4.2 fallback
/// requirement).
pub async fn wait_for_update(pool: &PgPool) -> Result<()> {
    match PgListener::connect_with(pool).await {
        Ok(mut listener) => {
            if let Err(e) = listener.listen(ASSIGNMENT_UPDATED_CHANNEL).await {
                warn!(error = %e, "failed to LISTEN, falling back to poll");
                tokio::time::sleep(POLL_FALLBACK).await;
                return Ok(());
            }
            match tokio::time::timeout(POLL_FALLBACK, listener.recv()).await {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(e)) => {
                    warn!(error = %e, "listener error, falling back to poll");
                    Ok(())
                }
                Err(_) => Ok(()),
            }
        }
        Err(e) => {
            warn!(error = %e, "could not open PgListener, falling back to poll");
            tokio::time::sleep(POLL_FALLBACK).await;
            Ok(())
        }
    }
}
