use ingest_core::types::EnrichedMessage;
use sqlx::PgPool;
use tracing::instrument;

use crate::error::Result;

/// Persister (C10): upsert keyed by `(chat_id, message_id)`, one transaction
/// per batch. A conflicting row is left untouched (idempotent at-least-once
/// delivery, §8 round-trip property).
#[instrument(skip(pool, rows), fields(batch_len = rows.len()))]
pub async fn upsert(pool: &PgPool, rows: &[EnrichedMessage]) -> Result<u64> {
    let mut tx = pool.begin().await?;
    let mut written = 0u64;
    for row in rows {
        let intents = row.intents.clone();
        let domains = serde_json::to_value(&row.domains).unwrap_or(serde_json::Value::Null);
        let llm_analysis = row.llm_analysis.clone();
        let openrouter_response = row.openrouter_response.clone();

        let result = sqlx::query(
            r#"
            INSERT INTO messages (
                chat_id, message_id, sender_id, sender_username, chat_username,
                text, intents, domains, urgency_score, is_spam, reasoning,
                llm_analysis, openrouter_response, indexed_at, message_date
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13, now(), $14)
            ON CONFLICT (chat_id, message_id) DO NOTHING
            "#,
        )
        .bind(row.chat_id)
        .bind(row.message_id)
        .bind(row.sender_id)
        .bind(&row.sender_username)
        .bind(&row.chat_username)
        .bind(&row.text)
        .bind(&intents)
        .bind(&domains)
        .bind(row.urgency_score)
        .bind(row.is_spam)
        .bind(&row.reasoning)
        .bind(&llm_analysis)
        .bind(&openrouter_response)
        .bind(row.message_date)
        .execute(&mut *tx)
        .await?;
        written += result.rows_affected();
    }
    tx.commit().await?;
    Ok(written)
}

/// Highest `message_id` persisted so far for `chat_id`, used by C6's
/// incremental backfill to stop at a watermark.
pub async fn watermark(pool: &PgPool, chat_id: i64) -> Result<Option<i64>> {
    let max_id: Option<i64> =
        sqlx::query_scalar("SELECT MAX(message_id) FROM messages WHERE chat_id = $1")
            .bind(chat_id)
            .fetch_one(pool)
            .await?;
    Ok(max_id)
}

/// Whether `chat_id` has any row older than `cutoff` — the "new chat" test
/// the bootstrap job (C13) uses to decide which chats still need an initial
/// backfill.
pub async fn has_history_before(
    pool: &PgPool,
    chat_id: i64,
    cutoff: chrono::DateTime<chrono::Utc>,
) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM messages WHERE chat_id = $1 AND message_date < $2)",
    )
    .bind(chat_id)
    .bind(cutoff)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}
