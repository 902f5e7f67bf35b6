use sqlx::PgPool;
use std::collections::HashMap;
use tracing::instrument;

use crate::error::Result;

/// Weight computer (C3): `w = alpha * r15 + (1 - alpha) * r24`, floored at
/// `min_weight`. `r15` excludes rows whose `(indexed_at - message_date)`
/// exceeds 5 minutes, so bulk-backfilled history never skews the recency
/// signal.
#[instrument(skip(pool))]
pub async fn compute_weights(pool: &PgPool, alpha: f64, min_weight: f64) -> Result<HashMap<i64, f64>> {
    let rows: Vec<(i64, f64, f64)> = sqlx::query_as(
        r#"
        SELECT
          chat_id,
          COUNT(*) FILTER (
            WHERE message_date >= now() - interval '15 minutes'
              AND (indexed_at - message_date) <= interval '5 minutes'
          )::float8 / 15.0 AS r15,
          COUNT(*) FILTER (
            WHERE message_date >= now() - interval '24 hours'
          )::float8 / 1440.0 AS r24
        FROM messages
        GROUP BY chat_id
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut weights = HashMap::with_capacity(rows.len());
    for (chat_id, r15, r24) in rows {
        let w = alpha * r15 + (1.0 - alpha) * r24;
        weights.insert(chat_id, w.max(min_weight));
    }
    Ok(weights)
}

/// Weight for a chat with no row in the aggregate, per the boundary test:
/// "a chat with zero recent activity has exactly `w = min_weight`".
pub fn weight_or_floor(weights: &HashMap<i64, f64>, chat_id: i64, min_weight: f64) -> f64 {
    weights.get(&chat_id).copied().unwrap_or(min_weight)
}
