//! `ingest-store` — Postgres-backed relational store: the `messages` table
//! (C10 persister, C3 weight computer) and the `assignments` table (C2),
//! notified via `LISTEN`/`NOTIFY` on `assignment_updated`.

pub mod assignments;
pub mod error;
pub mod persister;
pub mod weights;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use error::{Result, StoreError};

/// Connects and runs embedded migrations (`migrations/`), matching the
/// teacher's connect-then-migrate-on-boot sequencing.
pub async fn connect(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}
