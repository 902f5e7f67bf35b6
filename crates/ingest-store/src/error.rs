use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Database(_) => "STORE_DATABASE_ERROR",
            StoreError::Migration(_) => "STORE_MIGRATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
