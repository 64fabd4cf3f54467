use pravo_gigachat::GigaChatError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("provider error: {0}")]
    Provider(#[from] GigaChatError),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("dangling reference: remote file {0} no longer exists")]
    DanglingReference(String),

    #[error("{persist}; compensating remote delete also failed: {cleanup}")]
    CompensationFailed {
        persist: Box<StoreError>,
        cleanup: GigaChatError,
    },

    #[error("invalid stored timestamp: {0}")]
    InvalidTimestamp(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
