use thiserror::Error;

#[derive(Error, Debug)]
pub enum VorbaError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Proverb not found: {0}")]
    NotFound(uuid::Uuid),

    #[error("Other error: {0}")]
    Other(String),
}
