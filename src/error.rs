use thiserror::Error;

/// Errors from the outer surfaces: stats storage, export and config files
#[derive(Debug, Error)]
pub enum AppError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("stats database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("csv export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("bad timestamp in stats database: {0}")]
    Timestamp(#[from] chrono::ParseError),
}
