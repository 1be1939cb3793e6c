use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("country guide not found: {0}")]
    NotFound(String),

    #[error("guide directory not found: {0}")]
    DirNotFound(std::path::PathBuf),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid country guide {code}: {source}")]
    Json {
        code: String,
        #[source]
        source: serde_json::Error,
    },
}
