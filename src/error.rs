use thiserror::Error;

#[derive(Error, Debug)]
pub enum LifelogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("document store error: {0}")]
    Store(#[from] docstore::StoreError),

    #[error("file store error: {0}")]
    Files(#[from] filestore::FileStoreError),

    #[error("API server error: {0}")]
    Api(#[from] api::ApiError),

    #[error("background task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, LifelogError>;
