// Domain-level errors for store operations.

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("record not found")]
    NotFound,

    #[error("failed to persist document store: {0}")]
    Persist(#[source] std::io::Error),
}
