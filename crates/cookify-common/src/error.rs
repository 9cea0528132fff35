/// Error types shared across Cookify crates.
///
/// These errors represent failures in infrastructure the application can run
/// without (the Redis-backed cloud store). Application-specific errors are
/// defined in the app crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis unavailable, degrading gracefully")]
    RedisUnavailable,

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
