/// Error types shared across catalog crates.
///
/// These errors represent failures in infrastructure components (currently
/// only Redis persistence) that application crates either surface at startup
/// or degrade around. Application-specific errors are defined per crate.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis unavailable, degrading gracefully")]
    RedisUnavailable,
}
