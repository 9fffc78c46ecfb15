use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
///
/// Redis URL is optional; without it the catalog runs in-memory only.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address, e.g. "127.0.0.1:8080".
    pub bind_addr: String,
    /// Redis connection URL. `None` disables persistence.
    pub redis_url: Option<String>,
    /// Path to a guide seed file (canonical array or legacy export).
    pub seed_path: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `BIND_ADDR`: listen address (default "127.0.0.1:8080")
    /// - `REDIS_URL`: Redis connection string (omit to disable persistence)
    /// - `GUIDE_SEED_PATH`: guide seed file, validated to exist when set
    pub fn from_env() -> Result<Self, AppError> {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

        let seed_path = std::env::var("GUIDE_SEED_PATH").ok();
        if let Some(path) = &seed_path {
            if !std::path::Path::new(path).exists() {
                return Err(AppError::Config(format!(
                    "guide seed file not found at {path}"
                )));
            }
        }

        let redis_url = std::env::var("REDIS_URL").ok();

        Ok(Self {
            bind_addr,
            redis_url,
            seed_path,
        })
    }
}
