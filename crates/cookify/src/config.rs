use crate::error::AppError;

/// Application configuration loaded explicitly from environment variables.
///
/// Redis is optional; without it the app serves recipes and local favorites
/// but has no accounts and no cloud sync.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the bundled recipe dataset (JSON array).
    pub recipes_path: String,
    /// Directory for the local durable stores (favorites, settings).
    pub data_dir: String,
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379"). `None` disables
    /// cloud sync and accounts.
    pub redis_url: Option<String>,
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Session lifetime in seconds.
    pub session_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `RECIPES_PATH`: path to the recipe dataset JSON file
    /// - `COOKIFY_DATA_DIR`: directory for local stores (created if missing)
    ///
    /// Optional:
    /// - `REDIS_URL`: Redis connection string (omit to run local-only)
    /// - `BIND_ADDR`: listen address (default "127.0.0.1:8080")
    /// - `SESSION_TTL_SECS`: session lifetime (default 86400)
    pub fn from_env() -> Result<Self, AppError> {
        let recipes_path = std::env::var("RECIPES_PATH").map_err(|_| {
            AppError::Config("RECIPES_PATH environment variable is required".to_string())
        })?;
        if !std::path::Path::new(&recipes_path).exists() {
            return Err(AppError::Config(format!(
                "recipe dataset not found at {recipes_path}"
            )));
        }

        let data_dir = std::env::var("COOKIFY_DATA_DIR").map_err(|_| {
            AppError::Config("COOKIFY_DATA_DIR environment variable is required".to_string())
        })?;
        std::fs::create_dir_all(&data_dir)
            .map_err(|e| AppError::Config(format!("cannot create data dir {data_dir}: {e}")))?;

        let redis_url = std::env::var("REDIS_URL").ok();
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
        let session_ttl_secs = std::env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(86_400);

        Ok(Self {
            recipes_path,
            data_dir,
            redis_url,
            bind_addr,
            session_ttl_secs,
        })
    }
}
