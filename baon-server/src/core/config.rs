/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | BAON_DATA_DIR | /var/lib/baon | Data directory (redb database) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | SWEEP_INTERVAL_SECS | 60 | Payment timeout sweep interval |
/// | CATALOG_PATH | (unset) | Optional JSON catalog snapshot to load |
/// | ENVIRONMENT | development | development \| staging \| production |
///
/// # Example
///
/// ```ignore
/// BAON_DATA_DIR=/data/baon HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Data directory holding the redb database file
    pub data_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Seconds between payment timeout sweeps
    pub sweep_interval_secs: u64,
    /// Optional path to a JSON catalog snapshot loaded at startup
    pub catalog_path: Option<String>,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        Self {
            data_dir: std::env::var("BAON_DATA_DIR").unwrap_or_else(|_| "/var/lib/baon".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            sweep_interval_secs: std::env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            catalog_path: std::env::var("CATALOG_PATH").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Override the data directory and port, commonly for tests.
    pub fn with_overrides(data_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.data_dir = data_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Path of the redb database file inside the data directory
    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join("baon.redb")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
