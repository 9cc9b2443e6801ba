use std::env;
use std::path::PathBuf;

/// API server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    pub cors_origin: String,
    pub database_url: Option<String>,

    /// Directory attachments are written to
    pub storage_root: PathBuf,

    /// URL prefix under which `storage_root` is served
    pub public_url: String,

    /// Optional TOML file with workflow settings
    pub config_file: Option<PathBuf>,

    /// Optional JSON seed for the in-memory store
    pub seed_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            cors_origin: "http://localhost:3000".to_string(),
            database_url: None,
            storage_root: PathBuf::from("storage"),
            public_url: "http://localhost:3001/storage".to_string(),
            config_file: None,
            seed_file: None,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("DRAINWATCH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(defaults.port);

        let cors_origin = env::var("DRAINWATCH_CORS_ORIGIN").unwrap_or(defaults.cors_origin);

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.trim().is_empty());

        let storage_root = env::var("DRAINWATCH_STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_root);

        let public_url = env::var("DRAINWATCH_PUBLIC_URL").unwrap_or(defaults.public_url);

        Self {
            port,
            cors_origin,
            database_url,
            storage_root,
            public_url,
            config_file: env::var("DRAINWATCH_CONFIG").ok().map(PathBuf::from),
            seed_file: env::var("DRAINWATCH_SEED").ok().map(PathBuf::from),
        }
    }

    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// Check if PostgreSQL storage is configured
    pub fn uses_postgres(&self) -> bool {
        self.database_url.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:3001");
        assert!(!config.uses_postgres());
    }
}
