//! Engine configuration from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_DATABASE_URL: &str = "sqlite:whatif.db?mode=rwc";
const DEV_JWT_SECRET: &str = "whatif-dev-secret-change-me";

/// Runtime configuration for the engine.
///
/// Every field has a default so a bare `whatif-engine` starts against a local
/// SQLite file.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub server_host: String,
    pub server_port: u16,
    pub database: DatabaseConfig,
    pub jwt_secret: String,
    pub jwt_ttl: Duration,
    /// `None` disables CORS; `"*"` allows any origin; otherwise comma-separated.
    pub cors_allowed_origins: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 20,
            connect_timeout: Duration::from_millis(2000),
            idle_timeout: Duration::from_millis(30_000),
        }
    }
}

impl EngineConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// missing or unparseable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let parsed = |key: &str, default: u64| -> u64 {
            match var(key) {
                Some(raw) => raw.parse().unwrap_or_else(|_| {
                    tracing::warn!(key, value = %raw, default, "Ignoring unparseable setting");
                    default
                }),
                None => default,
            }
        };

        let defaults = DatabaseConfig::default();
        let database = DatabaseConfig {
            url: var("DATABASE_URL").unwrap_or(defaults.url),
            max_connections: u32::try_from(parsed("DB_MAX_CONNECTIONS", 20)).unwrap_or(20),
            connect_timeout: Duration::from_millis(parsed("DB_CONNECT_TIMEOUT_MS", 2000)),
            idle_timeout: Duration::from_millis(parsed("DB_IDLE_TIMEOUT_MS", 30_000)),
        };

        let server_port = var("SERVER_PORT")
            .or_else(|| var("PORT"))
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        Self {
            server_host: var("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port,
            database,
            jwt_secret,
            jwt_ttl: Duration::from_secs(parsed("JWT_TTL_HOURS", 24) * 3600),
            cors_allowed_origins: var("CORS_ALLOWED_ORIGINS"),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.server_host, self.server_port).parse()?)
    }
}

/// Load `.env.local` then `.env` from the working directory or the repo root.
/// Values already in the environment win.
pub fn load_dotenv() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    for dir in [std::path::PathBuf::from("."), repo_root] {
        for filename in [".env.local", ".env"] {
            let path = dir.join(filename);
            if path.exists() {
                let _ = dotenvy::from_path(path);
            }
        }
    }
}
