//! Shared configuration used by the core, the producers and the gateway.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Origins the bundled web client is served from during development.
pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:3001",
];

/// Global application configuration (gateway + producer wiring). Load from TOML or env.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Application identity shown by the status endpoint.
    pub app_name: String,
    /// Interface the gateway binds to.
    pub host: String,
    /// HTTP port for the gateway.
    pub port: u16,
    /// Base directory for the Sled history DB.
    pub storage_path: String,
    /// When true, notebooks are written through to Sled and survive restarts.
    #[serde(default)]
    pub persist_history: bool,
    /// Answer producer mode ("simulated" or "http").
    pub producer_mode: String,
    /// Base URL of the external answer producer (used in "http" mode).
    pub producer_base_url: String,
    /// Upper bound on a single producer call.
    pub producer_timeout_secs: u64,
    /// Browser origins allowed by the CORS layer.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_cors_origins() -> Vec<String> {
    DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            app_name: "Research Notebook".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            storage_path: "./data".to_string(),
            persist_history: false,
            producer_mode: "simulated".to_string(),
            producer_base_url: "http://127.0.0.1:8100".to_string(),
            producer_timeout_secs: 5,
            cors_origins: default_cors_origins(),
        }
    }
}

impl CoreConfig {
    /// Load config from file and environment. Precedence: env `NOTEBOOK_CONFIG` path > `config/gateway.toml` > defaults.
    /// Environment overrides use the `NOTEBOOK__` prefix, e.g. `NOTEBOOK__PRODUCER_BASE_URL`.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("NOTEBOOK_CONFIG").unwrap_or_else(|_| "config/gateway.toml".to_string());
        let defaults = Self::default();
        let builder = config::Config::builder()
            .set_default("app_name", defaults.app_name)?
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("storage_path", defaults.storage_path)?
            .set_default("persist_history", defaults.persist_history)?
            .set_default("producer_mode", defaults.producer_mode)?
            .set_default("producer_base_url", defaults.producer_base_url)?
            .set_default("producer_timeout_secs", defaults.producer_timeout_secs as i64)?
            .set_default("cors_origins", defaults.cors_origins)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(
                config::Environment::with_prefix("NOTEBOOK")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        built.try_deserialize()
    }

    /// Directory of the Sled history DB.
    pub fn history_path(&self) -> PathBuf {
        Path::new(&self.storage_path).join("notebook_history")
    }

    /// Producer timeout as a [`Duration`]; zero is bumped to one second.
    pub fn producer_timeout(&self) -> Duration {
        Duration::from_secs(self.producer_timeout_secs.max(1))
    }
}
