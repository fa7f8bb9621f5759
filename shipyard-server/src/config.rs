//! Server configuration loaded from the environment.

use std::fmt;
use std::str::FromStr;

/// Default CORS origins for the catalog UI.
const DEFAULT_UI_ORIGINS: &str = "http://127.0.0.1:4200,http://localhost:4200";

/// Backing store selected with `SHIPYARD_STORE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMode {
    /// PostgreSQL at the given connection string.
    Postgres(String),
    /// Process-local store, emptied on restart.
    Memory,
}

/// Invalid or missing configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Environment variable at fault.
    pub variable: &'static str,
    /// What is wrong with it.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.variable, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Listener, CORS, and store settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Origins allowed by CORS.
    pub allowed_origins: Vec<String>,
    /// Backing store.
    pub store: StoreMode,
}

impl ServerConfig {
    /// Read `SHIPYARD_HOST`, `SHIPYARD_PORT`, `SHIPYARD_UI_ORIGINS`, `SHIPYARD_STORE`,
    /// and `DATABASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = lookup("SHIPYARD_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = match lookup("SHIPYARD_PORT") {
            Some(raw) => u16::from_str(raw.trim()).map_err(|_| ConfigError {
                variable: "SHIPYARD_PORT",
                message: format!("{raw:?} is not a port number"),
            })?,
            None => 8080,
        };
        let allowed_origins = lookup("SHIPYARD_UI_ORIGINS")
            .unwrap_or_else(|| DEFAULT_UI_ORIGINS.to_string())
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect();
        let store = match lookup("SHIPYARD_STORE")
            .unwrap_or_else(|| "postgres".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "memory" => StoreMode::Memory,
            "postgres" => StoreMode::Postgres(lookup("DATABASE_URL").ok_or(ConfigError {
                variable: "DATABASE_URL",
                message: "must be set to a PostgreSQL connection string".to_string(),
            })?),
            other => {
                return Err(ConfigError {
                    variable: "SHIPYARD_STORE",
                    message: format!("unknown store {other:?}, expected postgres or memory"),
                });
            }
        };
        Ok(Self {
            host,
            port,
            allowed_origins,
            store,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard, OnceLock};

    fn env_lock() -> MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock")
    }

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_need_database_url() {
        let err = config(&[]).expect_err("missing url");
        assert_eq!(err.variable, "DATABASE_URL");

        let config = config(&[("DATABASE_URL", "postgres://localhost/ships")]).expect("config");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.allowed_origins,
            vec!["http://127.0.0.1:4200", "http://localhost:4200"]
        );
        assert_eq!(
            config.store,
            StoreMode::Postgres("postgres://localhost/ships".to_string())
        );
    }

    #[test]
    fn memory_store_and_overrides() {
        let config = config(&[
            ("SHIPYARD_STORE", "Memory"),
            ("SHIPYARD_HOST", "0.0.0.0"),
            ("SHIPYARD_PORT", "9000"),
            ("SHIPYARD_UI_ORIGINS", " https://a.example , ,https://b.example"),
        ])
        .expect("config");
        assert_eq!(config.store, StoreMode::Memory);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(
            config.allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = config(&[("SHIPYARD_STORE", "memory"), ("SHIPYARD_PORT", "http")])
            .expect_err("bad port");
        assert_eq!(err.variable, "SHIPYARD_PORT");

        let err = config(&[("SHIPYARD_STORE", "sqlite")]).expect_err("bad store");
        assert_eq!(err.variable, "SHIPYARD_STORE");
        assert!(err.to_string().starts_with("SHIPYARD_STORE: "));
    }

    #[test]
    fn from_env_reads_process_environment() {
        let _guard = env_lock();
        let previous: Vec<(&str, Option<String>)> = ["SHIPYARD_STORE", "SHIPYARD_PORT"]
            .into_iter()
            .map(|name| (name, std::env::var(name).ok()))
            .collect();
        unsafe {
            std::env::set_var("SHIPYARD_STORE", "memory");
            std::env::set_var("SHIPYARD_PORT", "8181");
        }

        let config = ServerConfig::from_env().expect("config");
        assert_eq!(config.store, StoreMode::Memory);
        assert_eq!(config.port, 8181);

        for (name, value) in previous {
            match value {
                Some(value) => unsafe {
                    std::env::set_var(name, value);
                },
                None => unsafe {
                    std::env::remove_var(name);
                },
            }
        }
    }
}
