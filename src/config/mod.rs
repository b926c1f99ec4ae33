//! Configuration module for the seal tracker.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::format::{Item, StrftimeItems};

use crate::errors::AppError;

/// Which seal store backs the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Embedded SQLite file
    Sqlite { db_path: PathBuf },
    /// Hosted PostgREST-compatible data service
    Rest {
        base_url: String,
        api_key: String,
        table: String,
    },
    /// In-process store, lost on restart
    Memory,
}

impl StoreBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite { .. } => "sqlite",
            StoreBackend::Rest { .. } => "rest",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Seal store backend
    pub store: StoreBackend,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// strftime pattern for the CSV date column
    pub csv_date_format: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let store = match env::var("SEAL_STORE")
            .unwrap_or_else(|_| "sqlite".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "sqlite" => StoreBackend::Sqlite {
                db_path: env::var("SEAL_DB_PATH")
                    .unwrap_or_else(|_| "./data/seals.sqlite".to_string())
                    .into(),
            },
            "rest" => StoreBackend::Rest {
                base_url: required("SEAL_REST_URL")?
                    .trim_end_matches('/')
                    .to_string(),
                api_key: required("SEAL_REST_KEY")?,
                table: env::var("SEAL_REST_TABLE").unwrap_or_else(|_| "seals".to_string()),
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(AppError::Config(format!(
                    "Unknown SEAL_STORE '{}' (expected sqlite, rest or memory)",
                    other
                )))
            }
        };

        let bind_addr = env::var("SEAL_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid SEAL_BIND_ADDR format: {}", e)))?;

        let log_level = env::var("SEAL_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let csv_date_format =
            env::var("SEAL_CSV_DATE_FORMAT").unwrap_or_else(|_| "%Y-%m-%d".to_string());
        // Formatting with a bad pattern panics, so reject it up front
        if StrftimeItems::new(&csv_date_format).any(|item| matches!(item, Item::Error)) {
            return Err(AppError::Config(format!(
                "Invalid SEAL_CSV_DATE_FORMAT '{}'",
                csv_date_format
            )));
        }

        Ok(Self {
            store,
            bind_addr,
            log_level,
            csv_date_format,
        })
    }
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("{} is required for the rest store", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 8] = [
        "SEAL_STORE",
        "SEAL_DB_PATH",
        "SEAL_REST_URL",
        "SEAL_REST_KEY",
        "SEAL_REST_TABLE",
        "SEAL_BIND_ADDR",
        "SEAL_LOG_LEVEL",
        "SEAL_CSV_DATE_FORMAT",
    ];

    // Env vars are process-global, so all cases run in one test.
    #[test]
    fn test_config_from_env() {
        for var in VARS {
            env::remove_var(var);
        }

        let config = Config::from_env().unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Sqlite {
                db_path: PathBuf::from("./data/seals.sqlite")
            }
        );
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.csv_date_format, "%Y-%m-%d");

        env::set_var("SEAL_STORE", "rest");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        env::set_var("SEAL_REST_URL", "https://example.supabase.co/");
        env::set_var("SEAL_REST_KEY", "anon-key");
        let config = Config::from_env().unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Rest {
                base_url: "https://example.supabase.co".to_string(),
                api_key: "anon-key".to_string(),
                table: "seals".to_string(),
            }
        );

        env::set_var("SEAL_STORE", "floppy");
        assert!(Config::from_env().is_err());

        env::set_var("SEAL_STORE", "memory");
        env::set_var("SEAL_CSV_DATE_FORMAT", "%d/%m/%Y");
        assert_eq!(Config::from_env().unwrap().csv_date_format, "%d/%m/%Y");

        env::set_var("SEAL_CSV_DATE_FORMAT", "%Q");
        assert!(Config::from_env().is_err());
        env::remove_var("SEAL_CSV_DATE_FORMAT");

        env::set_var("SEAL_BIND_ADDR", "not-an-addr");
        assert!(Config::from_env().is_err());

        for var in VARS {
            env::remove_var(var);
        }
    }
}
