use anyhow::{Context, Result, anyhow};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Which record store implementation serves the payroll tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    MySql,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mysql" => Ok(StoreBackend::MySql),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown STORE_BACKEND {other:?}, expected mysql or memory")),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub store_backend: StoreBackend,
    /// Required only for the MySQL backend.
    pub database_url: Option<String>,
    /// JSON array of employee profiles loaded into the memory backend.
    pub seed_profiles: Option<String>,
    pub jwt_secret: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,
    pub log_dir: String,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let store_backend: StoreBackend = parsed_or("STORE_BACKEND", StoreBackend::MySql)?;
        let database_url = match store_backend {
            StoreBackend::MySql => Some(required("DATABASE_URL")?),
            StoreBackend::Memory => env::var("DATABASE_URL").ok(),
        };

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            store_backend,
            database_url,
            seed_profiles: env::var("SEED_PROFILES").ok(),
            jwt_secret: required("JWT_SECRET")?,
            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            server_addr: "127.0.0.1:0".to_string(),
            store_backend: StoreBackend::Memory,
            database_url: None,
            seed_profiles: None,
            jwt_secret: "test-secret".to_string(),
            rate_protected_per_min: 10_000,
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
        }
    }
}
