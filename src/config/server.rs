use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Argon2id cost parameters for account credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashCost {
    /// The cheapest parameters argon2 accepts. Only for tests.
    #[must_use]
    pub const fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Lifetime of owner-plane bearer tokens.
    pub session_ttl_hours: i64,
    pub password_cost: HashCost,
}

impl ServerConfig {
    /// Reads a TOML config file. Missing keys fall back to defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("invalid listen address: {e}")))
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("varvault.db")
    }

    #[must_use]
    pub fn secret_path(&self) -> PathBuf {
        self.data_dir.join(".signing_secret")
    }

    pub fn session_ttl(&self) -> Result<chrono::Duration> {
        chrono::Duration::try_hours(self.session_ttl_hours).ok_or_else(|| {
            Error::Config(format!(
                "session_ttl_hours {} is out of range",
                self.session_ttl_hours
            ))
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            session_ttl_hours: 24 * 30,
            password_cost: HashCost::default(),
        }
    }
}
