//! Runtime configuration loaded from environment variables.

use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// Path to the SQLite database file.
    pub db_path: String,
    /// Path to the schema applied at startup.
    pub schema_path: String,
    /// Server worker threads (one SQLite connection each).
    pub max_workers: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Ok(Config {
            bind_addr: env_or("DORMHUB_ADDR", "127.0.0.1:3000")
                .parse()
                .map_err(|_| "invalid DORMHUB_ADDR".to_string())?,
            db_path: env_or("DORMHUB_DB", "dormhub.sqlite3"),
            schema_path: env_or("DORMHUB_SCHEMA", "sql/schema.sql"),
            max_workers: env_or("DORMHUB_WORKERS", "8")
                .parse()
                .map_err(|_| "invalid DORMHUB_WORKERS".to_string())?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
