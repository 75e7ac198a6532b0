//! Service settings read from the environment.
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::errors::ServerError;

/// Default maximum number of pooled database connections.
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default bind address.
const DEFAULT_SERVER_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Default bind port.
const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default header carrying the caller's user id, set by the auth gateway.
const DEFAULT_USER_ID_HEADER: &str = "x-user-id";

/// Default comma-separated list of allowed CORS origins.
const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Where votes, targets and users are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    /// Process-local storage, lost on restart.
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub storage_backend: StorageBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub run_migrations: bool,
    pub server_host: IpAddr,
    pub server_port: u16,
    pub user_id_header: String,
    pub vote_conflict_retries: u32,
    pub cors_allowed_origins: Vec<String>,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_backend: StorageBackend::Postgres,
            database_url: None,
            database_max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
            run_migrations: true,
            server_host: DEFAULT_SERVER_HOST,
            server_port: DEFAULT_SERVER_PORT,
            user_id_header: DEFAULT_USER_ID_HEADER.to_string(),
            vote_conflict_retries: forum_votes_engine::config::DEFAULT_CONFLICT_RETRIES,
            cors_allowed_origins: split_origins(DEFAULT_CORS_ALLOWED_ORIGINS),
            log_format: LogFormat::Pretty,
        }
    }
}

impl Settings {
    /// Reads settings from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `STORAGE_BACKEND`: "postgres" or "memory" (default: postgres)
    /// - `DATABASE_URL`: PostgreSQL connection string, required for postgres
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `RUN_MIGRATIONS`: Apply bundled migrations on start (default: true)
    /// - `SERVER_HOST`: Bind address (default: 127.0.0.1)
    /// - `SERVER_PORT`: Bind port (default: 8080)
    /// - `USER_ID_HEADER`: Trusted identity header (default: x-user-id)
    /// - `VOTE_CONFLICT_RETRIES`: Retries after a concurrent vote conflict (default: 1)
    /// - `CORS_ALLOWED_ORIGINS`: Comma-separated origins (default: http://localhost:3000)
    /// - `LOG_FORMAT`: "pretty" or "json" (default: pretty)
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let storage_backend = match value("STORAGE_BACKEND").map(|v| v.to_lowercase()).as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => return Err(ServerError::invalid("STORAGE_BACKEND", other)),
        };

        let database_url = value("DATABASE_URL");
        if storage_backend == StorageBackend::Postgres && database_url.is_none() {
            return Err(ServerError::MissingSetting("DATABASE_URL"));
        }

        let log_format = match value("LOG_FORMAT").map(|v| v.to_lowercase()).as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(ServerError::invalid("LOG_FORMAT", other)),
        };

        Ok(Self {
            storage_backend,
            database_url,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                value("DATABASE_MAX_CONNECTIONS"),
                defaults.database_max_connections,
            )?,
            run_migrations: parse_bool(
                "RUN_MIGRATIONS",
                value("RUN_MIGRATIONS"),
                defaults.run_migrations,
            )?,
            server_host: parse_or("SERVER_HOST", value("SERVER_HOST"), defaults.server_host)?,
            server_port: parse_or("SERVER_PORT", value("SERVER_PORT"), defaults.server_port)?,
            user_id_header: value("USER_ID_HEADER")
                .map(|v| v.to_lowercase())
                .unwrap_or(defaults.user_id_header),
            vote_conflict_retries: parse_or(
                "VOTE_CONFLICT_RETRIES",
                value("VOTE_CONFLICT_RETRIES"),
                defaults.vote_conflict_retries,
            )?,
            cors_allowed_origins: value("CORS_ALLOWED_ORIGINS")
                .map(|v| split_origins(&v))
                .unwrap_or(defaults.cors_allowed_origins),
            log_format,
        })
    }

    /// Settings for a process-local service, used by tests and local runs.
    pub fn in_memory() -> Self {
        Self { storage_backend: StorageBackend::Memory, ..Self::default() }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_host, self.server_port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ServerError> {
    match raw {
        Some(raw) => raw.parse().map_err(|_| ServerError::invalid(name, raw)),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, raw: Option<String>, default: bool) -> Result<bool, ServerError> {
    match raw.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(default),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(_) => Err(ServerError::invalid(name, raw.unwrap_or_default())),
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
