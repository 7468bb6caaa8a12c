use std::env;
use std::time::Duration;

use sea_orm::ConnectOptions;

use crate::error::AppError;

const MEMORY_CONN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Database engines the backend can run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKind {
    Postgres,
    SqliteFile,
    SqliteMemory,
}

impl DbKind {
    /// Infer the engine from a connection URL.
    pub fn from_url(url: &str) -> Result<Self, AppError> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(DbKind::Postgres)
        } else if url.starts_with("sqlite::memory:") || url.contains("mode=memory") {
            Ok(DbKind::SqliteMemory)
        } else if url.starts_with("sqlite:") {
            Ok(DbKind::SqliteFile)
        } else {
            Err(AppError::config(format!(
                "Unsupported DATABASE_URL scheme: '{}'",
                sanitize_db_url(url)
            )))
        }
    }

    pub fn engine(self) -> &'static str {
        match self {
            DbKind::Postgres => "postgresql",
            DbKind::SqliteFile | DbKind::SqliteMemory => "sqlite",
        }
    }
}

/// Connection settings for the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbSettings {
    pub url: String,
    pub kind: DbKind,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl DbSettings {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Result<Self, AppError> {
        let url = url.into();
        let kind = DbKind::from_url(&url)?;
        Ok(Self {
            url,
            kind,
            max_connections,
            acquire_timeout: Duration::from_secs(5),
        })
    }

    /// In-memory SQLite; a single pooled connection keeps the schema alive.
    pub fn sqlite_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
            kind: DbKind::SqliteMemory,
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        let url = env::var("DATABASE_URL").map_err(|_| {
            AppError::config("Required environment variable 'DATABASE_URL' is not set")
        })?;
        let max_raw = env::var("DB_MAX_CONNECTIONS").unwrap_or_else(|_| "10".to_string());
        let max_connections = max_raw.parse::<u32>().map_err(|_| {
            AppError::config(format!(
                "DB_MAX_CONNECTIONS must be a positive integer, got '{max_raw}'"
            ))
        })?;
        Self::new(url, max_connections.max(1))
    }

    pub fn connect_options(&self) -> ConnectOptions {
        let mut opts = ConnectOptions::new(self.url.clone());
        let max = match self.kind {
            DbKind::SqliteMemory => 1,
            _ => self.max_connections,
        };
        opts.max_connections(max)
            .min_connections(1)
            .acquire_timeout(self.acquire_timeout)
            .sqlx_logging(false);
        if self.kind == DbKind::SqliteMemory {
            // Recycling the only connection would drop the database with it.
            opts.idle_timeout(MEMORY_CONN_LIFETIME)
                .max_lifetime(MEMORY_CONN_LIFETIME);
        }
        opts
    }
}

/// Strip credentials from a database URL before logging it.
pub fn sanitize_db_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_kind_from_url() {
        assert_eq!(
            DbKind::from_url("postgresql://u:p@localhost:5432/quiz").unwrap(),
            DbKind::Postgres
        );
        assert_eq!(
            DbKind::from_url("sqlite::memory:").unwrap(),
            DbKind::SqliteMemory
        );
        assert_eq!(
            DbKind::from_url("sqlite://quiz.db?mode=rwc").unwrap(),
            DbKind::SqliteFile
        );
        assert!(DbKind::from_url("mysql://localhost/quiz").is_err());
    }

    #[test]
    fn sanitize_hides_credentials() {
        assert_eq!(
            sanitize_db_url("postgresql://user:secret@db:5432/quiz"),
            "postgresql://***@db:5432/quiz"
        );
        assert_eq!(sanitize_db_url("sqlite::memory:"), "sqlite::memory:");
    }

    #[test]
    fn memory_settings_use_one_connection() {
        let settings = DbSettings::sqlite_memory();
        assert_eq!(settings.max_connections, 1);
        assert_eq!(settings.kind, DbKind::SqliteMemory);
    }
}
