//! Translator configuration.
//!
//! Configuration is plain data and can be deserialized from any serde
//! format:
//!
//! ```json
//! {
//!     "engine": "postgres",
//!     "substitutions": { "p": "app_" },
//!     "placeholders": true
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{
    Engine, GenericEngine, MysqlEngine, PostgresEngine, SqlServerEngine, SqliteEngine,
};

/// Built-in engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// ANSI SQL.
    #[default]
    Generic,
    /// SQLite.
    Sqlite,
    /// PostgreSQL.
    #[serde(alias = "postgresql", alias = "pgsql")]
    Postgres,
    /// MySQL / MariaDB.
    #[serde(alias = "mariadb")]
    Mysql,
    /// Microsoft SQL Server.
    #[serde(alias = "mssql")]
    Sqlserver,
}

impl EngineKind {
    /// All built-in engines.
    pub const ALL: [Self; 5] = [
        Self::Generic,
        Self::Sqlite,
        Self::Postgres,
        Self::Mysql,
        Self::Sqlserver,
    ];

    /// Returns the configuration name of the engine.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Sqlserver => "sqlserver",
        }
    }

    /// Creates the engine.
    #[must_use]
    pub fn engine(self) -> Box<dyn Engine> {
        match self {
            Self::Generic => Box::new(GenericEngine::new()),
            Self::Sqlite => Box::new(SqliteEngine::new()),
            Self::Postgres => Box::new(PostgresEngine::new()),
            Self::Mysql => Box::new(MysqlEngine::new()),
            Self::Sqlserver => Box::new(SqlServerEngine::new()),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error for an engine name that is not built in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown engine '{0}', expected one of: generic, sqlite, postgres, mysql, sqlserver")]
pub struct UnknownEngine(pub String);

impl FromStr for EngineKind {
    type Err = UnknownEngine;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(Self::Generic),
            "sqlite" | "sqlite3" => Ok(Self::Sqlite),
            "postgres" | "postgresql" | "pgsql" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::Mysql),
            "sqlserver" | "mssql" => Ok(Self::Sqlserver),
            _ => Err(UnknownEngine(String::from(s))),
        }
    }
}

/// Settings used by [`Translator::from_config`](crate::Translator::from_config).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TranslatorConfig {
    /// Engine used for escaping.
    pub engine: EngineKind,
    /// Initial substitution table.
    pub substitutions: BTreeMap<String, String>,
    /// Whether `?` in literal fragments is a placeholder.
    pub placeholders: bool,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            engine: EngineKind::default(),
            substitutions: BTreeMap::new(),
            placeholders: true,
        }
    }
}
