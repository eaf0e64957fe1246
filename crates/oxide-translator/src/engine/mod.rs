//! Dialect engines.
//!
//! Different databases spell literals differently. The translator never
//! formats a quoted literal itself; it asks the active [`Engine`] for
//! identifier quoting, text/binary/boolean/date literals, LIKE patterns and
//! the final LIMIT/OFFSET rewrite.
//!
//! Every method has an ANSI-flavoured default, so an engine only overrides
//! what its database does differently.

mod generic;
mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;

pub use generic::GenericEngine;
pub use mysql::MysqlEngine;
pub use postgres::PostgresEngine;
pub use sqlite::SqliteEngine;
pub use sqlserver::SqlServerEngine;

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime, SubsecRound};

use crate::error::EngineError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Where the wildcard goes in a LIKE pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeAnchor {
    /// `value%` (`%like~`).
    StartsWith,
    /// `%value` (`%~like`).
    EndsWith,
    /// `%value%` (`%~like~`).
    Contains,
}

impl LikeAnchor {
    /// Wraps an already-escaped pattern body with wildcards.
    #[must_use]
    pub fn wrap(self, escaped: &str) -> String {
        match self {
            Self::StartsWith => format!("{escaped}%"),
            Self::EndsWith => format!("%{escaped}"),
            Self::Contains => format!("%{escaped}%"),
        }
    }
}

/// Per-dialect escaping and formatting primitives.
pub trait Engine: Send + Sync {
    /// Returns the name of the engine.
    fn name(&self) -> &'static str;

    /// Returns the opening and closing identifier quote characters.
    fn identifier_quotes(&self) -> (char, char) {
        ('"', '"')
    }

    /// Quotes a single identifier part, doubling the closing quote.
    ///
    /// # Errors
    ///
    /// Engines bound to a connection may fail when it is gone.
    fn escape_identifier(&self, name: &str) -> EngineResult<String> {
        let (open, close) = self.identifier_quotes();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(open);
        for c in name.chars() {
            if c == close {
                out.push(close);
            }
            out.push(c);
        }
        out.push(close);
        Ok(out)
    }

    /// Formats a text literal.
    ///
    /// # Errors
    ///
    /// Engines bound to a connection may fail when it is gone.
    fn escape_text(&self, value: &str) -> EngineResult<String> {
        let escaped = value.replace('\'', "''");
        Ok(format!("'{escaped}'"))
    }

    /// Formats a binary literal.
    ///
    /// # Errors
    ///
    /// Engines bound to a connection may fail when it is gone.
    fn escape_binary(&self, value: &[u8]) -> EngineResult<String> {
        Ok(format!("X'{}'", hex(value)))
    }

    /// Formats a boolean literal.
    fn escape_bool(&self, value: bool) -> String {
        if value {
            String::from("TRUE")
        } else {
            String::from("FALSE")
        }
    }

    /// Formats a date literal.
    ///
    /// # Errors
    ///
    /// Engines bound to a connection may fail when it is gone.
    fn escape_date(&self, value: NaiveDate) -> EngineResult<String> {
        Ok(format!("DATE '{}'", value.format("%Y-%m-%d")))
    }

    /// Formats a datetime literal.
    ///
    /// # Errors
    ///
    /// Engines bound to a connection may fail when it is gone.
    fn escape_datetime(&self, value: NaiveDateTime) -> EngineResult<String> {
        Ok(format!("TIMESTAMP '{}'", iso_datetime(value)))
    }

    /// Formats a LIKE pattern that matches `value` literally at the
    /// position given by `anchor`.
    ///
    /// # Errors
    ///
    /// Engines bound to a connection may fail when it is gone.
    fn escape_like(&self, value: &str, anchor: LikeAnchor) -> EngineResult<String> {
        let pattern = anchor.wrap(&escape_like_chars(value, '\\'));
        Ok(format!("{} ESCAPE '\\'", self.escape_text(&pattern)?))
    }

    /// Rewrites a finished statement to apply a row limit and offset.
    ///
    /// # Errors
    ///
    /// Returns an error when the dialect cannot express the combination.
    fn apply_limit_offset(
        &self,
        sql: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<String> {
        let mut out = String::from(sql);
        if let Some(offset) = offset {
            let _ = write!(out, " OFFSET {offset} ROWS");
        }
        if let Some(limit) = limit {
            let _ = write!(out, " FETCH FIRST {limit} ROWS ONLY");
        }
        Ok(out)
    }
}

/// Formats a datetime as ISO text with a space separator. Fractional
/// seconds are only printed when non-zero, truncated to microseconds,
/// the finest precision every built-in dialect accepts.
#[must_use]
pub fn iso_datetime(value: NaiveDateTime) -> String {
    value
        .trunc_subsecs(6)
        .format("%Y-%m-%d %H:%M:%S%.f")
        .to_string()
}

/// Upper-case hexadecimal rendering of a byte slice.
#[must_use]
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02X}")).collect()
}

/// Prefixes LIKE wildcards and the escape character itself with `escape`.
#[must_use]
pub fn escape_like_chars(value: &str, escape: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == '%' || c == '_' || c == escape {
            out.push(escape);
        }
        out.push(c);
    }
    out
}

impl<E: Engine + ?Sized> Engine for Box<E> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn identifier_quotes(&self) -> (char, char) {
        (**self).identifier_quotes()
    }

    fn escape_identifier(&self, name: &str) -> EngineResult<String> {
        (**self).escape_identifier(name)
    }

    fn escape_text(&self, value: &str) -> EngineResult<String> {
        (**self).escape_text(value)
    }

    fn escape_binary(&self, value: &[u8]) -> EngineResult<String> {
        (**self).escape_binary(value)
    }

    fn escape_bool(&self, value: bool) -> String {
        (**self).escape_bool(value)
    }

    fn escape_date(&self, value: NaiveDate) -> EngineResult<String> {
        (**self).escape_date(value)
    }

    fn escape_datetime(&self, value: NaiveDateTime) -> EngineResult<String> {
        (**self).escape_datetime(value)
    }

    fn escape_like(&self, value: &str, anchor: LikeAnchor) -> EngineResult<String> {
        (**self).escape_like(value, anchor)
    }

    fn apply_limit_offset(
        &self,
        sql: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<String> {
        (**self).apply_limit_offset(sql, limit, offset)
    }
}
