//! PostgreSQL engine.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime};

use super::{Engine, EngineResult, LikeAnchor, escape_like_chars, iso_datetime};

/// PostgreSQL engine.
///
/// Assumes `standard_conforming_strings = on` (the default since 9.1), so
/// backslashes in text literals are ordinary characters.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresEngine;

impl PostgresEngine {
    /// Creates a new PostgreSQL engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Engine for PostgresEngine {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn escape_binary(&self, value: &[u8]) -> EngineResult<String> {
        let mut out = String::from("'\\x");
        for byte in value {
            let _ = write!(out, "{byte:02x}");
        }
        out.push_str("'::bytea");
        Ok(out)
    }

    fn escape_date(&self, value: NaiveDate) -> EngineResult<String> {
        Ok(format!("'{}'", value.format("%Y-%m-%d")))
    }

    fn escape_datetime(&self, value: NaiveDateTime) -> EngineResult<String> {
        Ok(format!("'{}'", iso_datetime(value)))
    }

    fn escape_like(&self, value: &str, anchor: LikeAnchor) -> EngineResult<String> {
        // backslash is the default LIKE escape character
        self.escape_text(&anchor.wrap(&escape_like_chars(value, '\\')))
    }

    fn apply_limit_offset(
        &self,
        sql: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<String> {
        let mut out = String::from(sql);
        if let Some(limit) = limit {
            let _ = write!(out, " LIMIT {limit}");
        }
        if let Some(offset) = offset {
            let _ = write!(out, " OFFSET {offset}");
        }
        Ok(out)
    }
}
