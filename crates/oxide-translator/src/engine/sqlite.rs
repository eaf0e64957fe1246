//! SQLite engine.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime};

use super::{Engine, EngineResult, iso_datetime};

/// SQLite engine.
///
/// SQLite has no boolean or date types: booleans are stored as `1`/`0` and
/// dates as ISO text.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteEngine;

impl SqliteEngine {
    /// Creates a new SQLite engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Engine for SqliteEngine {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn escape_bool(&self, value: bool) -> String {
        String::from(if value { "1" } else { "0" })
    }

    fn escape_date(&self, value: NaiveDate) -> EngineResult<String> {
        Ok(format!("'{}'", value.format("%Y-%m-%d")))
    }

    fn escape_datetime(&self, value: NaiveDateTime) -> EngineResult<String> {
        Ok(format!("'{}'", iso_datetime(value)))
    }

    fn apply_limit_offset(
        &self,
        sql: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<String> {
        let mut out = String::from(sql);
        match (limit, offset) {
            (None, None) => {}
            (Some(limit), _) => {
                let _ = write!(out, " LIMIT {limit}");
            }
            // OFFSET is only valid after a LIMIT
            (None, Some(_)) => out.push_str(" LIMIT -1"),
        }
        if let Some(offset) = offset {
            let _ = write!(out, " OFFSET {offset}");
        }
        Ok(out)
    }
}
