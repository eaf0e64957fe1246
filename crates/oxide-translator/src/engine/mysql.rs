//! MySQL engine.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime};

use super::{Engine, EngineResult, LikeAnchor, escape_like_chars, iso_datetime};

/// MySQL engine.
///
/// Text literals follow the default `sql_mode`, in which backslash is an
/// escape character inside strings.
#[derive(Debug, Default, Clone, Copy)]
pub struct MysqlEngine;

impl MysqlEngine {
    /// Creates a new MySQL engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Engine for MysqlEngine {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('`', '`')
    }

    fn escape_text(&self, value: &str) -> EngineResult<String> {
        let mut out = String::with_capacity(value.len() + 2);
        out.push('\'');
        for c in value.chars() {
            match c {
                '\0' => out.push_str("\\0"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\x1a' => out.push_str("\\Z"),
                '\\' | '\'' | '"' => {
                    out.push('\\');
                    out.push(c);
                }
                _ => out.push(c),
            }
        }
        out.push('\'');
        Ok(out)
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

    fn escape_like(&self, value: &str, anchor: LikeAnchor) -> EngineResult<String> {
        // the pattern escapes pass through text escaping a second time
        self.escape_text(&anchor.wrap(&escape_like_chars(value, '\\')))
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
            (None, Some(_)) => {
                let _ = write!(out, " LIMIT {}", u64::MAX);
            }
        }
        if let Some(offset) = offset {
            let _ = write!(out, " OFFSET {offset}");
        }
        Ok(out)
    }
}
