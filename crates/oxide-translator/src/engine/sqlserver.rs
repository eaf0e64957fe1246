//! SQL Server engine.

use std::fmt::Write as _;

use chrono::{NaiveDate, NaiveDateTime};

use super::{Engine, EngineResult, LikeAnchor, hex, iso_datetime};

/// Microsoft SQL Server engine.
///
/// Text literals are emitted as `N'...'` so they keep their Unicode
/// contents; dates are converted explicitly because implicit conversion
/// depends on the session's `DATEFORMAT`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SqlServerEngine;

impl SqlServerEngine {
    /// Creates a new SQL Server engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Engine for SqlServerEngine {
    fn name(&self) -> &'static str {
        "sqlserver"
    }

    fn identifier_quotes(&self) -> (char, char) {
        ('[', ']')
    }

    fn escape_text(&self, value: &str) -> EngineResult<String> {
        let escaped = value.replace('\'', "''");
        Ok(format!("N'{escaped}'"))
    }

    fn escape_binary(&self, value: &[u8]) -> EngineResult<String> {
        Ok(format!("0x{}", hex(value)))
    }

    fn escape_bool(&self, value: bool) -> String {
        String::from(if value { "1" } else { "0" })
    }

    fn escape_date(&self, value: NaiveDate) -> EngineResult<String> {
        Ok(format!("CAST('{}' AS DATE)", value.format("%Y-%m-%d")))
    }

    fn escape_datetime(&self, value: NaiveDateTime) -> EngineResult<String> {
        Ok(format!("CAST('{}' AS DATETIME2)", iso_datetime(value)))
    }

    fn escape_like(&self, value: &str, anchor: LikeAnchor) -> EngineResult<String> {
        let mut escaped = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '%' | '_' | '[' => {
                    escaped.push('[');
                    escaped.push(c);
                    escaped.push(']');
                }
                _ => escaped.push(c),
            }
        }
        self.escape_text(&anchor.wrap(&escaped))
    }

    fn apply_limit_offset(
        &self,
        sql: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> EngineResult<String> {
        match (limit, offset) {
            (None, None) => Ok(String::from(sql)),
            (Some(limit), None) => Ok(format!("SELECT TOP ({limit}) * FROM ({sql}) t")),
            (limit, Some(offset)) => {
                // OFFSET/FETCH requires an ORDER BY in the statement
                let mut out = format!("{sql} OFFSET {offset} ROWS");
                if let Some(limit) = limit {
                    let _ = write!(out, " FETCH NEXT {limit} ROWS ONLY");
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sqlserver_engine() {
        let engine = SqlServerEngine::new();
        assert_eq!(engine.name(), "sqlserver");
        assert_eq!(engine.escape_identifier("my col").unwrap(), "[my col]");
        assert_eq!(engine.escape_identifier("a]b").unwrap(), "[a]]b]");
        assert_eq!(engine.escape_text("it's").unwrap(), "N'it''s'");
        assert_eq!(engine.escape_binary(&[1, 255]).unwrap(), "0x01FF");
    }

    #[test]
    fn test_sqlserver_dates_are_cast() {
        let engine = SqlServerEngine::new();
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(
            engine.escape_date(date).unwrap(),
            "CAST('2023-12-31' AS DATE)"
        );
        assert_eq!(
            engine
                .escape_datetime(date.and_hms_opt(8, 0, 0).unwrap())
                .unwrap(),
            "CAST('2023-12-31 08:00:00' AS DATETIME2)"
        );
    }

    #[test]
    fn test_sqlserver_like_uses_character_classes() {
        let engine = SqlServerEngine::new();
        assert_eq!(
            engine.escape_like("a_[b]", LikeAnchor::Contains).unwrap(),
            "N'%a[_][[]b]%'"
        );
    }

    #[test]
    fn test_sqlserver_limit_offset() {
        let engine = SqlServerEngine::new();
        assert_eq!(
            engine.apply_limit_offset("SELECT a FROM t", Some(5), None).unwrap(),
            "SELECT TOP (5) * FROM (SELECT a FROM t) t"
        );
        assert_eq!(
            engine
                .apply_limit_offset("SELECT a FROM t ORDER BY a", Some(5), Some(10))
                .unwrap(),
            "SELECT a FROM t ORDER BY a OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }
}
