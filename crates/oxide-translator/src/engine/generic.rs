//! Generic SQL engine.

use super::Engine;

/// A generic engine using ANSI SQL literal syntax.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericEngine;

impl GenericEngine {
    /// Creates a new generic engine.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Engine for GenericEngine {
    fn name(&self) -> &'static str {
        "generic"
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::engine::LikeAnchor;

    #[test]
    fn test_generic_engine() {
        let engine = GenericEngine::new();
        assert_eq!(engine.name(), "generic");
        assert_eq!(engine.escape_identifier("name").unwrap(), "\"name\"");
        assert_eq!(engine.escape_identifier("a\"b").unwrap(), "\"a\"\"b\"");
        assert_eq!(engine.escape_text("it's").unwrap(), "'it''s'");
        assert_eq!(engine.escape_bool(false), "FALSE");
        assert_eq!(engine.escape_binary(b"HI").unwrap(), "X'4849'");
    }

    #[test]
    fn test_generic_dates_use_typed_literals() {
        let engine = GenericEngine::new();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(engine.escape_date(date).unwrap(), "DATE '2024-01-02'");
        assert_eq!(
            engine
                .escape_datetime(date.and_hms_opt(10, 30, 0).unwrap())
                .unwrap(),
            "TIMESTAMP '2024-01-02 10:30:00'"
        );
    }

    #[test]
    fn test_generic_like() {
        let engine = GenericEngine::new();
        assert_eq!(
            engine.escape_like("50%", LikeAnchor::Contains).unwrap(),
            "'%50\\%%' ESCAPE '\\'"
        );
    }

    #[test]
    fn test_generic_limit_offset() {
        let engine = GenericEngine::new();
        assert_eq!(
            engine
                .apply_limit_offset("SELECT * FROM t", Some(10), Some(20))
                .unwrap(),
            "SELECT * FROM t OFFSET 20 ROWS FETCH FIRST 10 ROWS ONLY"
        );
        assert_eq!(
            engine
                .apply_limit_offset("SELECT * FROM t", Some(5), None)
                .unwrap(),
            "SELECT * FROM t FETCH FIRST 5 ROWS ONLY"
        );
    }
}
