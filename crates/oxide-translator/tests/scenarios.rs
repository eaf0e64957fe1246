//! End-to-end statements: values, mappings, conditionals, lists and
//! malformed markers.

mod common;
use common::*;

use oxide_translator::{args, TranslateIssue, Value};

#[test]
fn value_glued_after_operator() {
    assert_eq!(
        plain_sql(args!["SELECT * FROM t WHERE id=", 5]),
        "SELECT * FROM t WHERE id=5"
    );
}

#[test]
fn mapping_after_insert_becomes_values_tuple() {
    assert_eq!(
        plain_sql(args![
            "INSERT INTO t",
            Value::map([("a", Value::from(1)), ("b", Value::from("x"))]),
        ]),
        "INSERT INTO t (a, b) VALUES (1, 'x')"
    );
}

#[test]
fn false_condition_leaves_no_trace() {
    let translation = plain(args!["SELECT * FROM t", "%if", false, "WHERE x=1", "%end"]);
    assert!(translation.is_ok());
    assert_eq!(translation.sql, "SELECT * FROM t");
    assert_eq!(translation.masked_regions, 1);
}

#[test]
fn list_inside_parentheses() {
    assert_eq!(
        plain_sql(args!["id IN (", vec![1, 2, 3], ")"]),
        "id IN (1, 2, 3)"
    );
}

#[test]
fn unknown_modifier_is_reported_inline() {
    let translation = plain(args!["bad", "%zz", 1]);
    assert!(!translation.is_ok());
    assert_eq!(
        translation.issues,
        vec![TranslateIssue::UnknownModifier(String::from("zz"))]
    );
    assert!(translation.sql.contains("**Unknown modifier %zz**"));
    assert_eq!(translation.sql, "bad **Unknown modifier %zz**");
}

#[test]
fn unknown_marker_inside_fragment_keeps_next_token() {
    let translation = plain(args!["SELECT %zz FROM t WHERE a =", 1]);
    assert_eq!(
        translation.sql,
        "SELECT **Unknown modifier %zz** FROM t WHERE a =1"
    );
    assert_eq!(translation.issues.len(), 1);
}

#[test]
fn failed_translation_into_result() {
    let err = plain(args!["bad", "%zz", 1]).into_result().unwrap_err();
    assert_eq!(
        err.to_string(),
        "SQL translate error: Unknown modifier %zz in: bad **Unknown modifier %zz**"
    );
}

#[test]
fn quoted_strings_are_reescaped() {
    assert_eq!(
        sqlite_sql(args!["SELECT * FROM [t] WHERE a = \"it's\" AND b = 'x'"]),
        "SELECT * FROM \"t\" WHERE a = 'it''s' AND b = 'x'"
    );
}

#[test]
fn injection_attempt_stays_a_literal() {
    assert_eq!(
        sqlite_sql(args![
            "SELECT * FROM t WHERE name = %s",
            "'; DROP TABLE t; --"
        ]),
        "SELECT * FROM t WHERE name = '''; DROP TABLE t; --'"
    );
}

#[test]
fn alone_quote_is_reported() {
    let translation = sqlite(args!["SELECT 'abc"]);
    assert_eq!(translation.issues, vec![TranslateIssue::AloneQuote]);
    assert_eq!(translation.sql, "SELECT **Alone quote**abc");
}

#[test]
fn unterminated_identifier_is_reported() {
    let translation = sqlite(args!["SELECT [abc FROM t"]);
    assert_eq!(
        translation.issues,
        vec![TranslateIssue::UnterminatedIdentifier]
    );
    assert_eq!(translation.sql, "SELECT **Unterminated identifier**abc FROM t");
}

#[test]
fn placeholders_take_following_tokens() {
    assert_eq!(
        sqlite_sql(args!["SELECT * FROM t WHERE a = ? AND b = ?", 1, "x"]),
        "SELECT * FROM t WHERE a = 1 AND b = 'x'"
    );
}

#[test]
fn missing_placeholder_value() {
    let translation = sqlite(args!["SELECT * FROM t WHERE a = ?"]);
    assert_eq!(translation.issues, vec![TranslateIssue::ExtraPlaceholder]);
    assert_eq!(
        translation.sql,
        "SELECT * FROM t WHERE a = **Extra placeholder**"
    );
}

#[test]
fn nested_fragment_value() {
    let condition = Value::fragment(args!["a = %i", 5]);
    assert_eq!(
        sqlite_sql(args!["SELECT * FROM t WHERE", condition]),
        "SELECT * FROM t WHERE a = 5"
    );
}

#[test]
fn nested_fragment_issues_are_merged() {
    let condition = Value::fragment(args!["a = %i", "x"]);
    let translation = sqlite(args!["SELECT * FROM t WHERE", condition]);
    assert_eq!(
        translation.issues,
        vec![TranslateIssue::ExpectedNumber(String::from("x"))]
    );
}

#[test]
fn expand_splices_list_into_stream() {
    let parts = Value::List(vec![
        Value::from("a = "),
        Value::from(1),
        Value::from("AND b = "),
        Value::from("x"),
    ]);
    assert_eq!(
        sqlite_sql(args!["SELECT * FROM t WHERE %ex", parts]),
        "SELECT * FROM t WHERE a = 1 AND b = x"
    );
}
