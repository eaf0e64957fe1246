//! Tests for `%if` / `%else` / `%end` blocks: nesting, else-if chains,
//! consumption of values in removed branches and unbalanced keywords.

mod common;
use common::*;

use oxide_translator::{args, Arg, TranslateIssue, Value};

#[test]
fn true_condition_keeps_branch() {
    assert_eq!(
        plain_sql(args!["SELECT * FROM t", "%if", true, "WHERE x=1", "%end"]),
        "SELECT * FROM t WHERE x=1"
    );
}

#[test]
fn else_branch() {
    assert_eq!(
        plain_sql(args![
            "SELECT * FROM t WHERE", "%if", false, "a=1", "%else", "b=2", "%end"
        ]),
        "SELECT * FROM t WHERE b=2"
    );
    assert_eq!(
        plain_sql(args![
            "SELECT * FROM t WHERE", "%if", true, "a=1", "%else", "b=2", "%end"
        ]),
        "SELECT * FROM t WHERE a=1"
    );
}

#[test]
fn keywords_inside_fragments() {
    assert_eq!(
        plain_sql(args!["SELECT * FROM t %if", false, "WHERE a=1 %end ORDER BY id"]),
        "SELECT * FROM t ORDER BY id"
    );
}

#[test]
fn condition_truthiness() {
    for (condition, expected) in [
        (Value::Null, "SELECT 1"),
        (Value::from(0), "SELECT 1"),
        (Value::from(""), "SELECT 1"),
        (Value::List(vec![]), "SELECT 1"),
        (Value::from(7), "SELECT 1 WHERE x"),
        (Value::from("0"), "SELECT 1 WHERE x"),
    ] {
        assert_eq!(
            plain_sql(args!["SELECT 1", "%if", condition, "WHERE x", "%end"]),
            expected
        );
    }
}

#[test]
fn nested_blocks() {
    let translation = plain(args![
        "SELECT 1", "%if", true, "A", "%if", false, "B", "%end", "C", "%end", "D"
    ]);
    assert_eq!(translation.sql, "SELECT 1 A C D");
    assert_eq!(translation.masked_regions, 1);
}

#[test]
fn nested_blocks_inside_removed_branch() {
    let translation = plain(args![
        "X", "%if", false, "A", "%if", true, "B", "%else", "C", "%end", "D", "%end", "E"
    ]);
    assert!(translation.is_ok());
    assert_eq!(translation.sql, "X E");
    assert_eq!(translation.masked_regions, 1);
}

#[test]
fn else_if_chain() {
    let stream = |first: bool, second: bool| {
        plain_sql(args![
            "SELECT", "%if", first, "1", "%else %if", second, "2", "%else", "3", "%end"
        ])
    };
    assert_eq!(stream(true, true), "SELECT 1");
    assert_eq!(stream(false, true), "SELECT 2");
    assert_eq!(stream(false, false), "SELECT 3");
}

#[test]
fn values_in_removed_branch_are_consumed() {
    assert_eq!(
        plain_sql(args![
            "SELECT * FROM t WHERE a=", 1,
            "%if", false, "AND b=", 2, "%end",
            "AND c=", 3
        ]),
        "SELECT * FROM t WHERE a=1 AND c=3"
    );
}

#[test]
fn modifiers_in_removed_branch_consume_without_issues() {
    let translation = plain(args!["SELECT 1 %if", false, "AND b = %i", "x", "%end"]);
    assert!(translation.is_ok());
    assert_eq!(translation.sql, "SELECT 1");

    let translation = plain(args!["SELECT 1 %if", false, "AND b = ?", 5, "%end AND c = ?", 6]);
    assert!(translation.is_ok());
    assert_eq!(translation.sql, "SELECT 1 AND c = 6");
}

#[test]
fn unknown_modifiers_in_removed_branch_are_not_issues() {
    let translation = plain(args![
        "SELECT 1", "%if", false, "AND x = %zz", 5, "%end",
        "AND y = ", 6
    ]);
    assert!(translation.is_ok(), "{:?}", translation.issues);
    assert_eq!(translation.sql, "SELECT 1 AND y = 6");

    let mut stream = args!["SELECT 1", "%if", false];
    stream.extend([Arg::modifier("zz"), Arg::value(5)]);
    stream.extend(args!["%end"]);
    let translation = plain(stream);
    assert!(translation.is_ok(), "{:?}", translation.issues);
    assert_eq!(translation.sql, "SELECT 1");
}

#[test]
fn malformed_text_in_removed_branch_is_ignored() {
    let translation = plain(args!["SELECT 1", "%if", false, "AND 'broken", "%end"]);
    assert!(translation.is_ok());
    assert_eq!(translation.sql, "SELECT 1");
}

#[test]
fn end_without_if() {
    let translation = plain(args!["SELECT 1", "%end"]);
    assert_eq!(
        translation.issues,
        vec![TranslateIssue::UnexpectedKeyword(String::from("end"))]
    );
    assert_eq!(translation.sql, "SELECT 1 **Unexpected %end**");
}

#[test]
fn else_without_if() {
    let translation = plain(args!["SELECT 1 %else"]);
    assert_eq!(
        translation.issues,
        vec![TranslateIssue::UnexpectedKeyword(String::from("else"))]
    );
}

#[test]
fn missing_end_closes_implicitly() {
    let translation = plain(args!["SELECT 1", "%if", false, "WHERE x"]);
    assert!(translation.is_ok());
    assert_eq!(translation.sql, "SELECT 1");
}

#[test]
fn if_without_condition() {
    let translation = plain(args!["SELECT 1 %if"]);
    assert_eq!(
        translation.issues,
        vec![TranslateIssue::ExtraModifier(String::from("if"))]
    );
}
