//! Modifier dispatch.
//!
//! Every value in the stream is rendered by [`TranslateState::format_value`]
//! according to the modifier bound to it. Scalars go through the engine's
//! escaping primitives; lists and mappings expand into SQL clauses whose
//! shape the modifier selects:
//!
//! | modifier    | mapping `{a: 1, b: 2}`          | list `[1, 2]`       |
//! |-------------|---------------------------------|---------------------|
//! | `%a`        | `"a" = 1, "b" = 2`              | error               |
//! | `%v`        | `("a", "b") VALUES (1, 2)`      | error               |
//! | `%l`/`%in`  | `(1, 2)`                        | `(1, 2)`            |
//! | `%and`      | `("a" = 1) AND ("b" = 2)`       | `(1) AND (2)`       |
//! | `%n`        | `"a" AS "1"`                    | `"1", "2"`          |
//! | scalar      | error                           | each element        |
//!
//! Mismatches are issues, never panics.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::calendar;
use crate::engine::EngineResult;
use crate::error::TranslateIssue;
use crate::modifier::{split_key, Marker, Modifier};
use crate::scanner::Scanner;
use crate::translator::TranslateState;
use crate::value::{Arg, Value};

impl TranslateState<'_> {
    /// Renders one value under an optional modifier.
    pub(crate) fn format_value(
        &mut self,
        value: Value,
        modifier: Option<Modifier>,
    ) -> EngineResult<String> {
        match value {
            Value::Expr(expr) => expr.render(self.engine(), modifier),
            Value::List(items) => self.format_list(items, modifier),
            Value::Map(entries) => self.format_map(entries, modifier),
            Value::Fragment(args) => match modifier {
                None | Some(Modifier::Sql | Modifier::Expand) => self.nested(args),
                Some(other) => Ok(self.mismatch("fragment", other)),
            },
            scalar => match modifier {
                None => self.format_plain(scalar),
                Some(modifier) => self.format_scalar(scalar, modifier),
            },
        }
    }

    /// Records an invalid value/modifier combination.
    fn mismatch(&mut self, kind: &'static str, modifier: Modifier) -> String {
        self.issue(TranslateIssue::InvalidCombination {
            kind,
            modifier: String::from(modifier.code()),
        })
    }

    /// Renders a value without modifier, by its own type.
    fn format_plain(&mut self, value: Value) -> EngineResult<String> {
        let engine = self.engine();
        match value {
            Value::Null => Ok(String::from("NULL")),
            Value::Bool(b) => Ok(engine.escape_bool(b)),
            Value::Int(n) => Ok(n.to_string()),
            Value::Float(f) => Ok(self.float(f)),
            Value::Text(s) => engine.escape_text(&s),
            Value::Binary(b) => engine.escape_binary(&b),
            Value::Date(d) => engine.escape_date(d),
            Value::DateTime(dt) => engine.escape_datetime(dt),
            Value::Literal(sql) => Ok(sql),
            other => self.format_value(other, None),
        }
    }

    fn float(&mut self, value: f64) -> String {
        float_text(value).unwrap_or_else(|| {
            self.issue(TranslateIssue::ExpectedNumber(value.to_string()))
        })
    }

    /// Renders a scalar under an explicit modifier.
    fn format_scalar(&mut self, value: Value, modifier: Modifier) -> EngineResult<String> {
        let engine = self.engine();
        match (modifier, value) {
            (
                Modifier::Text
                | Modifier::TextOrNull
                | Modifier::Binary
                | Modifier::Bool
                | Modifier::Int
                | Modifier::Unsigned
                | Modifier::IntOrNull
                | Modifier::Float
                | Modifier::Date
                | Modifier::DateTime
                | Modifier::Like(_),
                Value::Null,
            ) => Ok(String::from("NULL")),
            (Modifier::TextOrNull, Value::Text(s)) if s.is_empty() => Ok(String::from("NULL")),
            (Modifier::Text | Modifier::TextOrNull, value) => match value {
                Value::Text(s) => engine.escape_text(&s),
                Value::Int(n) => engine.escape_text(&n.to_string()),
                Value::Float(f) => match float_text(f) {
                    Some(text) => engine.escape_text(&text),
                    None => Ok(self.issue(TranslateIssue::ExpectedNumber(f.to_string()))),
                },
                Value::Bool(b) => engine.escape_text(if b { "1" } else { "0" }),
                other => Ok(self.mismatch(other.kind(), modifier)),
            },

            (Modifier::Binary, Value::Binary(b)) => engine.escape_binary(&b),
            (Modifier::Binary, Value::Text(s)) => engine.escape_binary(s.as_bytes()),

            (
                Modifier::Bool,
                value @ (Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Text(_)),
            ) => Ok(engine.escape_bool(value.is_truthy())),

            (Modifier::IntOrNull, Value::Text(s)) if s.trim().is_empty() => {
                Ok(String::from("NULL"))
            }
            (Modifier::Int | Modifier::Unsigned | Modifier::IntOrNull, value) => {
                Ok(self.integer(value, modifier))
            }

            (Modifier::Float, Value::Float(f)) => Ok(self.float(f)),
            (Modifier::Float, Value::Int(n)) => Ok(n.to_string()),
            (Modifier::Float, Value::Bool(b)) => Ok(String::from(if b { "1" } else { "0" })),
            (Modifier::Float, Value::Text(s)) => Ok(match numeric_text(&s) {
                Some(text) => text,
                None => self.issue(TranslateIssue::ExpectedNumber(s)),
            }),

            (Modifier::Date | Modifier::DateTime, value) => self.calendar(value, modifier),

            (Modifier::Identifier | Modifier::OrderBy, Value::Text(s)) => self.identifier(&s),
            (Modifier::RawIdentifier, Value::Text(s)) => engine.escape_identifier(&s),

            (Modifier::Sql | Modifier::Expand, Value::Text(s)) => self.raw_sql(&s),
            (Modifier::Sql | Modifier::Expand, Value::Literal(sql)) => Ok(sql),

            (Modifier::Like(anchor), Value::Text(s)) => engine.escape_like(&s, anchor),
            (Modifier::Like(anchor), Value::Int(n)) => engine.escape_like(&n.to_string(), anchor),

            (modifier, value) => Ok(self.mismatch(value.kind(), modifier)),
        }
    }

    /// Renders `%i`, `%u` and `%iN`.
    fn integer(&mut self, value: Value, modifier: Modifier) -> String {
        match value {
            Value::Int(n) => n.to_string(),
            Value::Bool(b) => String::from(if b { "1" } else { "0" }),
            Value::Float(f) if f.is_finite() => format!("{}", f.trunc()),
            Value::Float(f) => self.issue(TranslateIssue::ExpectedNumber(f.to_string())),
            Value::Text(s) => match integer_text(&s) {
                Some(text) => text,
                None => self.issue(TranslateIssue::ExpectedNumber(s)),
            },
            other => self.mismatch(other.kind(), modifier),
        }
    }

    /// Renders `%d` and `%t`.
    fn calendar(&mut self, value: Value, modifier: Modifier) -> EngineResult<String> {
        let moment = match value {
            Value::Date(d) => Moment::Date(d),
            Value::DateTime(dt) => Moment::DateTime(dt),
            Value::Int(seconds) => {
                match DateTime::from_timestamp(seconds, 0) {
                    Some(dt) => Moment::DateTime(dt.naive_utc()),
                    None => return Ok(self.issue(TranslateIssue::InvalidDate(seconds.to_string()))),
                }
            }
            Value::Text(s) => match calendar::parse(&s, self.now) {
                Some(dt) => Moment::DateTime(dt),
                None => return Ok(self.issue(TranslateIssue::InvalidDate(s))),
            },
            other => return Ok(self.mismatch(other.kind(), modifier)),
        };

        let engine = self.engine();
        match (modifier, moment) {
            (Modifier::Date, Moment::Date(d)) => engine.escape_date(d),
            (Modifier::Date, Moment::DateTime(dt)) => engine.escape_date(dt.date()),
            (_, Moment::Date(d)) => match d.and_hms_opt(0, 0, 0) {
                Some(dt) => engine.escape_datetime(dt),
                None => Ok(self.issue(TranslateIssue::InvalidDate(d.to_string()))),
            },
            (_, Moment::DateTime(dt)) => engine.escape_datetime(dt),
        }
    }

    /// Quotes an identifier: substitutions are resolved first, then each
    /// dot-separated part is quoted on its own. A `*` part stays bare.
    pub(crate) fn identifier(&mut self, name: &str) -> EngineResult<String> {
        let name = match self.translator.substitutions().substitute(name) {
            Ok(name) => name,
            Err(issue) => return Ok(self.issue(issue)),
        };
        let engine = self.engine();
        let parts = name
            .split('.')
            .map(|part| {
                if part == "*" {
                    Ok(String::from(part))
                } else {
                    engine.escape_identifier(part)
                }
            })
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(parts.join("."))
    }

    /// Re-scans raw SQL text for quoting, identifiers and substitutions.
    fn raw_sql(&mut self, text: &str) -> EngineResult<String> {
        let mut out = String::with_capacity(text.len());
        for lexeme in Scanner::raw(text) {
            out.push_str(&self.render_lexeme(lexeme)?);
        }
        Ok(out)
    }

    /// Renders the value of a mapping entry, honouring the key's modifier
    /// suffix.
    fn format_entry(&mut self, code: Option<&str>, value: Value) -> EngineResult<String> {
        match self.entry_modifier(code, &value) {
            Ok(modifier) => self.format_value(value, modifier),
            Err(marker) => Ok(marker),
        }
    }

    /// Resolves the modifier of a mapping entry. A list without one is
    /// expanded.
    fn entry_modifier(
        &mut self,
        code: Option<&str>,
        value: &Value,
    ) -> Result<Option<Modifier>, String> {
        match code {
            None if matches!(value, Value::List(_)) => Ok(Some(Modifier::Expand)),
            None => Ok(None),
            Some(code) => match Marker::parse(code) {
                Some(Marker::Modifier(modifier)) => Ok(Some(modifier)),
                _ => Err(self.issue(TranslateIssue::UnknownModifier(String::from(code)))),
            },
        }
    }

    fn format_list(&mut self, items: Vec<Value>, modifier: Option<Modifier>) -> EngineResult<String> {
        match modifier {
            Some(Modifier::Sql | Modifier::Expand) => {
                self.nested(items.into_iter().map(Arg::from_expanded).collect())
            }
            Some(Modifier::And | Modifier::Or) => {
                let conditions = items
                    .into_iter()
                    .map(|item| self.format_value(item, Some(Modifier::Expand)))
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(join_conditions(&conditions, modifier))
            }
            Some(Modifier::List | Modifier::In) => {
                let values = items
                    .into_iter()
                    .map(|item| {
                        let nested = matches!(item, Value::List(_)).then_some(Modifier::Expand);
                        self.format_value(item, nested)
                    })
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(parenthesize(&values, modifier == Some(Modifier::In)))
            }
            Some(Modifier::OrderBy) => {
                let columns = items
                    .into_iter()
                    .map(|item| match item {
                        Value::List(_) => self.format_value(item, Some(Modifier::Expand)),
                        other => self.format_value(other, Some(Modifier::Identifier)),
                    })
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(columns.join(", "))
            }
            Some(other @ (Modifier::Assign | Modifier::Values | Modifier::MultiValues)) => {
                Ok(self.mismatch("list", other))
            }
            scalar => {
                let values = items
                    .into_iter()
                    .map(|item| self.format_value(item, scalar))
                    .collect::<EngineResult<Vec<_>>>()?;
                Ok(values.join(", "))
            }
        }
    }

    fn format_map(
        &mut self,
        entries: Vec<(String, Value)>,
        modifier: Option<Modifier>,
    ) -> EngineResult<String> {
        match modifier {
            None | Some(Modifier::Assign) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let (column, code) = split_key(&key);
                    let column = self.identifier(column)?;
                    let value = self.format_entry(code, value)?;
                    pairs.push(format!("{column} = {value}"));
                }
                Ok(pairs.join(", "))
            }
            Some(Modifier::And | Modifier::Or) => {
                let mut conditions = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    conditions.push(self.condition(&key, value)?);
                }
                Ok(join_conditions(&conditions, modifier))
            }
            Some(Modifier::Identifier) => {
                let mut columns = Vec::with_capacity(entries.len());
                for (key, alias) in entries {
                    let column = self.identifier(&key)?;
                    columns.push(match alias {
                        Value::Null => column,
                        Value::Text(alias) if alias.is_empty() => column,
                        Value::Text(alias) => {
                            format!("{column} AS {}", self.engine().escape_identifier(&alias)?)
                        }
                        other => self.mismatch(other.kind(), Modifier::Identifier),
                    });
                }
                Ok(columns.join(", "))
            }
            Some(Modifier::List | Modifier::In) => {
                let mut values = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let (_, code) = split_key(&key);
                    values.push(self.format_entry(code, value)?);
                }
                Ok(parenthesize(&values, modifier == Some(Modifier::In)))
            }
            Some(Modifier::Values) => {
                let mut columns = Vec::with_capacity(entries.len());
                let mut values = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let (column, code) = split_key(&key);
                    columns.push(self.identifier(column)?);
                    values.push(self.format_entry(code, value)?);
                }
                Ok(format!(
                    "({}) VALUES ({})",
                    columns.join(", "),
                    values.join(", ")
                ))
            }
            Some(Modifier::MultiValues) => self.multi_values(entries),
            Some(Modifier::OrderBy) => {
                let mut columns = Vec::with_capacity(entries.len());
                for (key, direction) in entries {
                    if matches!(direction, Value::List(_)) {
                        columns.push(self.format_value(direction, Some(Modifier::Expand))?);
                        continue;
                    }
                    let column = self.identifier(&key)?;
                    let direction = if is_ascending(&direction) { "ASC" } else { "DESC" };
                    columns.push(format!("{column} {direction}"));
                }
                Ok(columns.join(", "))
            }
            Some(other) => Ok(self.mismatch("map", other)),
        }
    }

    /// Renders one `%and` / `%or` condition.
    fn condition(&mut self, key: &str, value: Value) -> EngineResult<String> {
        let (column, code) = split_key(key);
        let column = self.identifier(column)?;
        let modifier = match code {
            None if matches!(value, Value::List(_)) => Ok(Some(Modifier::In)),
            code => self.entry_modifier(code, &value),
        };
        let modifier = match modifier {
            Ok(modifier) => modifier,
            Err(marker) => return Ok(format!("{column} {marker}")),
        };
        if modifier == Some(Modifier::Expand) {
            let rendered = self.format_value(value, modifier)?;
            return Ok(format!("{column} {rendered}"));
        }

        let rendered = self.format_value(value, modifier)?;
        let operator = match modifier {
            Some(Modifier::List | Modifier::In) => "IN",
            Some(Modifier::Like(_)) => "LIKE",
            _ if rendered == "NULL" => "IS",
            _ => "=",
        };
        Ok(format!("{column} {operator} {rendered}"))
    }

    /// Renders `%m`: every entry holds one list of row values.
    fn multi_values(&mut self, entries: Vec<(String, Value)>) -> EngineResult<String> {
        let mut columns = Vec::with_capacity(entries.len());
        let mut rows: Vec<Vec<String>> = Vec::new();
        for (index, (key, value)) in entries.into_iter().enumerate() {
            let (column, code) = split_key(&key);
            columns.push(self.identifier(column)?);
            let items = match value {
                Value::List(items) => items,
                other => return Ok(self.mismatch(other.kind(), Modifier::MultiValues)),
            };
            if index == 0 {
                rows.resize_with(items.len(), Vec::new);
            } else if items.len() != rows.len() {
                return Ok(self.issue(TranslateIssue::MultiInsertMismatch(String::from(column))));
            }
            for (row, item) in rows.iter_mut().zip(items) {
                row.push(self.format_entry(code, item)?);
            }
        }
        if rows.is_empty() {
            let kind = if columns.is_empty() { "empty map" } else { "empty list" };
            return Ok(self.mismatch(kind, Modifier::MultiValues));
        }
        let rows: Vec<String> = rows
            .iter()
            .map(|row| format!("({})", row.join(", ")))
            .collect();
        Ok(format!("({}) VALUES {}", columns.join(", "), rows.join(", ")))
    }
}

/// A calendar value ready for formatting.
enum Moment {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

/// Joins rendered conditions with `AND` / `OR`. An empty set is always
/// true.
fn join_conditions(conditions: &[String], modifier: Option<Modifier>) -> String {
    if conditions.is_empty() {
        return String::from("1=1");
    }
    let glue = if modifier == Some(Modifier::Or) {
        ") OR ("
    } else {
        ") AND ("
    };
    format!("({})", conditions.join(glue))
}

/// Wraps values in parentheses. An empty `%in` list renders `(NULL)` so
/// the statement stays valid.
fn parenthesize(values: &[String], null_when_empty: bool) -> String {
    if values.is_empty() && null_when_empty {
        String::from("(NULL)")
    } else {
        format!("({})", values.join(", "))
    }
}

/// Reads an `%by` direction: text starting with `d` is descending,
/// numbers and booleans are ascending when positive.
fn is_ascending(direction: &Value) -> bool {
    match direction {
        Value::Text(s) => !s.trim_start().starts_with(['d', 'D']),
        Value::Int(n) => *n > 0,
        Value::Float(f) => *f > 0.0,
        Value::Bool(b) => *b,
        _ => false,
    }
}

/// Formats a float without exponent and without trailing zeros.
fn float_text(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    let text = format!("{value:.10}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    Some(if text == "-0" {
        String::from("0")
    } else {
        String::from(text)
    })
}

/// Validates integer text. Hexadecimal `0x..` is converted to decimal.
fn integer_text(text: &str) -> Option<String> {
    let text = text.trim();
    let (sign, digits) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.strip_prefix('+').unwrap_or(text)),
    };
    if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        let n = u128::from_str_radix(hex, 16).ok()?;
        return Some(format!("{sign}{n}"));
    }
    let (mantissa, exponent) = match digits.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (digits, None),
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    (all_digits(mantissa) && exponent.map_or(true, all_digits)).then(|| format!("{sign}{digits}"))
}

/// Validates decimal number text for `%f`.
fn numeric_text(text: &str) -> Option<String> {
    let text = text.trim();
    let plain = !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    (plain && text.parse::<f64>().is_ok_and(f64::is_finite)).then(|| String::from(text))
}
