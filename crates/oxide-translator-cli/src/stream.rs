//! JSON encoding of argument streams.
//!
//! A stream is a JSON array. At the top level strings are SQL fragments;
//! inside lists and objects they are text values. Tagged objects select
//! the other token kinds:
//!
//! ```json
//! ["SELECT * FROM [users] WHERE id =", 5,
//!  "AND role", {"$modifier": "in"}, ["admin", "owner"],
//!  "AND created >", {"$date": "2024-01-02"}]
//! ```
//!
//! | object                       | token                          |
//! |------------------------------|--------------------------------|
//! | `{"$modifier": "code"}`      | explicit modifier              |
//! | `{"$text": "..."}`           | text value                     |
//! | `{"$literal": "..."}`        | raw SQL value                  |
//! | `{"$date": "2024-01-02"}`    | date value                     |
//! | `{"$datetime": "..."}`       | datetime value                 |
//! | `{"$binary": "cafe"}`        | binary value (hex)             |
//! | `{"$fragment": [...]}`       | nested stream                  |
//! | any other object             | mapping, keys in input order   |

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value as Json};

use oxide_translator::{Arg, Value};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parses a JSON document into an argument stream.
pub fn parse(input: &str) -> Result<Vec<Arg>> {
    let json: Json = serde_json::from_str(input).context("input is not valid JSON")?;
    match json {
        Json::Array(items) => items.into_iter().map(token).collect(),
        other => bail!("expected a JSON array of tokens, found {}", kind(&other)),
    }
}

/// Decodes a top-level token.
fn token(json: Json) -> Result<Arg> {
    match json {
        Json::String(sql) => Ok(Arg::Sql(sql)),
        Json::Object(object) => {
            if object.len() == 1 {
                if let Some(code) = object.get("$modifier") {
                    return match code {
                        Json::String(code) => Ok(Arg::Modifier(code.clone())),
                        other => bail!("$modifier expects a string, found {}", kind(other)),
                    };
                }
            }
            object_value(object).map(Arg::Value)
        }
        other => value(other).map(Arg::Value),
    }
}

/// Decodes a value nested in a list or an object.
fn value(json: Json) -> Result<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(b),
        Json::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(
                n.as_f64()
                    .ok_or_else(|| anyhow!("number {n} is out of range"))?,
            ),
        },
        Json::String(s) => Value::Text(s),
        Json::Array(items) => Value::List(items.into_iter().map(value).collect::<Result<_>>()?),
        Json::Object(object) => object_value(object)?,
    })
}

fn object_value(mut object: Map<String, Json>) -> Result<Value> {
    if object.len() == 1 {
        let tag = object.keys().next().cloned().unwrap_or_default();
        if tag.starts_with('$') {
            let inner = object.remove(&tag).unwrap_or(Json::Null);
            return tagged(&tag, inner);
        }
    }
    object
        .into_iter()
        .map(|(key, json)| -> Result<(String, Value)> { Ok((key, value(json)?)) })
        .collect::<Result<_>>()
        .map(Value::Map)
}

fn tagged(tag: &str, json: Json) -> Result<Value> {
    let text = |json: Json| match json {
        Json::String(s) => Ok(s),
        other => Err(anyhow!("{tag} expects a string, found {}", kind(&other))),
    };
    Ok(match tag {
        "$text" => Value::Text(text(json)?),
        "$literal" => Value::Literal(text(json)?),
        "$date" => {
            let s = text(json)?;
            Value::Date(
                NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                    .with_context(|| format!("invalid $date '{s}'"))?,
            )
        }
        "$datetime" => {
            let s = text(json)?;
            let parsed = DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(&s, format).ok());
            Value::DateTime(parsed.ok_or_else(|| anyhow!("invalid $datetime '{s}'"))?)
        }
        "$binary" => Value::Binary(decode_hex(&text(json)?)?),
        "$fragment" => match json {
            Json::Array(items) => {
                Value::Fragment(items.into_iter().map(token).collect::<Result<_>>()?)
            }
            other => bail!("$fragment expects an array, found {}", kind(&other)),
        },
        "$modifier" => bail!("$modifier is only allowed at the top level"),
        _ => bail!("unknown tag {tag}"),
    })
}

fn decode_hex(hex: &str) -> Result<Vec<u8>> {
    if hex.len() % 2 != 0 {
        bail!("hex string '{hex}' has an odd length");
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| anyhow!("invalid hex string '{hex}'"))
        })
        .collect()
}

const fn kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_and_scalars() {
        let args = parse(r#"["SELECT", 1, 1.5, true, null]"#).unwrap();
        assert_eq!(
            args,
            vec![
                Arg::sql("SELECT"),
                Arg::Value(Value::Int(1)),
                Arg::Value(Value::Float(1.5)),
                Arg::Value(Value::Bool(true)),
                Arg::Value(Value::Null),
            ]
        );
    }

    #[test]
    fn test_strings_inside_collections_are_text() {
        let args = parse(r#"[["a", 1], {"b": "x"}]"#).unwrap();
        assert_eq!(
            args,
            vec![
                Arg::Value(Value::List(vec![Value::from("a"), Value::Int(1)])),
                Arg::Value(Value::map([("b", "x")])),
            ]
        );
    }

    #[test]
    fn test_mapping_keeps_key_order() {
        let args = parse(r#"[{"z": 1, "a": 2}]"#).unwrap();
        assert_eq!(
            args,
            vec![Arg::Value(Value::map([("z", 1), ("a", 2)]))]
        );
    }

    #[test]
    fn test_tagged_objects() {
        let args = parse(
            r#"[{"$modifier": "in"}, {"$text": "t"}, {"$literal": "NOW()"},
                {"$date": "2024-01-02"}, {"$datetime": "2024-01-02 10:30:00"},
                {"$binary": "CAFE"}, {"$fragment": ["a =", 1]}]"#,
        )
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(
            args,
            vec![
                Arg::modifier("in"),
                Arg::Value(Value::from("t")),
                Arg::Value(Value::literal("NOW()")),
                Arg::Value(Value::Date(date)),
                Arg::Value(Value::DateTime(date.and_hms_opt(10, 30, 0).unwrap())),
                Arg::Value(Value::Binary(vec![0xCA, 0xFE])),
                Arg::Value(Value::fragment(vec![Arg::sql("a ="), Arg::value(1)])),
            ]
        );
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(parse("{}").is_err());
        assert!(parse("[").is_err());
        assert!(parse(r#"[{"$date": "yesterday"}]"#).is_err());
        assert!(parse(r#"[{"$binary": "ABC"}]"#).is_err());
        assert!(parse(r#"[{"$unknown": 1}]"#).is_err());
        assert!(parse(r#"[[{"$modifier": "s"}]]"#).is_err());
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("00ff").unwrap(), vec![0x00, 0xFF]);
        assert!(decode_hex("zz").is_err());
    }
}
