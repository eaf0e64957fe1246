#![allow(dead_code)]

use oxide_translator::engine::{Engine, EngineResult, SqliteEngine};
use oxide_translator::{Arg, Translation, Translator};

/// An engine that leaves identifiers bare, so expected statements read
/// like hand-written SQL.
#[derive(Debug, Default)]
pub struct PlainEngine;

impl Engine for PlainEngine {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn escape_identifier(&self, name: &str) -> EngineResult<String> {
        Ok(String::from(name))
    }
}

pub fn translate(translator: &Translator, args: Vec<Arg>) -> Translation {
    translator
        .translate(args)
        .unwrap_or_else(|e| panic!("Engine failure: {e}"))
}

pub fn plain(args: Vec<Arg>) -> Translation {
    translate(&Translator::new(PlainEngine), args)
}

pub fn sqlite(args: Vec<Arg>) -> Translation {
    translate(&Translator::new(SqliteEngine::new()), args)
}

/// Translates and asserts that no issue was recorded.
pub fn ok_sql(translator: &Translator, args: Vec<Arg>) -> String {
    let translation = translate(translator, args);
    assert!(
        translation.is_ok(),
        "Unexpected issues {:?} in: {}",
        translation.issues,
        translation.sql
    );
    translation.sql
}

pub fn plain_sql(args: Vec<Arg>) -> String {
    ok_sql(&Translator::new(PlainEngine), args)
}

pub fn sqlite_sql(args: Vec<Arg>) -> String {
    ok_sql(&Translator::new(SqliteEngine::new()), args)
}
