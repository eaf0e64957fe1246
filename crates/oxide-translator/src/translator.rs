//! The statement translator.
//!
//! [`Translator::translate`] walks the argument stream once, left to right.
//! Literal fragments are scanned for quoting, identifiers, markers,
//! substitutions and placeholders; values are rendered through the
//! modifier bound to them. Problems are recorded as issues and marked
//! inline, so the output of a failed pass still shows where it went wrong.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::config::TranslatorConfig;
use crate::conditional::ConditionalState;
use crate::engine::{Engine, EngineResult};
use crate::error::{Result, TranslateError, TranslateIssue};
use crate::modifier::{Keyword, Marker, Modifier};
use crate::scanner::{Lexeme, Scanner};
use crate::substitution::Substitutions;
use crate::value::{Arg, Value};
use crate::writer::SqlWriter;

/// Translates argument streams into SQL text for one engine.
///
/// A translator holds no per-statement state, so a shared reference can be
/// used from many threads at once.
///
/// ```rust
/// use oxide_translator::{args, engine::SqliteEngine, Translator};
///
/// let translator = Translator::new(SqliteEngine::new());
/// let sql = translator
///     .translate(args!["SELECT * FROM [users] WHERE id = ", 5])
///     .unwrap()
///     .into_result()
///     .unwrap();
/// assert_eq!(sql, "SELECT * FROM \"users\" WHERE id = 5");
/// ```
#[derive(Clone)]
pub struct Translator {
    engine: Arc<dyn Engine>,
    substitutions: Substitutions,
    placeholders: bool,
}

impl Translator {
    /// Creates a translator for an engine, with an empty substitution
    /// table and `?` placeholders enabled.
    #[must_use]
    pub fn new(engine: impl Engine + 'static) -> Self {
        Self::with_engine(Arc::new(engine))
    }

    /// Creates a translator sharing an existing engine.
    #[must_use]
    pub fn with_engine(engine: Arc<dyn Engine>) -> Self {
        Self {
            engine,
            substitutions: Substitutions::new(),
            placeholders: true,
        }
    }

    /// Creates a translator from configuration.
    #[must_use]
    pub fn from_config(config: &TranslatorConfig) -> Self {
        let mut translator = Self::with_engine(Arc::from(config.engine.engine()));
        for (name, text) in &config.substitutions {
            translator.set_substitution(name.as_str(), text.as_str());
        }
        translator.placeholders = config.placeholders;
        translator
    }

    /// Returns the active engine.
    #[must_use]
    pub fn engine(&self) -> &dyn Engine {
        self.engine.as_ref()
    }

    /// Returns the substitution table.
    #[must_use]
    pub const fn substitutions(&self) -> &Substitutions {
        &self.substitutions
    }

    /// Returns the substitution table for modification.
    pub fn substitutions_mut(&mut self) -> &mut Substitutions {
        &mut self.substitutions
    }

    /// Adds or replaces a substitution.
    pub fn set_substitution(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.substitutions.set(name, text);
    }

    /// Removes a substitution, returning its text.
    pub fn remove_substitution(&mut self, name: &str) -> Option<String> {
        self.substitutions.remove(name)
    }

    /// Installs the resolver for names without a table entry.
    pub fn set_substitution_fallback<F>(&mut self, fallback: F)
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.substitutions.set_fallback(fallback);
    }

    /// Enables or disables `?` placeholders in literal fragments.
    pub fn set_placeholders(&mut self, enabled: bool) {
        self.placeholders = enabled;
    }

    /// Returns true if `?` placeholders are recognized.
    #[must_use]
    pub const fn placeholders(&self) -> bool {
        self.placeholders
    }

    /// Translates an argument stream.
    ///
    /// Issues do not make this call fail; they are collected on the
    /// returned [`Translation`]. Use [`Translation::into_result`] to turn
    /// them into an error.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Engine`] when the engine fails.
    pub fn translate<I, A>(&self, args: I) -> Result<Translation>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let args: VecDeque<Arg> = args.into_iter().map(Into::into).collect();
        let count = args.len();
        let now = Utc::now().naive_utc();
        let translation = TranslateState::new(self, args, now).run()?;

        if translation.issues.is_empty() {
            debug!(
                engine = self.engine.name(),
                args = count,
                sql = %translation.sql,
                "translated statement"
            );
        } else {
            warn!(
                engine = self.engine.name(),
                issues = translation.issues.len(),
                sql = %translation.sql,
                "statement translated with issues"
            );
        }
        Ok(translation)
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("engine", &self.engine.name())
            .field("substitutions", &self.substitutions)
            .field("placeholders", &self.placeholders)
            .finish()
    }
}

/// The outcome of one translation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    /// The statement. Contains `**message**` markers if there are issues.
    pub sql: String,
    /// Every issue recorded during the pass, in order.
    pub issues: Vec<TranslateIssue>,
    /// Number of conditional branches that were suppressed.
    pub masked_regions: usize,
}

impl Translation {
    /// Returns true if the pass recorded no issues.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns the statement, or an error carrying the issues.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateError::Failed`] if any issue was recorded.
    pub fn into_result(self) -> Result<String> {
        if self.issues.is_empty() {
            Ok(self.sql)
        } else {
            Err(TranslateError::Failed {
                sql: self.sql,
                issues: self.issues,
            })
        }
    }
}

/// Mutable state of a single translation pass.
pub(crate) struct TranslateState<'t> {
    pub(crate) translator: &'t Translator,
    args: VecDeque<Arg>,
    writer: SqlWriter,
    conditional: ConditionalState,
    pub(crate) issues: Vec<TranslateIssue>,
    pub(crate) now: NaiveDateTime,
    /// Whether the statement starts with INSERT or REPLACE.
    inserting: bool,
    /// Index of the token holding the last modifier-less mapping.
    last_map: Option<usize>,
    token: usize,
    limit: Option<u64>,
    offset: Option<u64>,
    /// Masked regions of nested fragments.
    nested_masked: usize,
}

impl<'t> TranslateState<'t> {
    pub(crate) fn new(translator: &'t Translator, args: VecDeque<Arg>, now: NaiveDateTime) -> Self {
        let inserting = args
            .iter()
            .find_map(|arg| match arg {
                Arg::Sql(text) => Some(text.as_str()),
                _ => None,
            })
            .is_some_and(is_insert_command);
        Self {
            translator,
            args,
            writer: SqlWriter::new(),
            conditional: ConditionalState::new(),
            issues: Vec::new(),
            now,
            inserting,
            last_map: None,
            token: 0,
            limit: None,
            offset: None,
            nested_masked: 0,
        }
    }

    /// Returns the engine, detached from the borrow of `self`.
    pub(crate) fn engine(&self) -> &'t dyn Engine {
        self.translator.engine.as_ref()
    }

    pub(crate) fn run(mut self) -> Result<Translation> {
        while let Some(arg) = self.args.pop_front() {
            self.token += 1;
            self.writer.boundary();
            match arg {
                Arg::Sql(text) => self.scan_fragment(&text)?,
                Arg::Modifier(code) => self.directive(&code, None)?,
                Arg::Value(value) => self.stream_value(value)?,
            }
        }
        self.conditional.finish();

        let masked_regions = self.conditional.masked_regions() + self.nested_masked;
        let engine = self.engine();
        let mut sql = self.writer.finish();
        if self.limit.is_some() || self.offset.is_some() {
            sql = engine.apply_limit_offset(&sql, self.limit, self.offset)?;
        }
        Ok(Translation {
            sql,
            issues: self.issues,
            masked_regions,
        })
    }

    /// Records an issue and returns its inline marker.
    pub(crate) fn issue(&mut self, issue: TranslateIssue) -> String {
        let marker = issue.marker();
        self.issues.push(issue);
        marker
    }

    /// Records an issue and writes its marker unless the output is masked.
    fn fail(&mut self, issue: TranslateIssue) {
        let marker = self.issue(issue);
        if !self.conditional.is_masked() {
            self.writer.push(&marker);
        }
    }

    fn emit(&mut self, piece: &str) {
        if !self.conditional.is_masked() {
            self.writer.push(piece);
        }
    }

    /// Removes the next token from the stream for a marker that consumes
    /// it. Records an "Extra modifier" issue when the stream is exhausted.
    fn take_value(&mut self, code: &str) -> Option<Value> {
        let value = self.args.pop_front().map(Arg::into_value);
        if value.is_none() {
            self.fail(TranslateIssue::ExtraModifier(String::from(code)));
        }
        value
    }

    fn scan_fragment(&mut self, text: &str) -> Result<()> {
        let mut scanner = Scanner::new(text).placeholders(self.translator.placeholders);
        while let Some(lexeme) = scanner.next() {
            match lexeme {
                Lexeme::Marker(code) => self.directive(code, Some(&mut scanner))?,
                Lexeme::Placeholder => match self.args.pop_front() {
                    Some(_) if self.conditional.is_masked() => {}
                    Some(arg) => {
                        let rendered = self.format_value(arg.into_value(), None)?;
                        self.writer.push(&rendered);
                    }
                    None => self.fail(TranslateIssue::ExtraPlaceholder),
                },
                _ if self.conditional.is_masked() => {}
                other => {
                    let rendered = self.render_lexeme(other)?;
                    self.writer.push(&rendered);
                }
            }
        }
        Ok(())
    }

    /// Renders a lexeme that does not interact with the argument stream.
    pub(crate) fn render_lexeme<'a>(&mut self, lexeme: Lexeme<'a>) -> EngineResult<Cow<'a, str>> {
        Ok(match lexeme {
            Lexeme::Text(text) => Cow::Borrowed(text),
            Lexeme::Identifier(name) => Cow::Owned(self.identifier(name)?),
            Lexeme::String(text) => Cow::Owned(self.engine().escape_text(&text)?),
            Lexeme::AloneQuote => Cow::Owned(self.issue(TranslateIssue::AloneQuote)),
            Lexeme::UnterminatedIdentifier => {
                Cow::Owned(self.issue(TranslateIssue::UnterminatedIdentifier))
            }
            Lexeme::Substitution { name, prefix } => {
                match self.translator.substitutions.resolve(name) {
                    Ok(text) if prefix => Cow::Owned(text),
                    Ok(text) => Cow::Owned(self.engine().escape_text(&text)?),
                    Err(issue) => Cow::Owned(self.issue(issue)),
                }
            }
            Lexeme::Marker(code) => Cow::Owned(format!("%{code}")),
            Lexeme::Placeholder => Cow::Borrowed("?"),
        })
    }

    /// Handles a `%code` from a fragment (`scanner` set) or an explicit
    /// modifier token.
    fn directive(&mut self, code: &str, scanner: Option<&mut Scanner<'_>>) -> Result<()> {
        let Some(marker) = Marker::parse(code) else {
            // a trailing marker binds to the next token, so it eats it
            if scanner.as_ref().map_or(true, |s| s.is_finished()) {
                self.args.pop_front();
            }
            if !self.conditional.is_masked() {
                self.fail(TranslateIssue::UnknownModifier(String::from(code)));
            }
            return Ok(());
        };

        match marker {
            Marker::Keyword(keyword) if keyword.is_conditional() => match scanner {
                Some(scanner) => self.conditional_keyword(keyword, scanner),
                None => self.fail(TranslateIssue::UnexpectedKeyword(String::from(code))),
            },
            Marker::Keyword(keyword) => self.row_bound(keyword),
            Marker::Modifier(Modifier::Expand) => self.expand()?,
            Marker::Modifier(modifier) => {
                let Some(value) = self.take_value(code) else {
                    return Ok(());
                };
                if !self.conditional.is_masked() {
                    let rendered = self.format_value(value, Some(modifier))?;
                    self.writer.push(&rendered);
                }
            }
        }
        Ok(())
    }

    fn conditional_keyword(&mut self, keyword: Keyword, scanner: &mut Scanner<'_>) {
        let outcome = match keyword {
            Keyword::If => match self.take_value(keyword.code()) {
                Some(condition) => {
                    self.conditional.open(condition.is_truthy());
                    Ok(())
                }
                None => Ok(()),
            },
            Keyword::Else if scanner.take_else_if() => match self.take_value("if") {
                Some(condition) => self.conditional.otherwise_if(condition.is_truthy()),
                None => Ok(()),
            },
            Keyword::Else => self.conditional.otherwise(),
            _ => self.conditional.close(),
        };
        if let Err(issue) = outcome {
            self.fail(issue);
        }
        // the text around a removed branch is joined like separate tokens
        self.writer.boundary();
    }

    /// Handles `%lmt` / `%ofs`.
    fn row_bound(&mut self, keyword: Keyword) {
        let Some(value) = self.take_value(keyword.code()) else {
            return;
        };
        if self.conditional.is_masked() {
            return;
        }
        let count = match &value {
            Value::Null => Some(None),
            Value::Int(n) => u64::try_from(*n).ok().map(Some),
            Value::Text(text) => text.trim().parse::<u64>().ok().map(Some),
            _ => None,
        };
        match (count, keyword) {
            (Some(count), Keyword::Limit) => self.limit = count,
            (Some(count), _) => self.offset = count,
            (None, _) => self.fail(TranslateIssue::InvalidCombination {
                kind: value.kind(),
                modifier: String::from(keyword.code()),
            }),
        }
    }

    /// Handles `%ex` at stream level: list elements and fragment tokens
    /// are spliced into the stream in place of the value.
    fn expand(&mut self) -> Result<()> {
        let code = Modifier::Expand.code();
        let Some(value) = self.take_value(code) else {
            return Ok(());
        };
        if self.conditional.is_masked() {
            return Ok(());
        }
        match value {
            Value::List(items) => {
                for item in items.into_iter().rev() {
                    self.args.push_front(Arg::from_expanded(item));
                }
            }
            Value::Fragment(args) => {
                for arg in args.into_iter().rev() {
                    self.args.push_front(arg);
                }
            }
            other => {
                let rendered = self.format_value(other, Some(Modifier::Expand))?;
                self.writer.push(&rendered);
            }
        }
        Ok(())
    }

    /// Renders a value token that no modifier is bound to.
    fn stream_value(&mut self, value: Value) -> Result<()> {
        if self.conditional.is_masked() {
            return Ok(());
        }
        let rendered = match value {
            Value::Map(entries) => {
                let modifier = match (self.last_map, self.inserting) {
                    (None, true) => Modifier::Values,
                    (Some(last), true) => {
                        if last + 1 == self.token {
                            self.writer.push(",");
                            self.writer.boundary();
                        }
                        Modifier::List
                    }
                    (_, false) => Modifier::Assign,
                };
                self.last_map = Some(self.token);
                self.format_value(Value::Map(entries), Some(modifier))?
            }
            other => self.format_value(other, None)?,
        };
        self.writer.push(&rendered);
        Ok(())
    }

    /// Translates a nested stream with the same translator and merges its
    /// issues into this pass.
    pub(crate) fn nested(&mut self, args: Vec<Arg>) -> EngineResult<String> {
        let state = TranslateState::new(self.translator, args.into(), self.now);
        match state.run() {
            Ok(translation) => {
                self.issues.extend(translation.issues);
                self.nested_masked += translation.masked_regions;
                Ok(translation.sql)
            }
            Err(TranslateError::Engine(err)) => Err(err),
            Err(TranslateError::Failed { sql, issues }) => {
                self.issues.extend(issues);
                Ok(sql)
            }
        }
    }
}

/// Returns true if the statement text starts with INSERT or REPLACE.
fn is_insert_command(text: &str) -> bool {
    let head: String = text
        .trim_start()
        .chars()
        .take(6)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    head == "INSERT" || head == "REPLAC"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GenericEngine, SqliteEngine};

    fn sqlite() -> Translator {
        Translator::new(SqliteEngine::new())
    }

    #[test]
    fn test_is_insert_command() {
        assert!(is_insert_command("INSERT INTO t"));
        assert!(is_insert_command("  insert into t"));
        assert!(is_insert_command("REPLACE INTO t"));
        assert!(!is_insert_command("UPDATE t SET"));
        assert!(!is_insert_command("INS"));
    }

    #[test]
    fn test_translator_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Translator>();
    }

    #[test]
    fn test_plain_fragments() {
        let translation = sqlite().translate(["SELECT 1"]).unwrap();
        assert!(translation.is_ok());
        assert_eq!(translation.sql, "SELECT 1");
        assert_eq!(translation.masked_regions, 0);
    }

    #[test]
    fn test_empty_stream() {
        let translation = sqlite().translate(Vec::<Arg>::new()).unwrap();
        assert_eq!(translation.sql, "");
        assert!(translation.is_ok());
    }

    #[test]
    fn test_into_result_reports_first_issue() {
        let err = sqlite()
            .translate(["SELECT 'x"])
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "SQL translate error: Alone quote in: SELECT **Alone quote**x"
        );
    }

    #[test]
    fn test_extra_modifier() {
        let translation = sqlite().translate(["SELECT %i"]).unwrap();
        assert_eq!(translation.sql, "SELECT **Extra modifier %i**");
        assert_eq!(
            translation.issues,
            vec![TranslateIssue::ExtraModifier(String::from("i"))]
        );
    }

    #[test]
    fn test_explicit_conditional_keyword_is_rejected() {
        let translation = sqlite()
            .translate(vec![Arg::sql("SELECT 1"), Arg::modifier("if"), Arg::value(true)])
            .unwrap();
        assert_eq!(
            translation.issues,
            vec![TranslateIssue::UnexpectedKeyword(String::from("if"))]
        );
    }

    #[test]
    fn test_limit_offset_keywords() {
        let translation = Translator::new(GenericEngine::new())
            .translate(crate::args!["SELECT * FROM t %lmt %ofs", 10, 20])
            .unwrap();
        assert_eq!(
            translation.sql,
            "SELECT * FROM t OFFSET 20 ROWS FETCH FIRST 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_invalid_limit() {
        let translation = sqlite()
            .translate(crate::args!["SELECT * FROM t %lmt", -1])
            .unwrap();
        assert_eq!(
            translation.issues,
            vec![TranslateIssue::InvalidCombination {
                kind: "int",
                modifier: String::from("lmt"),
            }]
        );
    }
}
