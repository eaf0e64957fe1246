//! Error types for statement translation.

use thiserror::Error;

/// A recoverable problem found while translating a statement.
///
/// Issues never abort the pass. Each one is recorded on the
/// [`Translation`](crate::Translation) and rendered inline as
/// `**<message>**` at the position where it occurred, so a dumped
/// statement shows exactly what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateIssue {
    /// A single or double quote without its closing partner.
    #[error("Alone quote")]
    AloneQuote,

    /// A backtick or bracket identifier without its closing partner.
    #[error("Unterminated identifier")]
    UnterminatedIdentifier,

    /// A `%code` that is neither a modifier nor a keyword.
    #[error("Unknown modifier %{0}")]
    UnknownModifier(String),

    /// A modifier with no token left to bind to.
    #[error("Extra modifier %{0}")]
    ExtraModifier(String),

    /// A `?` placeholder with no token left to fill it.
    #[error("Extra placeholder")]
    ExtraPlaceholder,

    /// A keyword used where it is not allowed, e.g. `%end` without `%if`.
    #[error("Unexpected %{0}")]
    UnexpectedKeyword(String),

    /// A value whose shape does not fit the modifier applied to it.
    #[error("Invalid combination of type {kind} and modifier %{modifier}")]
    InvalidCombination {
        /// Kind of the offending value.
        kind: &'static str,
        /// Modifier code that rejected it.
        modifier: String,
    },

    /// Text given to a numeric modifier that is not a number.
    #[error("Expected number, '{0}' given")]
    ExpectedNumber(String),

    /// Text given to a date modifier that is not a calendar expression.
    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    /// A multi-insert mapping whose rows differ in length.
    #[error("Multi-insert row '{0}' is different")]
    MultiInsertMismatch(String),

    /// A `:name:` with neither a table entry nor a fallback result.
    #[error("Unresolved substitution :{0}:")]
    UnresolvedSubstitution(String),
}

impl TranslateIssue {
    /// Returns the visible marker embedded in the output in place of the
    /// failed piece.
    #[must_use]
    pub fn marker(&self) -> String {
        format!("**{self}**")
    }
}

/// A hard failure raised by an [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine needs a live connection to escape against.
    #[error("engine '{0}' is not connected")]
    NotConnected(&'static str),

    /// The engine cannot express the requested construct.
    #[error("engine '{engine}' does not support {feature}")]
    Unsupported {
        /// Engine name.
        engine: &'static str,
        /// Description of the unsupported construct.
        feature: String,
    },

    /// Any other engine failure.
    #[error("engine error: {0}")]
    Other(String),
}

/// Errors returned by the translator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TranslateError {
    /// The engine failed; nothing usable was produced.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The statement was translated with issues and must not be executed.
    #[error("SQL translate error: {} in: {sql}", .issues.first().map(ToString::to_string).unwrap_or_default())]
    Failed {
        /// The marked-up statement, for display only.
        sql: String,
        /// Every issue recorded during the pass, in order.
        issues: Vec<TranslateIssue>,
    },
}

/// Result type for translation.
pub type Result<T> = std::result::Result<T, TranslateError>;
