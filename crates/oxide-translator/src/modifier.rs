//! Modifier codes and reserved keywords.
//!
//! A `%code` marker in a literal fragment (or an explicit
//! [`Arg::Modifier`](crate::Arg::Modifier) token) selects how the next token
//! in the stream is rendered. Codes are case-sensitive.

use crate::engine::LikeAnchor;

/// Formatting rule applied to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `%s`: text literal.
    Text,
    /// `%sn` / `%sN`: text literal, `NULL` for empty text.
    TextOrNull,
    /// `%bin`: binary literal.
    Binary,
    /// `%b`: boolean literal.
    Bool,
    /// `%i`: integer.
    Int,
    /// `%u`: unsigned integer (formatted like `%i`).
    Unsigned,
    /// `%iN`: integer, `NULL` for empty text.
    IntOrNull,
    /// `%f`: floating point number.
    Float,
    /// `%d`: date literal.
    Date,
    /// `%t` / `%dt`: datetime literal.
    DateTime,
    /// `%n`: identifier with substitution and dotted parts.
    Identifier,
    /// `%N`: identifier quoted as a single part.
    RawIdentifier,
    /// `%sql` / `%p`: raw SQL, re-scanned for quoting and identifiers.
    Sql,
    /// `%ex`: expansion of a list into the argument stream.
    Expand,
    /// `%a`: `col = value, ...` assignments.
    Assign,
    /// `%l`: `(value, ...)` list.
    List,
    /// `%in`: like `%l`, but an empty collection renders `(NULL)`.
    In,
    /// `%v`: `(col, ...) VALUES (value, ...)` tuple.
    Values,
    /// `%m`: multi-row `(col, ...) VALUES (...), (...)`.
    MultiValues,
    /// `%by`: `ORDER BY` column list.
    OrderBy,
    /// `%and`: conditions joined with `AND`.
    And,
    /// `%or`: conditions joined with `OR`.
    Or,
    /// `%like~`, `%~like`, `%~like~`: LIKE pattern.
    Like(LikeAnchor),
}

impl Modifier {
    /// Returns the canonical code of the modifier.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Text => "s",
            Self::TextOrNull => "sn",
            Self::Binary => "bin",
            Self::Bool => "b",
            Self::Int => "i",
            Self::Unsigned => "u",
            Self::IntOrNull => "iN",
            Self::Float => "f",
            Self::Date => "d",
            Self::DateTime => "t",
            Self::Identifier => "n",
            Self::RawIdentifier => "N",
            Self::Sql => "sql",
            Self::Expand => "ex",
            Self::Assign => "a",
            Self::List => "l",
            Self::In => "in",
            Self::Values => "v",
            Self::MultiValues => "m",
            Self::OrderBy => "by",
            Self::And => "and",
            Self::Or => "or",
            Self::Like(LikeAnchor::StartsWith) => "like~",
            Self::Like(LikeAnchor::EndsWith) => "~like",
            Self::Like(LikeAnchor::Contains) => "~like~",
        }
    }
}

/// Reserved keywords that drive the translator instead of formatting a
/// value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `%if`: opens a conditional block, consuming its condition.
    If,
    /// `%else`: switches to the alternative branch.
    Else,
    /// `%end`: closes a conditional block.
    End,
    /// `%lmt`: consumes the statement limit.
    Limit,
    /// `%ofs`: consumes the statement offset.
    Offset,
}

impl Keyword {
    /// Returns the code of the keyword.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::If => "if",
            Self::Else => "else",
            Self::End => "end",
            Self::Limit => "lmt",
            Self::Offset => "ofs",
        }
    }

    /// Returns true for the conditional keywords, which are only honoured
    /// inside literal fragments.
    #[must_use]
    pub const fn is_conditional(self) -> bool {
        matches!(self, Self::If | Self::Else | Self::End)
    }
}

/// A parsed `%code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// A value modifier.
    Modifier(Modifier),
    /// A reserved keyword.
    Keyword(Keyword),
}

impl Marker {
    /// Parses a marker code (without the leading `%`).
    ///
    /// Returns `None` for unknown codes; callers turn that into an
    /// "Unknown modifier" issue.
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        let modifier = match code {
            "if" => return Some(Self::Keyword(Keyword::If)),
            "else" => return Some(Self::Keyword(Keyword::Else)),
            "end" => return Some(Self::Keyword(Keyword::End)),
            "lmt" => return Some(Self::Keyword(Keyword::Limit)),
            "ofs" => return Some(Self::Keyword(Keyword::Offset)),
            "s" => Modifier::Text,
            "sn" | "sN" => Modifier::TextOrNull,
            "bin" => Modifier::Binary,
            "b" => Modifier::Bool,
            "i" => Modifier::Int,
            "u" => Modifier::Unsigned,
            "iN" => Modifier::IntOrNull,
            "f" => Modifier::Float,
            "d" => Modifier::Date,
            "t" | "dt" => Modifier::DateTime,
            "n" => Modifier::Identifier,
            "N" => Modifier::RawIdentifier,
            "sql" | "p" => Modifier::Sql,
            "ex" => Modifier::Expand,
            "a" => Modifier::Assign,
            "l" => Modifier::List,
            "in" => Modifier::In,
            "v" => Modifier::Values,
            "m" => Modifier::MultiValues,
            "by" => Modifier::OrderBy,
            "and" => Modifier::And,
            "or" => Modifier::Or,
            "like~" => Modifier::Like(LikeAnchor::StartsWith),
            "~like" => Modifier::Like(LikeAnchor::EndsWith),
            "~like~" => Modifier::Like(LikeAnchor::Contains),
            _ => return None,
        };
        Some(Self::Modifier(modifier))
    }
}

/// Returns true if `c` may start a marker code.
pub(crate) const fn is_marker_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '~'
}

/// Returns true if `c` may continue a marker code.
pub(crate) const fn is_marker_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '~'
}

/// Longest marker code, in characters.
pub(crate) const MAX_MARKER_LEN: usize = 6;

/// Splits a mapping key into the column part and its optional modifier
/// code: `"created%t"` becomes `("created", Some("t"))`.
#[must_use]
pub fn split_key(key: &str) -> (&str, Option<&str>) {
    match key.split_once('%') {
        Some((column, code)) => (column, Some(code)),
        None => (key, None),
    }
}
