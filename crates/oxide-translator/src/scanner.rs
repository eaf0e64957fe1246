//! Lexical scanner for literal SQL fragments.
//!
//! The scanner copies SQL text verbatim up to the next special character
//! and then switches into the mode that character selects:
//!
//! | character          | mode            | produces                      |
//! |--------------------|-----------------|-------------------------------|
//! | `` ` ``            | backtick        | [`Lexeme::Identifier`]        |
//! | `[`                | bracket         | [`Lexeme::Identifier`]        |
//! | `'`                | single quote    | [`Lexeme::String`]            |
//! | `"`                | double quote    | [`Lexeme::String`]            |
//! | `%` + letter/`~`   | marker          | [`Lexeme::Marker`]            |
//! | `:name:`           | substitution    | [`Lexeme::Substitution`]      |
//! | `?`                | placeholder     | [`Lexeme::Placeholder`]       |
//!
//! Inside a quoted region a doubled quote character stands for one literal
//! quote. The scanner never fails: malformed input yields error lexemes and
//! scanning continues right after the offending character.

use std::borrow::Cow;

use crate::modifier::{MAX_MARKER_LEN, is_marker_char, is_marker_start};
use crate::substitution::{is_name_char, name_len};

/// One piece of a scanned fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme<'a> {
    /// SQL text copied verbatim.
    Text(&'a str),
    /// Contents of a backtick or bracket identifier.
    Identifier(&'a str),
    /// Contents of a quoted string, with doubled quotes collapsed.
    String(Cow<'a, str>),
    /// A quote character with no closing partner.
    AloneQuote,
    /// A backtick or bracket with no closing partner.
    UnterminatedIdentifier,
    /// A `:name:` substitution.
    Substitution {
        /// The name between the colons.
        name: &'a str,
        /// True when an identifier character directly follows, i.e. the
        /// replacement is a prefix of a longer name.
        prefix: bool,
    },
    /// A `%code` marker (code without `%`).
    Marker(&'a str),
    /// A `?` placeholder.
    Placeholder,
}

/// Scanning mode selected by the character at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Normal,
    Backtick,
    Bracket,
    SingleQuote,
    DoubleQuote,
    Marker,
    Substitution,
    Placeholder,
}

/// A scanner over one literal fragment.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    markers: bool,
    placeholders: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner that recognizes markers and placeholders.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            markers: true,
            placeholders: true,
        }
    }

    /// Creates a scanner for raw SQL values (`%sql`): only quoting,
    /// identifiers and substitutions are processed, `%` and `?` are text.
    #[must_use]
    pub const fn raw(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            markers: false,
            placeholders: false,
        }
    }

    /// Enables or disables `?` placeholders.
    #[must_use]
    pub const fn placeholders(mut self, enabled: bool) -> Self {
        self.placeholders = enabled;
        self
    }

    /// Returns the character at the current position.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the character before the current position.
    fn prev(&self) -> Option<char> {
        self.input[..self.pos].chars().next_back()
    }

    /// Decides which mode the character at the current position opens.
    fn mode_at(&self, c: char) -> Mode {
        let after = &self.input[self.pos + c.len_utf8()..];
        match c {
            '`' => Mode::Backtick,
            '[' => Mode::Bracket,
            '\'' => Mode::SingleQuote,
            '"' => Mode::DoubleQuote,
            '%' if self.markers && after.chars().next().is_some_and(is_marker_start) => {
                Mode::Marker
            }
            ':' if self.prev() != Some(':') && is_substitution(after) => Mode::Substitution,
            '?' if self.placeholders => Mode::Placeholder,
            _ => Mode::Normal,
        }
    }

    /// Scans an identifier closed by `close`.
    fn scan_identifier(&mut self, close: char) -> Lexeme<'a> {
        let content_start = self.pos + 1;
        match self.input[content_start..].find(close) {
            Some(0) => {
                // an empty pair is not an identifier
                let end = content_start + close.len_utf8();
                let text = &self.input[self.pos..end];
                self.pos = end;
                Lexeme::Text(text)
            }
            Some(len) => {
                self.pos = content_start + len + close.len_utf8();
                Lexeme::Identifier(&self.input[content_start..content_start + len])
            }
            None => {
                self.pos = content_start;
                Lexeme::UnterminatedIdentifier
            }
        }
    }

    /// Scans a string literal quoted with `quote`.
    fn scan_string(&mut self, quote: char) -> Lexeme<'a> {
        let input = self.input;
        let content_start = self.pos + 1;
        let mut chars = input[content_start..].char_indices().peekable();
        let mut doubled = false;

        while let Some((offset, c)) = chars.next() {
            if c != quote {
                continue;
            }
            // Check for escaped quote (doubled)
            if chars.peek().is_some_and(|&(_, next)| next == quote) {
                chars.next();
                doubled = true;
                continue;
            }
            let content = &input[content_start..content_start + offset];
            self.pos = content_start + offset + 1;
            return Lexeme::String(if doubled {
                let single = quote.to_string();
                Cow::Owned(content.replace(&format!("{quote}{quote}"), &single))
            } else {
                Cow::Borrowed(content)
            });
        }

        self.pos = content_start;
        Lexeme::AloneQuote
    }

    /// Scans a `%code` marker.
    fn scan_marker(&mut self) -> Lexeme<'a> {
        let code_start = self.pos + 1;
        let len = self.input[code_start..]
            .chars()
            .take(MAX_MARKER_LEN)
            .take_while(|&c| is_marker_char(c))
            .count();
        // marker characters are ASCII, so chars == bytes
        self.pos = code_start + len;
        Lexeme::Marker(&self.input[code_start..self.pos])
    }

    /// Scans a `:name:` substitution.
    fn scan_substitution(&mut self) -> Lexeme<'a> {
        let name_start = self.pos + 1;
        let len = name_len(&self.input[name_start..]).unwrap_or(0);
        self.pos = name_start + len + 1;
        let prefix = self
            .peek()
            .is_some_and(|c| is_name_char(c) || c == '.');
        Lexeme::Substitution {
            name: &self.input[name_start..name_start + len],
            prefix,
        }
    }

    /// Returns true once the whole fragment has been scanned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Consumes an `%if` directly following an `%else` (with optional
    /// whitespace in between), turning it into an "else if".
    pub fn take_else_if(&mut self) -> bool {
        let rest = &self.input[self.pos..];
        let trimmed = rest.trim_start();
        let Some(after) = trimmed.strip_prefix("%if") else {
            return false;
        };
        if after.chars().next().is_some_and(is_marker_char) {
            return false;
        }
        self.pos += rest.len() - after.len();
        true
    }
}

impl<'a> Iterator for Scanner<'a> {
    type Item = Lexeme<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            let mode = self.mode_at(c);
            if mode == Mode::Normal {
                self.pos += c.len_utf8();
                continue;
            }
            if self.pos > start {
                return Some(Lexeme::Text(&self.input[start..self.pos]));
            }
            return Some(match mode {
                Mode::Backtick => self.scan_identifier('`'),
                Mode::Bracket => self.scan_identifier(']'),
                Mode::SingleQuote => self.scan_string('\''),
                Mode::DoubleQuote => self.scan_string('"'),
                Mode::Marker => self.scan_marker(),
                Mode::Substitution => self.scan_substitution(),
                Mode::Placeholder => {
                    self.pos += 1;
                    Lexeme::Placeholder
                }
                Mode::Normal => unreachable!("normal characters are copied above"),
            });
        }
        (self.pos > start).then(|| Lexeme::Text(&self.input[start..self.pos]))
    }
}

/// Returns true if `after` (the text right after a `:`) holds `name:` that
/// is not the start of a `::` cast.
fn is_substitution(after: &str) -> bool {
    name_len(after).is_some_and(|len| !after[len + 1..].starts_with(':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(input: &str) -> Vec<Lexeme<'_>> {
        Scanner::new(input).collect()
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(
            lex("SELECT * FROM t"),
            vec![Lexeme::Text("SELECT * FROM t")]
        );
        assert!(lex("").is_empty());
    }

    #[test]
    fn test_identifiers() {
        assert_eq!(
            lex("SELECT [id], `name` FROM t"),
            vec![
                Lexeme::Text("SELECT "),
                Lexeme::Identifier("id"),
                Lexeme::Text(", "),
                Lexeme::Identifier("name"),
                Lexeme::Text(" FROM t"),
            ]
        );
    }

    #[test]
    fn test_empty_brackets_are_text() {
        assert_eq!(lex("a[]"), vec![Lexeme::Text("a"), Lexeme::Text("[]")]);
    }

    #[test]
    fn test_unterminated_identifier() {
        assert_eq!(
            lex("a [b"),
            vec![
                Lexeme::Text("a "),
                Lexeme::UnterminatedIdentifier,
                Lexeme::Text("b"),
            ]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            lex("x = 'it''s' OR y = \"q\""),
            vec![
                Lexeme::Text("x = "),
                Lexeme::String(Cow::Owned(String::from("it's"))),
                Lexeme::Text(" OR y = "),
                Lexeme::String(Cow::Borrowed("q")),
            ]
        );
    }

    #[test]
    fn test_special_characters_inside_strings() {
        assert_eq!(
            lex("'50% [off] :x: ?'"),
            vec![Lexeme::String(Cow::Borrowed("50% [off] :x: ?"))]
        );
    }

    #[test]
    fn test_alone_quote() {
        assert_eq!(
            lex("a = 'b"),
            vec![Lexeme::Text("a = "), Lexeme::AloneQuote, Lexeme::Text("b")]
        );
    }

    #[test]
    fn test_markers() {
        assert_eq!(
            lex("id = %i AND name = %s"),
            vec![
                Lexeme::Text("id = "),
                Lexeme::Marker("i"),
                Lexeme::Text(" AND name = "),
                Lexeme::Marker("s"),
            ]
        );
        assert_eq!(lex("%~like~"), vec![Lexeme::Marker("~like~")]);
    }

    #[test]
    fn test_marker_length_is_bounded() {
        assert_eq!(
            lex("%abcdefgh"),
            vec![Lexeme::Marker("abcdef"), Lexeme::Text("gh")]
        );
    }

    #[test]
    fn test_modulo_is_text() {
        assert_eq!(lex("a % 2"), vec![Lexeme::Text("a % 2")]);
    }

    #[test]
    fn test_substitutions() {
        assert_eq!(
            lex("FROM :p:users WHERE x = :val:"),
            vec![
                Lexeme::Text("FROM "),
                Lexeme::Substitution {
                    name: "p",
                    prefix: true,
                },
                Lexeme::Text("users WHERE x = "),
                Lexeme::Substitution {
                    name: "val",
                    prefix: false,
                },
            ]
        );
    }

    #[test]
    fn test_casts_are_not_substitutions() {
        assert_eq!(lex("a::int"), vec![Lexeme::Text("a::int")]);
        assert_eq!(lex("a::int::text"), vec![Lexeme::Text("a::int::text")]);
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(
            lex("a = ? AND b = ?"),
            vec![
                Lexeme::Text("a = "),
                Lexeme::Placeholder,
                Lexeme::Text(" AND b = "),
                Lexeme::Placeholder,
            ]
        );
        assert_eq!(
            Scanner::new("a = ?").placeholders(false).collect::<Vec<_>>(),
            vec![Lexeme::Text("a = ?")]
        );
    }

    #[test]
    fn test_raw_mode_ignores_markers() {
        assert_eq!(
            Scanner::raw("x % y = ? AND %s [c]").collect::<Vec<_>>(),
            vec![Lexeme::Text("x % y = ? AND %s "), Lexeme::Identifier("c")]
        );
    }

    #[test]
    fn test_take_else_if() {
        let mut scanner = Scanner::new("%else %if rest");
        assert_eq!(scanner.next(), Some(Lexeme::Marker("else")));
        assert!(scanner.take_else_if());
        assert_eq!(scanner.next(), Some(Lexeme::Text(" rest")));

        assert!(scanner.is_finished());

        let mut scanner = Scanner::new("%else %iN");
        scanner.next();
        assert!(!scanner.take_else_if());
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(
            lex("naïve = 'café'"),
            vec![
                Lexeme::Text("naïve = "),
                Lexeme::String(Cow::Borrowed("café")),
            ]
        );
    }
}
