//! # oxide-translator
//!
//! An injection-safe SQL template translator.
//!
//! A statement is written as an ordered stream of literal SQL fragments
//! interleaved with typed values. The translator scans the fragments,
//! renders every value through the modifier bound to it and asks a
//! per-database [`Engine`](engine::Engine) for all literal and identifier
//! syntax, producing one SQL string:
//!
//! ```rust
//! use oxide_translator::{args, engine::PostgresEngine, Translator, Value};
//!
//! let translator = Translator::new(PostgresEngine::new());
//! let translation = translator
//!     .translate(args![
//!         "SELECT * FROM [users] WHERE name = %s", "O'Brien",
//!         "AND role IN %in", Value::list(["admin", "owner"]),
//!     ])
//!     .unwrap();
//! assert_eq!(
//!     translation.sql,
//!     "SELECT * FROM \"users\" WHERE name = 'O''Brien' AND role IN ('admin', 'owner')"
//! );
//! ```
//!
//! ## Argument stream
//!
//! - Plain text is always SQL. Data is passed as a [`Value`] or follows a
//!   `%s` marker.
//! - `[name]` and `` `name` `` are identifiers, quoted by the engine.
//! - `'text'` and `"text"` are string literals, re-escaped by the engine.
//! - `%code` binds a [`Modifier`] to the next token; `%if`, `%else` and
//!   `%end` remove parts of the statement.
//! - `:name:` is replaced from the [`Substitutions`] table.
//! - `?` is filled with the next token.
//!
//! ## Mappings
//!
//! A mapping without modifier renders as `(cols) VALUES (vals)` when the
//! statement starts with `INSERT` or `REPLACE` and as `col = val, ...`
//! otherwise. Keys may carry a modifier suffix (`"created%d"`).
//!
//! ## Issues
//!
//! Malformed input never aborts the pass: every problem becomes a
//! [`TranslateIssue`], recorded on the [`Translation`] and marked inline as
//! `**message**`. Only engine failures are returned as errors.

pub mod calendar;
pub mod conditional;
pub mod config;
mod dispatch;
pub mod engine;
pub mod error;
pub mod modifier;
pub mod scanner;
pub mod substitution;
pub mod translator;
pub mod value;
pub mod writer;

pub use config::{EngineKind, TranslatorConfig, UnknownEngine};
pub use engine::{Engine, LikeAnchor};
pub use error::{EngineError, Result, TranslateError, TranslateIssue};
pub use modifier::{Keyword, Marker, Modifier};
pub use substitution::Substitutions;
pub use translator::{Translation, Translator};
pub use value::{Arg, SqlExpressible, Value};
