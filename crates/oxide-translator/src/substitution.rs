//! Substitution table for `:name:` placeholders.
//!
//! Substitutions are resolved before identifier quoting, which makes them
//! suitable for table prefixes and schema names:
//!
//! ```rust
//! use oxide_translator::Substitutions;
//!
//! let mut subs = Substitutions::new();
//! subs.set("blog", "wp_");
//! assert_eq!(subs.substitute(":blog:posts").unwrap(), "wp_posts");
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::TranslateIssue;

/// Resolver consulted for names without a table entry.
pub type Fallback = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Mapping of substitution names to replacement text.
#[derive(Clone, Default)]
pub struct Substitutions {
    entries: HashMap<String, String>,
    fallback: Option<Fallback>,
}

impl Substitutions {
    /// Creates an empty table without a fallback.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an entry.
    pub fn set(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(name.into(), text.into());
    }

    /// Removes an entry, returning its text.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    /// Installs the resolver used for names without an entry.
    pub fn set_fallback<F>(&mut self, fallback: F)
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(fallback));
    }

    /// Removes the fallback resolver.
    pub fn clear_fallback(&mut self) {
        self.fallback = None;
    }

    /// Returns the number of direct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no direct entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves one name: the direct entry wins, then the fallback.
    ///
    /// # Errors
    ///
    /// Returns [`TranslateIssue::UnresolvedSubstitution`] when neither
    /// produces a text.
    pub fn resolve(&self, name: &str) -> Result<String, TranslateIssue> {
        if let Some(text) = self.entries.get(name) {
            return Ok(text.clone());
        }
        self.fallback
            .as_ref()
            .and_then(|fallback| fallback(name))
            .ok_or_else(|| TranslateIssue::UnresolvedSubstitution(String::from(name)))
    }

    /// Replaces every `:name:` in `text`.
    ///
    /// Colons that do not enclose a name (e.g. `::` casts) are kept.
    ///
    /// # Errors
    ///
    /// Returns the first unresolved name.
    pub fn substitute(&self, text: &str) -> Result<String, TranslateIssue> {
        if !text.contains(':') {
            return Ok(String::from(text));
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(pos) = rest.find(':') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            match name_len(after) {
                Some(len) => {
                    out.push_str(&self.resolve(&after[..len])?);
                    rest = &after[len + 1..];
                }
                None => {
                    out.push(':');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl fmt::Debug for Substitutions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substitutions")
            .field("entries", &self.entries)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Returns true for characters allowed in a substitution name.
pub(crate) const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Given the text right after an opening `:`, returns the length of a
/// non-empty name that is directly followed by the closing `:`.
pub(crate) fn name_len(after_colon: &str) -> Option<usize> {
    let len = after_colon
        .find(|c: char| !is_name_char(c))
        .unwrap_or(after_colon.len());
    (len > 0 && after_colon[len..].starts_with(':')).then_some(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_remove() {
        let mut subs = Substitutions::new();
        assert!(subs.is_empty());
        subs.set("p", "app_");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs.resolve("p").unwrap(), "app_");
        assert_eq!(subs.remove("p"), Some(String::from("app_")));
        assert_eq!(
            subs.resolve("p"),
            Err(TranslateIssue::UnresolvedSubstitution(String::from("p")))
        );
    }

    #[test]
    fn test_fallback_used_only_without_entry() {
        let mut subs = Substitutions::new();
        subs.set("known", "k_");
        subs.set_fallback(|name| Some(format!("{name}_")));
        assert_eq!(subs.resolve("known").unwrap(), "k_");
        assert_eq!(subs.resolve("other").unwrap(), "other_");
        subs.clear_fallback();
        assert!(subs.resolve("other").is_err());
    }

    #[test]
    fn test_fallback_may_decline() {
        let mut subs = Substitutions::new();
        subs.set_fallback(|name| (name == "yes").then(|| String::from("Y")));
        assert_eq!(subs.resolve("yes").unwrap(), "Y");
        assert!(subs.resolve("no").is_err());
    }

    #[test]
    fn test_substitute_many() {
        let mut subs = Substitutions::new();
        subs.set("schema", "public");
        subs.set("p", "wp_");
        assert_eq!(
            subs.substitute(":schema:.:p:posts").unwrap(),
            "public.wp_posts"
        );
    }

    #[test]
    fn test_substitute_keeps_other_colons() {
        let subs = Substitutions::new();
        assert_eq!(subs.substitute("a::int").unwrap(), "a::int");
        assert_eq!(subs.substitute("x: y").unwrap(), "x: y");
        assert_eq!(subs.substitute("trailing:").unwrap(), "trailing:");
    }

    #[test]
    fn test_substitute_unresolved() {
        let subs = Substitutions::new();
        assert_eq!(
            subs.substitute(":missing:table"),
            Err(TranslateIssue::UnresolvedSubstitution(String::from(
                "missing"
            )))
        );
    }

    #[test]
    fn test_name_len() {
        assert_eq!(name_len("abc:rest"), Some(3));
        assert_eq!(name_len(":rest"), None);
        assert_eq!(name_len("abc rest"), None);
        assert_eq!(name_len("abc"), None);
    }
}
