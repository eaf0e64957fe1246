//! Output assembly.
//!
//! Pieces of one token are appended verbatim. Between tokens (and around
//! removed conditional branches) the writer inserts a single space unless
//! one side already provides a natural boundary.

/// Characters after which no joining space is inserted.
const NO_SPACE_AFTER: &[char] = &['(', '=', '<', '>', '.'];

/// Characters before which no joining space is inserted.
const NO_SPACE_BEFORE: &[char] = &[')', ',', '.', ';'];

/// Builds the translated statement.
#[derive(Debug, Default)]
pub struct SqlWriter {
    buf: String,
    boundary: bool,
}

impl SqlWriter {
    /// Creates an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a token boundary; the next non-empty piece is joined with a
    /// single space.
    pub fn boundary(&mut self) {
        self.boundary = true;
    }

    /// Appends a piece.
    pub fn push(&mut self, piece: &str) {
        if piece.is_empty() {
            return;
        }
        if !self.boundary {
            self.buf.push_str(piece);
            return;
        }
        let piece = piece.trim_start();
        if piece.is_empty() {
            // a whitespace-only piece leaves the boundary open
            return;
        }
        self.boundary = false;

        let glued = self.buf.is_empty()
            || self.buf.ends_with(char::is_whitespace)
            || self.buf.ends_with(NO_SPACE_AFTER)
            || piece.starts_with(NO_SPACE_BEFORE);
        if !glued {
            self.buf.push(' ');
        }
        self.buf.push_str(piece);
    }

    /// Returns the statement with surrounding whitespace removed.
    #[must_use]
    pub fn finish(self) -> String {
        let trimmed = self.buf.trim();
        if trimmed.len() == self.buf.len() {
            self.buf
        } else {
            String::from(trimmed)
        }
    }
}
