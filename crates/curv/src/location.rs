//! Source locations and the pretty-printing of diagnostics.
//!
//! A [`Location`] pairs a [`Source`] with a [`Token`] span inside it. Line
//! numbers are never cached on the token (per `curv/location.cc`): they are
//! recomputed by scanning for `\n` bytes only when a diagnostic is actually
//! printed, so the hot compile path pays nothing for error reporting it
//! never needs.

use std::rc::Rc;

use crate::{
    source::Source,
    token::{Token, TokenKind},
};

/// The place an error occurred: a source file plus a character range within
/// it, spanning either a single token or a whole parse-tree node.
#[derive(Debug, Clone)]
pub struct Location {
    source: Rc<Source>,
    token: Token,
}

impl Location {
    #[must_use]
    pub fn new(source: Rc<Source>, token: Token) -> Self {
        Self { source, token }
    }

    #[must_use]
    pub fn source(&self) -> &Rc<Source> {
        &self.source
    }

    #[must_use]
    pub fn token(&self) -> Token {
        self.token
    }

    /// Widen this location so it starts at `tok` instead, used to grow a
    /// sub-phrase's span to cover a leading keyword/punctuation token.
    #[must_use]
    pub fn starting_at(&self, tok: Token) -> Self {
        let mut loc = self.clone();
        loc.token.whitespace_first = tok.whitespace_first;
        loc.token.first = tok.first;
        loc.token.kind = TokenKind::PhraseSpan;
        loc
    }

    /// Widen this location so it ends at `tok` instead.
    #[must_use]
    pub fn ending_at(&self, tok: Token) -> Self {
        let mut loc = self.clone();
        loc.token.last = tok.last;
        loc.token.kind = TokenKind::PhraseSpan;
        loc
    }

    #[must_use]
    pub fn scriptname(&self) -> &str {
        self.source.name()
    }

    /// 1-based line number of the start of this location's token, computed
    /// by scanning the source for newlines.
    #[must_use]
    pub fn lineno(&self) -> usize {
        let bytes = self.source.bytes();
        let first = self.token.first as usize;
        1 + bytes[..first.min(bytes.len())].iter().filter(|&&b| b == b'\n').count()
    }

    /// The text this location spans.
    #[must_use]
    pub fn text(&self) -> &str {
        let bytes = self.source.bytes();
        let range = self.token.range();
        let range = range.start.min(bytes.len())..range.end.min(bytes.len());
        std::str::from_utf8(&bytes[range]).unwrap_or("")
    }

    /// Render the location part of a diagnostic, with no trailing newline.
    /// Example: `file foo.curv, line 3, token x+1`.
    pub fn write(&self, out: &mut impl std::fmt::Write) -> std::fmt::Result {
        write!(out, "file {}, line {}", self.scriptname(), self.lineno())?;
        if self.token.kind == TokenKind::EndOfSource {
            write!(out, ", at end of source")
        } else {
            write!(out, ", token {}", self.text())
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = String::new();
        self.write(&mut s).ok();
        f.write_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;

    #[test]
    fn lineno_counts_preceding_newlines() {
        let src = Source::new("t.curv", "a\nb\nc", SourceKind::Curv);
        let tok = Token::new(4, 4, 5, TokenKind::Identifier);
        let loc = Location::new(src, tok);
        assert_eq!(loc.lineno(), 3);
        assert_eq!(loc.text(), "c");
    }

    #[test]
    fn starting_at_widens_span_left() {
        let src = Source::new("t.curv", "if (a) b else c", SourceKind::Curv);
        let tok_else = Token::new(6, 6, 7, TokenKind::Identifier); // "b"
        let tok_if = Token::new(0, 0, 2, TokenKind::Identifier); // "if"
        let loc = Location::new(src, tok_else).starting_at(tok_if);
        assert_eq!(loc.text(), "if (a) b");
    }
}
