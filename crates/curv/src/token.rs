//! Lexical tokens: byte-offset ranges into a [`Source`](crate::source::Source).
//!
//! Ported from the shape described in `curv/token.h`: a token never copies
//! out of the source buffer, and it remembers the offset of preceding
//! whitespace/comments so attribute-bearing comments can still be recovered.

/// Kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Numeral,
    /// One segment of a (possibly interpolated) string literal.
    StringSegment,
    Punctuation,
    /// The zero-length token at the end of a source.
    EndOfSource,
    /// A malformed token (e.g. a stray `#`).
    BadToken,
    /// A byte sequence that is not valid UTF-8.
    BadUtf8,
    /// Synthetic: the span of a parse-tree node, used by [`crate::location::Location`]
    /// widening rather than produced by the scanner directly.
    PhraseSpan,
}

/// A lexeme, or the span of a parse-tree node.
///
/// `whitespace_first..first` is the preceding whitespace/comment range;
/// `first..last` is the token itself. Offsets are `u32`, matching the
/// original's choice to save space over pointers/`usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub whitespace_first: u32,
    pub first: u32,
    pub last: u32,
    pub kind: TokenKind,
}

impl Token {
    #[must_use]
    pub fn new(whitespace_first: u32, first: u32, last: u32, kind: TokenKind) -> Self {
        Self {
            whitespace_first,
            first,
            last,
            kind,
        }
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::EndOfSource
    }

    /// Byte range of the token text itself (excludes leading whitespace).
    #[must_use]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.first as usize..self.last as usize
    }
}
