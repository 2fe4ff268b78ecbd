//! Turns a [`Source`]'s bytes into a stream of [`Token`]s.
//!
//! The scanner is a stateful byte cursor with one level of pushback (the
//! parser only ever needs to un-consume a single token to implement
//! lookahead). Whitespace and `//`/`/* */` comments are skipped but their
//! span is folded into the next token's `whitespace_first` so that
//! attribute-bearing comments remain recoverable from the token stream.

use std::rc::Rc;

use crate::{
    location::Location,
    source::Source,
    token::{Token, TokenKind},
};

#[derive(Debug)]
pub struct Scanner {
    source: Rc<Source>,
    pos: usize,
    pushed_back: Option<Token>,
}

impl Scanner {
    #[must_use]
    pub fn new(source: Rc<Source>) -> Self {
        Self {
            source,
            pos: 0,
            pushed_back: None,
        }
    }

    #[must_use]
    pub fn source(&self) -> &Rc<Source> {
        &self.source
    }

    #[must_use]
    pub fn location(&self, token: Token) -> Location {
        Location::new(Rc::clone(&self.source), token)
    }

    /// Push a single token back onto the stream; the next `get_token` call
    /// returns it again instead of scanning.
    pub fn push_token(&mut self, token: Token) {
        debug_assert!(self.pushed_back.is_none(), "scanner only supports one token of pushback");
        self.pushed_back = Some(token);
    }

    /// Scan and return the next token, advancing the cursor.
    pub fn get_token(&mut self) -> Token {
        if let Some(tok) = self.pushed_back.take() {
            return tok;
        }
        let whitespace_first = self.pos as u32;
        self.skip_whitespace_and_comments();
        let first = self.pos;
        let bytes = self.source.bytes();

        if first >= bytes.len() {
            return Token::new(whitespace_first, first as u32, first as u32, TokenKind::EndOfSource);
        }

        let b = bytes[first];
        if b.is_ascii_alphabetic() || b == b'_' {
            self.scan_identifier(whitespace_first, first)
        } else if b.is_ascii_digit() {
            self.scan_numeral(whitespace_first, first)
        } else if b == b'"' {
            self.scan_string(whitespace_first, first)
        } else if b.is_ascii() {
            self.scan_punctuation(whitespace_first, first)
        } else {
            self.scan_utf8_or_bad(whitespace_first, first)
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        let bytes = self.source.bytes();
        loop {
            while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            if self.pos + 1 < bytes.len() && bytes[self.pos] == b'/' && bytes[self.pos + 1] == b'/' {
                while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
                    self.pos += 1;
                }
                continue;
            }
            if self.pos + 1 < bytes.len() && bytes[self.pos] == b'/' && bytes[self.pos + 1] == b'*' {
                self.pos += 2;
                while self.pos + 1 < bytes.len() && !(bytes[self.pos] == b'*' && bytes[self.pos + 1] == b'/') {
                    self.pos += 1;
                }
                self.pos = (self.pos + 2).min(bytes.len());
                continue;
            }
            break;
        }
    }

    fn scan_identifier(&mut self, whitespace_first: usize, first: usize) -> Token {
        let bytes = self.source.bytes();
        let mut last = first;
        while last < bytes.len() && (bytes[last].is_ascii_alphanumeric() || bytes[last] == b'_') {
            last += 1;
        }
        self.pos = last;
        Token::new(whitespace_first as u32, first as u32, last as u32, TokenKind::Identifier)
    }

    fn scan_numeral(&mut self, whitespace_first: usize, first: usize) -> Token {
        let bytes = self.source.bytes();
        let mut last = first;
        while last < bytes.len() && bytes[last].is_ascii_digit() {
            last += 1;
        }
        if last < bytes.len() && bytes[last] == b'.' && last + 1 < bytes.len() && bytes[last + 1].is_ascii_digit() {
            last += 1;
            while last < bytes.len() && bytes[last].is_ascii_digit() {
                last += 1;
            }
        }
        if last < bytes.len() && (bytes[last] == b'e' || bytes[last] == b'E') {
            let mut e_end = last + 1;
            if e_end < bytes.len() && (bytes[e_end] == b'+' || bytes[e_end] == b'-') {
                e_end += 1;
            }
            if e_end < bytes.len() && bytes[e_end].is_ascii_digit() {
                while e_end < bytes.len() && bytes[e_end].is_ascii_digit() {
                    e_end += 1;
                }
                last = e_end;
            }
        }
        self.pos = last;
        Token::new(whitespace_first as u32, first as u32, last as u32, TokenKind::Numeral)
    }

    /// Scans a `"..."` literal. Interpolation (`$ident`, `${expr}`) inside
    /// the string is left for the parser to split out of the raw text; the
    /// scanner's job is only to find the closing quote, honouring `\"`.
    fn scan_string(&mut self, whitespace_first: usize, first: usize) -> Token {
        let bytes = self.source.bytes();
        let mut i = first + 1;
        while i < bytes.len() && bytes[i] != b'"' {
            if bytes[i] == b'\\' && i + 1 < bytes.len() {
                i += 2;
            } else {
                i += 1;
            }
        }
        let last = (i + 1).min(bytes.len());
        self.pos = last;
        Token::new(whitespace_first as u32, first as u32, last as u32, TokenKind::StringSegment)
    }

    fn scan_punctuation(&mut self, whitespace_first: usize, first: usize) -> Token {
        const TWO_CHAR: &[&str] = &["->", "=>", "<=", ">=", "==", "!=", ".."];
        let bytes = self.source.bytes();
        for op in TWO_CHAR {
            let op_bytes = op.as_bytes();
            if bytes[first..].starts_with(op_bytes) {
                self.pos = first + op_bytes.len();
                return Token::new(whitespace_first as u32, first as u32, self.pos as u32, TokenKind::Punctuation);
            }
        }
        self.pos = first + 1;
        Token::new(whitespace_first as u32, first as u32, self.pos as u32, TokenKind::Punctuation)
    }

    fn scan_utf8_or_bad(&mut self, whitespace_first: usize, first: usize) -> Token {
        let bytes = self.source.bytes();
        match std::str::from_utf8(&bytes[first..]) {
            Ok(s) => {
                let ch_len = s.chars().next().map_or(1, char::len_utf8);
                self.pos = first + ch_len;
                Token::new(whitespace_first as u32, first as u32, self.pos as u32, TokenKind::BadToken)
            }
            Err(_) => {
                self.pos = first + 1;
                Token::new(whitespace_first as u32, first as u32, self.pos as u32, TokenKind::BadUtf8)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SourceKind;

    fn tokens(src: &str) -> Vec<(TokenKind, String)> {
        let source = Source::new("t.curv", src, SourceKind::Curv);
        let mut scanner = Scanner::new(source);
        let mut out = Vec::new();
        loop {
            let tok = scanner.get_token();
            if tok.is_end() {
                break;
            }
            let text = scanner.source.text_lossy()[tok.range()].to_owned();
            out.push((tok.kind, text));
        }
        out
    }

    #[test]
    fn scans_identifiers_and_numbers() {
        let toks = tokens("let x=1 in x+2*3");
        assert_eq!(toks[0], (TokenKind::Identifier, "let".into()));
        assert_eq!(toks[1], (TokenKind::Identifier, "x".into()));
        assert_eq!(toks[2], (TokenKind::Punctuation, "=".into()));
        assert_eq!(toks[3], (TokenKind::Numeral, "1".into()));
    }

    #[test]
    fn skips_line_and_block_comments() {
        let toks = tokens("1 // comment\n + /* block */ 2");
        assert_eq!(toks.len(), 3);
        assert_eq!(toks[1].1, "+");
        assert_eq!(toks[2].1, "2");
    }

    #[test]
    fn scans_string_literal_honouring_escapes() {
        let toks = tokens(r#""a\"b""#);
        assert_eq!(toks.len(), 1);
        assert_eq!(toks[0].0, TokenKind::StringSegment);
    }

    #[test]
    fn pushback_returns_same_token_once() {
        let source = Source::new("t.curv", "a b", SourceKind::Curv);
        let mut scanner = Scanner::new(source);
        let a = scanner.get_token();
        let b = scanner.get_token();
        scanner.push_token(b);
        let b_again = scanner.get_token();
        assert_eq!(b, b_again);
        assert_ne!(a, b);
    }
}
