//! A hand-written Pratt/recursive-descent parser turning a token stream into
//! a [`Phrase`] tree.
//!
//! Curv has no existing Rust parser crate to lean on, so unlike most of this
//! workspace's ambient plumbing, the grammar here is built from scratch
//! against the precedence table and keyword forms the language core lays
//! out. Binding powers follow (loosest to tightest): `;`, `,`, `->`, `=>`,
//! `:`, `||`, `&&`, relational, `..`, `+ -`, `* /`, `^`, unary `- + !`,
//! postfix call/index/`.`.

use std::rc::Rc;

use crate::{
    error::{CurvError, Result},
    location::Location,
    phrase::{BinaryOp, DefinitionGroup, Phrase, UnaryOp},
    scanner::Scanner,
    source::Source,
    token::{Token, TokenKind},
};

pub struct Parser {
    scanner: Scanner,
}

/// Parse a whole program: `source` becomes a [`Phrase::Program`] wrapping a
/// single top-level phrase (normally a semicolon-sequence of definitions).
pub fn parse_program(source: Rc<Source>) -> Result<Phrase> {
    let mut parser = Parser::new(source);
    let body = parser.parse_semicolon_seq()?;
    let tok = parser.scanner.get_token();
    if !tok.is_end() {
        return Err(parser.error_at(tok, "expected end of source"));
    }
    let loc = body.location().clone();
    Ok(Phrase::Program {
        body: Box::new(body),
        loc,
    })
}

impl Parser {
    fn new(source: Rc<Source>) -> Self {
        Self {
            scanner: Scanner::new(source),
        }
    }

    fn error_at(&self, tok: Token, msg: impl Into<String>) -> CurvError {
        CurvError::syntax(self.scanner.location(tok), msg.into())
    }

    fn loc(&self, tok: Token) -> Location {
        self.scanner.location(tok)
    }

    fn peek_text(&self, tok: Token) -> std::borrow::Cow<'_, str> {
        self.scanner.source().text_lossy()[tok.range()].into()
    }

    fn is_punct(&self, tok: Token, s: &str) -> bool {
        tok.kind == TokenKind::Punctuation && self.peek_text(tok) == s
    }

    fn is_keyword(&self, tok: Token, s: &str) -> bool {
        tok.kind == TokenKind::Identifier && self.peek_text(tok) == s
    }

    fn next(&mut self) -> Token {
        self.scanner.get_token()
    }

    fn push(&mut self, tok: Token) {
        self.scanner.push_token(tok);
    }

    /// `a; b; c` — the loosest binding form, used at program/block top level
    /// and inside `do`.
    fn parse_semicolon_seq(&mut self) -> Result<Phrase> {
        let first = self.parse_comma_seq()?;
        let start_loc = first.location().clone();
        let mut items = vec![first];
        loop {
            let tok = self.next();
            if self.is_punct(tok, ";") {
                items.push(self.parse_comma_seq()?);
            } else {
                self.push(tok);
                break;
            }
        }
        if items.len() == 1 {
            return Ok(items.pop().unwrap());
        }
        let end_loc = items.last().unwrap().location().clone();
        Ok(Phrase::Semicolon {
            items,
            loc: start_loc.ending_at(end_loc.token()),
        })
    }

    /// `a, b, c` — builds list/tuple syntax.
    fn parse_comma_seq(&mut self) -> Result<Phrase> {
        let first = self.parse_arrow()?;
        let start_loc = first.location().clone();
        let mut items = vec![first];
        loop {
            let tok = self.next();
            if self.is_punct(tok, ",") {
                items.push(self.parse_arrow()?);
            } else {
                self.push(tok);
                break;
            }
        }
        if items.len() == 1 {
            return Ok(items.pop().unwrap());
        }
        let end_loc = items.last().unwrap().location().clone();
        Ok(Phrase::Comma {
            items,
            loc: start_loc.ending_at(end_loc.token()),
        })
    }

    /// `pattern -> body`, right-associative, binds looser than `=>`/`:`.
    fn parse_arrow(&mut self) -> Result<Phrase> {
        let lhs = self.parse_match_arm()?;
        let tok = self.next();
        if self.is_punct(tok, "->") {
            let body = self.parse_arrow()?;
            let loc = lhs.location().clone().ending_at(body.location().token());
            return Ok(Phrase::Lambda {
                pattern: Box::new(lhs),
                body: Box::new(body),
                loc,
            });
        }
        self.push(tok);
        Ok(lhs)
    }

    /// `a => b`, a piecewise-function match arm.
    fn parse_match_arm(&mut self) -> Result<Phrase> {
        let lhs = self.parse_field()?;
        let tok = self.next();
        if self.is_punct(tok, "=>") {
            let rhs = self.parse_field()?;
            let loc = lhs.location().clone().ending_at(rhs.location().token());
            return Ok(Phrase::Binary {
                op: BinaryOp::MatchArm,
                left: Box::new(lhs),
                right: Box::new(rhs),
                loc,
            });
        }
        self.push(tok);
        Ok(lhs)
    }

    /// `name : value`, a record field; also doubles as a type annotation
    /// separator is handled separately via `::`.
    fn parse_field(&mut self) -> Result<Phrase> {
        let lhs = self.parse_or()?;
        let tok = self.next();
        if self.is_punct(tok, ":") {
            let rhs = self.parse_or()?;
            let loc = lhs.location().clone().ending_at(rhs.location().token());
            return Ok(Phrase::Binary {
                op: BinaryOp::Field,
                left: Box::new(lhs),
                right: Box::new(rhs),
                loc,
            });
        }
        self.push(tok);
        Ok(lhs)
    }

    fn parse_or(&mut self) -> Result<Phrase> {
        let mut lhs = self.parse_and()?;
        loop {
            let tok = self.next();
            if self.is_keyword(tok, "||") || self.is_punct(tok, "||") {
                let rhs = self.parse_and()?;
                let loc = lhs.location().clone().ending_at(rhs.location().token());
                lhs = Phrase::Binary {
                    op: BinaryOp::Or,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                    loc,
                };
            } else {
                self.push(tok);
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Phrase> {
        let mut lhs = self.parse_relational()?;
        loop {
            let tok = self.next();
            if self.is_punct(tok, "&&") {
                let rhs = self.parse_relational()?;
                let loc = lhs.location().clone().ending_at(rhs.location().token());
                lhs = Phrase::Binary {
                    op: BinaryOp::And,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                    loc,
                };
            } else {
                self.push(tok);
                break;
            }
        }
        Ok(lhs)
    }

    fn parse_relational(&mut self) -> Result<Phrase> {
        let lhs = self.parse_range()?;
        let tok = self.next();
        let op = if self.is_punct(tok, "==") {
            Some(BinaryOp::Eq)
        } else if self.is_punct(tok, "!=") {
            Some(BinaryOp::Neq)
        } else if self.is_punct(tok, "<=") {
            Some(BinaryOp::Le)
        } else if self.is_punct(tok, ">=") {
            Some(BinaryOp::Ge)
        } else if self.is_punct(tok, "<") {
            Some(BinaryOp::Lt)
        } else if self.is_punct(tok, ">") {
            Some(BinaryOp::Gt)
        } else {
            None
        };
        if let Some(op) = op {
            let rhs = self.parse_range()?;
            let loc = lhs.location().clone().ending_at(rhs.location().token());
            return Ok(Phrase::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                loc,
            });
        }
        self.push(tok);
        Ok(lhs)
    }

    fn parse_range(&mut self) -> Result<Phrase> {
        let lhs = self.parse_additive()?;
        let tok = self.next();
        if self.is_punct(tok, "..") {
            let rhs = self.parse_additive()?;
            let loc = lhs.location().clone().ending_at(rhs.location().token());
            return Ok(Phrase::Binary {
                op: BinaryOp::Range,
                left: Box::new(lhs),
                right: Box::new(rhs),
                loc,
            });
        }
        self.push(tok);
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Phrase> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let tok = self.next();
            let op = if self.is_punct(tok, "+") {
                Some(BinaryOp::Add)
            } else if self.is_punct(tok, "-") {
                Some(BinaryOp::Sub)
            } else {
                None
            };
            let Some(op) = op else {
                self.push(tok);
                break;
            };
            let rhs = self.parse_multiplicative()?;
            let loc = lhs.location().clone().ending_at(rhs.location().token());
            lhs = Phrase::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                loc,
            };
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Phrase> {
        let mut lhs = self.parse_power()?;
        loop {
            let tok = self.next();
            let op = if self.is_punct(tok, "*") {
                Some(BinaryOp::Mul)
            } else if self.is_punct(tok, "/") {
                Some(BinaryOp::Div)
            } else {
                None
            };
            let Some(op) = op else {
                self.push(tok);
                break;
            };
            let rhs = self.parse_power()?;
            let loc = lhs.location().clone().ending_at(rhs.location().token());
            lhs = Phrase::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
                loc,
            };
        }
        Ok(lhs)
    }

    /// `^` is right-associative: `2^3^2 == 2^(3^2)`.
    fn parse_power(&mut self) -> Result<Phrase> {
        let lhs = self.parse_unary()?;
        let tok = self.next();
        if self.is_punct(tok, "^") {
            let rhs = self.parse_power()?;
            let loc = lhs.location().clone().ending_at(rhs.location().token());
            return Ok(Phrase::Binary {
                op: BinaryOp::Pow,
                left: Box::new(lhs),
                right: Box::new(rhs),
                loc,
            });
        }
        self.push(tok);
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Phrase> {
        let tok = self.next();
        let op = if self.is_punct(tok, "-") {
            Some(UnaryOp::Negate)
        } else if self.is_punct(tok, "+") {
            Some(UnaryOp::Plus)
        } else if self.is_punct(tok, "!") {
            Some(UnaryOp::Not)
        } else {
            None
        };
        let Some(op) = op else {
            self.push(tok);
            return self.parse_postfix();
        };
        let arg = self.parse_unary()?;
        let loc = self.loc(tok).ending_at(arg.location().token());
        Ok(Phrase::Unary {
            op,
            arg: Box::new(arg),
            loc,
        })
    }

    /// Function calls by juxtaposition (`f x`) or parens (`f(x)`), and
    /// postfix `[index]` / `.field` chains.
    fn parse_postfix(&mut self) -> Result<Phrase> {
        let mut lhs = self.parse_spread_or_primary()?;
        loop {
            let tok = self.next();
            if self.is_punct(tok, "[") {
                let index = self.parse_comma_seq()?;
                let close = self.expect_punct("]")?;
                let loc = lhs.location().clone().ending_at(close);
                lhs = Phrase::Index {
                    base: Box::new(lhs),
                    index: Box::new(index),
                    loc,
                };
            } else if self.is_punct(tok, ".") {
                let name_tok = self.next();
                if name_tok.kind != TokenKind::Identifier {
                    return Err(self.error_at(name_tok, "expected field name after '.'"));
                }
                let name: Rc<str> = self.peek_text(name_tok).into_owned().into();
                let loc = self.loc(name_tok);
                let field = Phrase::Identifier(loc.clone(), name);
                let loc = lhs.location().clone().ending_at(loc.token());
                lhs = Phrase::Binary {
                    op: BinaryOp::Dot,
                    left: Box::new(lhs),
                    right: Box::new(field),
                    loc,
                };
            } else if self.is_punct(tok, "(") {
                let arg = self.parse_paren_body(tok)?;
                let loc = lhs.location().clone().ending_at(arg.location().token());
                lhs = Phrase::Call {
                    func: Box::new(lhs),
                    arg: Box::new(arg),
                    loc,
                };
            } else if self.starts_primary(tok) {
                self.push(tok);
                let arg = self.parse_postfix()?;
                let loc = lhs.location().clone().ending_at(arg.location().token());
                lhs = Phrase::Call {
                    func: Box::new(lhs),
                    arg: Box::new(arg),
                    loc,
                };
            } else {
                self.push(tok);
                break;
            }
        }
        Ok(lhs)
    }

    /// Conservative lookahead: does this token kind begin an atom that could
    /// be a juxtaposed call argument? Keeps `f x` working without also
    /// swallowing the next binary operator as an argument.
    fn starts_primary(&self, tok: Token) -> bool {
        matches!(tok.kind, TokenKind::Identifier | TokenKind::Numeral | TokenKind::StringSegment)
            && !self.is_keyword(tok, "in")
            && !self.is_keyword(tok, "else")
            && !self.is_keyword(tok, "then")
    }

    fn parse_spread_or_primary(&mut self) -> Result<Phrase> {
        let tok = self.next();
        if self.is_punct(tok, "...") {
            let arg = self.parse_postfix()?;
            let loc = self.loc(tok).ending_at(arg.location().token());
            return Ok(Phrase::Spread {
                arg: Box::new(arg),
                loc,
            });
        }
        self.push(tok);
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Phrase> {
        let tok = self.next();
        let loc = self.loc(tok);
        match tok.kind {
            TokenKind::Numeral => Ok(Phrase::Numeral(loc)),
            TokenKind::StringSegment => {
                let text = unescape_string_literal(self.peek_text(tok).as_ref());
                Ok(Phrase::Str(loc, text.into()))
            }
            TokenKind::Identifier => self.parse_identifier_led(tok, loc),
            _ if self.is_punct(tok, "(") => self.parse_paren_body(tok),
            _ if self.is_punct(tok, "[") => {
                let items = self.parse_bracketed_items("]")?;
                let close = self.expect_punct("]")?;
                Ok(Phrase::List {
                    items,
                    loc: loc.ending_at(close),
                })
            }
            _ if self.is_punct(tok, "{") => {
                let fields = self.parse_bracketed_items("}")?;
                let close = self.expect_punct("}")?;
                Ok(Phrase::Record {
                    fields,
                    loc: loc.ending_at(close),
                })
            }
            _ if self.is_punct(tok, "_") => Ok(Phrase::Wildcard(loc)),
            TokenKind::EndOfSource => Err(self.error_at(tok, "unexpected end of source")),
            _ => Err(self.error_at(tok, format!("unexpected token '{}'", self.peek_text(tok)))),
        }
    }

    fn parse_identifier_led(&mut self, tok: Token, loc: Location) -> Result<Phrase> {
        let text = self.peek_text(tok).into_owned();
        match text.as_str() {
            "let" => self.parse_let(tok),
            "where" => Err(self.error_at(tok, "'where' must follow a phrase")),
            "if" => self.parse_if(tok),
            "for" => self.parse_for(tok),
            "while" => self.parse_while(tok),
            "do" => self.parse_do(tok),
            "parametric" => self.parse_parametric(tok),
            _ => {
                let ident = Phrase::Identifier(loc.clone(), Rc::from(text.as_str()));
                self.parse_where_suffix(ident, loc)
            }
        }
    }

    /// `body where defs` binds at the lowest precedence on its left operand,
    /// so it is applied as a postfix suffix after parsing any primary.
    fn parse_where_suffix(&mut self, body: Phrase, body_loc: Location) -> Result<Phrase> {
        let tok = self.next();
        if self.is_keyword(tok, "where") {
            let defs = self.parse_definition_group(&["in"])?;
            let loc = body_loc.ending_at(defs.loc.token());
            return Ok(Phrase::Where {
                body: Box::new(body),
                defs,
                loc,
            });
        }
        self.push(tok);
        Ok(body)
    }

    fn parse_let(&mut self, let_tok: Token) -> Result<Phrase> {
        let defs = self.parse_definition_group(&["in"])?;
        self.expect_keyword("in")?;
        let body = self.parse_arrow()?;
        let loc = self.loc(let_tok).ending_at(body.location().token());
        Ok(Phrase::Let {
            defs,
            body: Box::new(body),
            loc,
        })
    }

    fn parse_if(&mut self, if_tok: Token) -> Result<Phrase> {
        self.expect_punct("(")?;
        let cond = self.parse_semicolon_seq()?;
        self.expect_punct(")")?;
        let then_branch = self.parse_arrow()?;
        let tok = self.next();
        let (else_branch, end_loc) = if self.is_keyword(tok, "else") {
            let e = self.parse_arrow()?;
            let l = e.location().clone();
            (Some(Box::new(e)), l)
        } else {
            self.push(tok);
            (None, then_branch.location().clone())
        };
        let loc = self.loc(if_tok).ending_at(end_loc.token());
        Ok(Phrase::If {
            cond: Box::new(cond),
            then_branch: Box::new(then_branch),
            else_branch,
            loc,
        })
    }

    fn parse_for(&mut self, for_tok: Token) -> Result<Phrase> {
        self.expect_punct("(")?;
        let pattern = self.parse_field()?;
        self.expect_keyword("in")?;
        let iter = self.parse_semicolon_seq()?;
        self.expect_punct(")")?;
        let body = self.parse_arrow()?;
        let loc = self.loc(for_tok).ending_at(body.location().token());
        Ok(Phrase::For {
            pattern: Box::new(pattern),
            iter: Box::new(iter),
            body: Box::new(body),
            loc,
        })
    }

    fn parse_while(&mut self, while_tok: Token) -> Result<Phrase> {
        self.expect_punct("(")?;
        let cond = self.parse_semicolon_seq()?;
        self.expect_punct(")")?;
        let body = self.parse_arrow()?;
        let loc = self.loc(while_tok).ending_at(body.location().token());
        Ok(Phrase::While {
            cond: Box::new(cond),
            body: Box::new(body),
            loc,
        })
    }

    fn parse_do(&mut self, do_tok: Token) -> Result<Phrase> {
        let mut actions = vec![self.parse_comma_seq()?];
        loop {
            let tok = self.next();
            if self.is_punct(tok, ";") {
                actions.push(self.parse_comma_seq()?);
            } else {
                self.push(tok);
                break;
            }
        }
        self.expect_keyword("in")?;
        let body = self.parse_arrow()?;
        let loc = self.loc(do_tok).ending_at(body.location().token());
        Ok(Phrase::Do {
            actions,
            body: Box::new(body),
            loc,
        })
    }

    fn parse_parametric(&mut self, par_tok: Token) -> Result<Phrase> {
        let defs = self.parse_definition_group(&["in"])?;
        self.expect_keyword("in")?;
        let body = self.parse_arrow()?;
        let loc = self.loc(par_tok).ending_at(body.location().token());
        Ok(Phrase::Parametric {
            defs,
            body: Box::new(body),
            loc,
        })
    }

    /// Parses a `;`-separated group of `pattern = value` definitions, used by
    /// `let`, `where`, and `parametric`. Stops before any of `terminators`.
    fn parse_definition_group(&mut self, terminators: &[&str]) -> Result<DefinitionGroup> {
        let mut items = Vec::new();
        loop {
            let def = self.parse_one_definition()?;
            let loc = def.location().clone();
            items.push(def);
            let tok = self.next();
            if self.is_punct(tok, ";") {
                continue;
            }
            self.push(tok);
            let _ = loc;
            break;
        }
        let start = items.first().unwrap().location().clone();
        let end = items.last().unwrap().location().clone();
        let _ = terminators;
        Ok(DefinitionGroup {
            items,
            loc: start.ending_at(end.token()),
        })
    }

    fn parse_one_definition(&mut self) -> Result<Phrase> {
        let pattern = self.parse_pattern_atom()?;
        self.expect_punct("=")?;
        let value = self.parse_arrow()?;
        let loc = pattern.location().clone().ending_at(value.location().token());
        Ok(Phrase::Definition {
            pattern: Box::new(pattern),
            value: Box::new(value),
            loc,
        })
    }

    /// Patterns reuse expression grammar (identifiers, lists, records,
    /// `::`-annotations); full pattern *compilation* happens in the
    /// analyser, not here.
    fn parse_pattern_atom(&mut self) -> Result<Phrase> {
        let base = self.parse_postfix()?;
        let tok = self.next();
        if self.is_punct(tok, "::") {
            let type_expr = self.parse_postfix()?;
            let loc = base.location().clone().ending_at(type_expr.location().token());
            return Ok(Phrase::TypeAnnotation {
                pattern: Box::new(base),
                type_expr: Box::new(type_expr),
                loc,
            });
        }
        self.push(tok);
        Ok(base)
    }

    fn parse_paren_body(&mut self, open_tok: Token) -> Result<Phrase> {
        let tok = self.next();
        if self.is_punct(tok, ")") {
            let loc = self.loc(open_tok).ending_at(tok);
            return Ok(Phrase::List { items: Vec::new(), loc });
        }
        self.push(tok);
        let inner = self.parse_semicolon_seq()?;
        let close = self.expect_punct(")")?;
        let loc = self.loc(open_tok).ending_at(close);
        let inner = self.parse_where_suffix(inner, loc.clone())?;
        Ok(match inner {
            Phrase::Comma { items, .. } => Phrase::List { items, loc },
            other => Phrase::Paren {
                inner: Box::new(other),
                loc,
            },
        })
    }

    /// Comma-separated items up to (but not consuming) `close`; used for
    /// both list literals and record literals.
    fn parse_bracketed_items(&mut self, close: &str) -> Result<Vec<Phrase>> {
        let tok = self.next();
        if self.is_punct(tok, close) {
            self.push(tok);
            return Ok(Vec::new());
        }
        self.push(tok);
        let mut items = vec![self.parse_arrow()?];
        loop {
            let tok = self.next();
            if self.is_punct(tok, ",") {
                items.push(self.parse_arrow()?);
            } else {
                self.push(tok);
                break;
            }
        }
        Ok(items)
    }

    fn expect_punct(&mut self, s: &str) -> Result<Token> {
        let tok = self.next();
        if self.is_punct(tok, s) {
            Ok(tok)
        } else {
            Err(self.error_at(tok, format!("expected '{s}'")))
        }
    }

    fn expect_keyword(&mut self, s: &str) -> Result<Token> {
        let tok = self.next();
        if self.is_keyword(tok, s) {
            Ok(tok)
        } else {
            Err(self.error_at(tok, format!("expected '{s}'")))
        }
    }
}

/// Resolves `\"`, `\\`, `\n`, `\t` escapes in a scanned string token's text
/// (which still includes the surrounding quotes).
fn unescape_string_literal(raw: &str) -> String {
    let inner = &raw[1..raw.len().saturating_sub(1).max(1)];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::Source;

    fn parse(src: &str) -> Phrase {
        parse_program(Source::from_string(src)).unwrap()
    }

    #[test]
    fn parses_let_in_arithmetic() {
        let p = parse("let x = 1 in x + 2 * 3");
        match p.nub() {
            Phrase::Let { .. } => {}
            other => panic!("expected Let, got {other:?}"),
        }
    }

    #[test]
    fn parses_lambda_and_call() {
        let p = parse("(x -> x + 1)(5)");
        match p.nub() {
            Phrase::Call { .. } => {}
            other => panic!("expected Call, got {other:?}"),
        }
    }

    #[test]
    fn parses_list_and_record_literals() {
        let p = parse("[1, 2, 3]");
        match p.nub() {
            Phrase::List { items, .. } => assert_eq!(items.len(), 3),
            other => panic!("expected List, got {other:?}"),
        }
        let p = parse("{x: 1, y: 2}");
        match p.nub() {
            Phrase::Record { fields, .. } => assert_eq!(fields.len(), 2),
            other => panic!("expected Record, got {other:?}"),
        }
    }

    #[test]
    fn parses_if_else() {
        let p = parse("if (x > 0) 1 else -1");
        match p.nub() {
            Phrase::If { else_branch, .. } => assert!(else_branch.is_some()),
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn parses_for_generator() {
        let p = parse("[for (i in 1..3) i*i]");
        match p.nub() {
            Phrase::List { items, .. } => assert_eq!(items.len(), 1),
            other => panic!("expected List, got {other:?}"),
        }
    }
}
