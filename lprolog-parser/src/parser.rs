//! Operator-precedence parser for terms.
//!
//! This module defines the [`Parser`], a Pratt-style precedence-climbing
//! parser over the tokens of a [`Lexer`]. It uses a mutable [`Arena`] as
//! shared context: the arena interns names, supplies the operator table
//! consulted at every operator, and receives new operator definitions from
//! fixity declarations (see `decl.rs`). A declaration therefore affects
//! every later term of the same unit.
//!
//! # Precedences
//! Higher numbers bind tighter. `parse_expr(min, strict, ..)` accepts an
//! infix or postfix operator of precedence `p` when `p > min`, or when
//! `p == min` and the call is not strict. Right operands are parsed at the
//! operator's own precedence: strictly for left- and non-associative
//! operators, so that an equal operator returns control to the caller, and
//! non-strictly for right-associative ones.
//!
//! Two operators of the same precedence may only be chained when both are
//! associative in the same direction; everything else is reported and must
//! be disambiguated with parentheses.

use crate::{Lexer, Loader, ParseError, Token, TokenKind, bail};
use lprolog_ast::program::Digest;
use lprolog_ast::{
    APPL_PRECEDENCE, Arena, Assoc, Fixity, INF_PRECEDENCE, LAM_PRECEDENCE,
    LIST_ELEMENT_PRECEDENCE, Loc, MIN_PRECEDENCE, OperDef, Placement, Symbol, Term, mk_quoted,
    mk_seq,
};
use std::collections::{HashSet, VecDeque};

/// Parser over one source unit.
///
/// The loader and the set of digests are shared with the parsers of
/// accumulated units, so that a unit is read at most once per session.
pub struct Parser<'a, L: Loader + ?Sized> {
    lexer: Lexer,
    /// Tokens read from the lexer but not consumed yet.
    lookahead: VecDeque<Token>,
    /// Location of the last consumed token.
    last_loc: Loc,
    pub(crate) arena: &'a mut Arena,
    pub(crate) loader: &'a mut L,
    pub(crate) seen: &'a mut HashSet<Digest>,
}

impl<'a, L: Loader + ?Sized> Parser<'a, L> {
    pub fn new(
        arena: &'a mut Arena,
        loader: &'a mut L,
        seen: &'a mut HashSet<Digest>,
        lexer: Lexer,
    ) -> Self {
        let last_loc = Loc::initial(lexer.source_name().clone());
        Self {
            lexer,
            lookahead: VecDeque::new(),
            last_loc,
            arena,
            loader,
            seen,
        }
    }

    /// Returns the `n`-th token ahead without consuming it.
    pub(crate) fn peek_nth(&mut self, n: usize) -> Result<&Token, ParseError> {
        while self.lookahead.len() <= n {
            let tok = self.lexer.next_token()?;
            self.lookahead.push_back(tok);
        }
        Ok(&self.lookahead[n])
    }

    pub(crate) fn peek(&mut self) -> Result<&Token, ParseError> {
        self.peek_nth(0)
    }

    pub(crate) fn next(&mut self) -> Result<Token, ParseError> {
        self.peek_nth(0)?;
        match self.lookahead.pop_front() {
            Some(tok) => {
                self.last_loc = tok.loc.clone();
                Ok(tok)
            }
            None => lprolog_ast::anomaly!("lookahead is empty after peek"),
        }
    }

    /// Consumes the next token, which must have kind `kind`.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        let tok = self.next()?;
        if tok.kind != kind {
            bail!(tok.loc, "expected {}, found {}", kind, tok.kind);
        }
        Ok(tok)
    }

    /// Consumes the next token if it is the symbolic token `text`.
    pub(crate) fn eat_symbol(&mut self, text: &str) -> Result<bool, ParseError> {
        if self.peek()?.is_symbol(text) {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Span from `start` to the last consumed token.
    pub(crate) fn span_from(&self, start: &Loc) -> Loc {
        start.merge(&self.last_loc)
    }

    /// The operator symbol named by `tok`, if it has any definition.
    fn oper_symbol(&self, tok: &Token) -> Option<Symbol> {
        let sym = self.arena.lookup(tok.name()?)?;
        self.arena.is_oper(sym).then_some(sym)
    }

    fn oper_at(&self, tok: &Token, placement: Placement) -> Option<(Symbol, OperDef)> {
        let sym = self.oper_symbol(tok)?;
        self.arena.oper(sym, placement).map(|def| (sym, *def))
    }

    /// Returns `true` if `tok` can begin an argument of an application.
    fn starts_argument(&self, tok: &Token) -> bool {
        match &tok.kind {
            TokenKind::Ident(_) | TokenKind::Symbolic(_) => {
                !tok.is_symbol("|") && self.oper_symbol(tok).is_none()
            }
            TokenKind::MacroName(_)
            | TokenKind::Int(_)
            | TokenKind::Float(_)
            | TokenKind::Str(_)
            | TokenKind::Quotation(_)
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace => true,
            TokenKind::RParen
            | TokenKind::RBracket
            | TokenKind::RBrace
            | TokenKind::Backslash
            | TokenKind::End
            | TokenKind::Eof => false,
        }
    }

    /// Returns `true` if `tok` can begin a term, prefix operators included.
    fn starts_term(&self, tok: &Token) -> bool {
        self.starts_argument(tok) || self.oper_at(tok, Placement::Prefix).is_some()
    }

    /// Parses a term at the lowest precedence.
    pub fn parse_term(&mut self) -> Result<Term, ParseError> {
        self.parse_expr(MIN_PRECEDENCE, false, None)
    }

    /// Parses a term whose operators all bind tighter than `min` (or as
    /// tight, unless `strict`).
    ///
    /// `parent` is the operator whose right operand is being parsed; it is
    /// used to detect chains of equal precedence.
    pub(crate) fn parse_expr(
        &mut self,
        min: i64,
        strict: bool,
        parent: Option<(i64, Assoc)>,
    ) -> Result<Term, ParseError> {
        let start = self.peek()?.loc.clone();
        let mut lhs = self.parse_prefix(min)?;
        let mut last = parent;
        loop {
            let tok = self.peek()?.clone();
            let infix = self.oper_at(&tok, Placement::Infix);
            let postfix = self.oper_at(&tok, Placement::Postfix);
            let (op, def) = match (infix, postfix) {
                (Some(i), Some(p)) => {
                    let next = self.peek_nth(1)?.clone();
                    if self.starts_term(&next) { i } else { p }
                }
                (Some(i), None) => i,
                (None, Some(p)) => p,
                (None, None) => break,
            };
            let prec = def.prec;
            if prec < min || (prec == min && strict) {
                log::trace!("operator {} ({}) yields to context {} at {}", tok.kind, prec, min, tok.loc);
                break;
            }
            let assoc = def.assoc();
            if let Some((last_prec, last_assoc)) = last {
                if last_prec == prec {
                    self.check_chain(&tok, last_assoc, assoc)?;
                }
            }
            self.next()?;
            log::trace!("operator {} {} {} at {}", tok.kind, def.fixity, prec, tok.loc);
            lhs = match def.fixity {
                Fixity::Postfix => {
                    last = Some((prec, Assoc::Left));
                    Term::App(Box::new(Term::Const(op)), vec![lhs])
                }
                Fixity::Infixr => {
                    let rhs = self.parse_expr(prec, false, Some((prec, assoc)))?;
                    last = Some((prec, assoc));
                    Term::App(Box::new(Term::Const(op)), vec![lhs, rhs])
                }
                Fixity::Infixl | Fixity::Infix => {
                    let rhs = self.parse_expr(prec, true, Some((prec, assoc)))?;
                    last = Some((prec, assoc));
                    Term::App(Box::new(Term::Const(op)), vec![lhs, rhs])
                }
                Fixity::Prefix => lprolog_ast::anomaly!("prefix definition in infix slot"),
            };
            log::trace!("reduced {} at {}", lhs.display(self.arena), self.span_from(&start));
        }
        Ok(lhs)
    }

    /// Rejects a chain of two operators of equal precedence unless both
    /// associate in the same direction.
    fn check_chain(&self, tok: &Token, left: Assoc, right: Assoc) -> Result<(), ParseError> {
        if left == Assoc::None || right == Assoc::None {
            bail!(
                tok.loc,
                "precedence conflict: cannot chain non-associative operator {}; use parenthesis",
                tok.kind
            );
        }
        if left != right {
            bail!(
                tok.loc,
                "associativity conflict: cannot chain {} with an operator of the same precedence and {} associativity; use parenthesis",
                tok.kind,
                left
            );
        }
        Ok(())
    }

    /// A prefix operator application, an application, or an atomic term.
    fn parse_prefix(&mut self, min: i64) -> Result<Term, ParseError> {
        let tok = self.peek()?.clone();
        if let Some((op, def)) = self.oper_at(&tok, Placement::Prefix) {
            let next = self.peek_nth(1)?.clone();
            if self.starts_term(&next) {
                if def.prec < min {
                    bail!(
                        tok.loc,
                        "precedence conflict: prefix operator {} ({}) cannot appear where precedence {} is required; use parenthesis",
                        tok.kind,
                        def.prec,
                        min
                    );
                }
                self.next()?;
                log::trace!("prefix operator {} {} at {}", tok.kind, def.prec, tok.loc);
                let operand = self.parse_expr(def.prec, false, Some((def.prec, Assoc::Right)))?;
                return Ok(Term::App(Box::new(Term::Const(op)), vec![operand]));
            }
        }
        if min > APPL_PRECEDENCE {
            return self.parse_atomic(min);
        }
        let head = self.parse_atomic(min)?;
        let mut terms = vec![head];
        loop {
            let tok = self.peek()?.clone();
            if !self.starts_argument(&tok) {
                break;
            }
            terms.push(self.parse_atomic(LAM_PRECEDENCE)?);
        }
        if terms.len() == 1 {
            return Ok(terms.remove(0));
        }
        let loc = self.span_from(&tok.loc);
        Ok(self.arena.mk_app(&loc, terms)?)
    }

    /// An atomic term: a name, a literal, a bracketed term, or a lambda
    /// when `min` admits one.
    pub(crate) fn parse_atomic(&mut self, min: i64) -> Result<Term, ParseError> {
        let tok = self.next()?;
        let loc = tok.loc.clone();
        match tok.kind {
            TokenKind::Ident(ref name) => {
                if min <= LAM_PRECEDENCE && self.peek()?.kind == TokenKind::Backslash {
                    self.next()?;
                    let body = self.parse_expr(MIN_PRECEDENCE, false, None)?;
                    return Ok(self.arena.mk_lam(name, body));
                }
                if self.oper_symbol(&tok).is_some() {
                    bail!(loc, "unexpected operator {}", tok.kind);
                }
                if name == "_" {
                    return Ok(self.arena.fresh_var());
                }
                Ok(self.arena.mk_con(name))
            }
            TokenKind::Symbolic(ref name) => {
                if name == "|" || self.oper_symbol(&tok).is_some() {
                    bail!(loc, "unexpected {}", tok.kind);
                }
                Ok(self.arena.mk_con(name))
            }
            TokenKind::MacroName(name) => Ok(self.arena.mk_con(&name)),
            TokenKind::Int(text) => match text.parse::<i64>() {
                Ok(i) => Ok(Term::CData(self.arena.mk_int(i))),
                Err(source) => Err(ParseError::ParseInt { loc, source }),
            },
            TokenKind::Float(text) => match text.parse::<f64>() {
                Ok(x) => Ok(Term::CData(self.arena.mk_float(x))),
                Err(source) => Err(ParseError::ParseFloat { loc, source }),
            },
            TokenKind::Str(s) => Ok(Term::CData(self.arena.mk_string(&s))),
            TokenKind::Quotation(raw) => Ok(mk_quoted(&loc, &raw)?),
            TokenKind::LParen => self.parse_parenthesized(),
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => {
                let t = self.parse_term()?;
                self.expect(TokenKind::RBrace)?;
                Ok(Term::App(Box::new(Term::Const(Symbol::SPILL)), vec![t]))
            }
            other => bail!(loc, "unexpected {}", other),
        }
    }

    /// After `(`: an operator used as a constant, or a grouped term.
    fn parse_parenthesized(&mut self) -> Result<Term, ParseError> {
        let tok = self.peek()?.clone();
        if let Some(op) = self.oper_symbol(&tok) {
            if self.peek_nth(1)?.kind == TokenKind::RParen {
                self.next()?;
                self.next()?;
                return Ok(Term::Const(op));
            }
        }
        let t = self.parse_term()?;
        self.expect(TokenKind::RParen)?;
        Ok(t)
    }

    /// After `[`: `]`, or elements with an optional `| tail`.
    fn parse_list(&mut self) -> Result<Term, ParseError> {
        if self.peek()?.kind == TokenKind::RBracket {
            self.next()?;
            return Ok(Term::NIL);
        }
        let mut elems = vec![self.parse_expr(LIST_ELEMENT_PRECEDENCE, false, None)?];
        while self.eat_symbol(",")? {
            elems.push(self.parse_expr(LIST_ELEMENT_PRECEDENCE, false, None)?);
        }
        if self.eat_symbol("|")? {
            elems.push(self.parse_expr(LIST_ELEMENT_PRECEDENCE, false, None)?);
        } else {
            elems.push(Term::NIL);
        }
        self.expect(TokenKind::RBracket)?;
        Ok(mk_seq(elems))
    }

    /// Parses one atomic term at the highest precedence: no operators, no
    /// application.
    pub(crate) fn parse_closed(&mut self) -> Result<Term, ParseError> {
        self.parse_expr(INF_PRECEDENCE, true, None)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ParseError, parse_term_str};
    use lprolog_ast::{Arena, Fixity, Term};

    fn arena() -> Arena {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut arena = Arena::new();
        arena.define_default_opers().unwrap();
        arena
    }

    fn show(arena: &mut Arena, src: &str) -> String {
        let t = parse_term_str(arena, src).unwrap();
        t.display(arena).to_string()
    }

    fn fails(arena: &mut Arena, src: &str) -> ParseError {
        parse_term_str(arena, src).unwrap_err()
    }

    #[test]
    fn left_associative_chain() {
        let mut a = arena();
        assert_eq!(show(&mut a, "a + b + c"), "(+) ((+) a b) c");
        assert_eq!(show(&mut a, "a - b + c"), "(+) ((-) a b) c");
    }

    #[test]
    fn right_associative_chain() {
        let mut a = arena();
        assert_eq!(show(&mut a, "a :: b :: c"), "[a, b | c]");
        assert_eq!(show(&mut a, "a , b , c"), "(,) a ((,) b c)");
    }

    #[test]
    fn non_associative_chain_fails() {
        let mut a = arena();
        let err = fails(&mut a, "a = b = c");
        assert!(err.to_string().contains("non-associative"), "{err}");
        assert_eq!(show(&mut a, "(a = b) = c"), "(=) ((=) a b) c");
    }

    #[test]
    fn mixed_associativity_fails() {
        let mut a = arena();
        a.define_oper("++", Fixity::Infixr, 160).unwrap();
        let err = fails(&mut a, "a + b ++ c");
        assert!(err.to_string().contains("associativity conflict"), "{err}");
        let err = fails(&mut a, "a ++ b + c");
        assert!(err.to_string().contains("associativity conflict"), "{err}");
    }

    #[test]
    fn precedence_orders_operators() {
        let mut a = arena();
        assert_eq!(show(&mut a, "a + b * c"), "(+) a ((*) b c)");
        assert_eq!(show(&mut a, "a * b + c"), "(+) ((*) a b) c");
        assert_eq!(show(&mut a, "p :- q, r ; s"), "(:-) p ((;) ((,) q r) s)");
    }

    #[test]
    fn prefix_and_postfix() {
        let mut a = arena();
        assert_eq!(show(&mut a, "- a + b"), "(+) ((-) a) b");
        assert_eq!(show(&mut a, "a - - b"), "(-) a ((-) b)");
        a.define_oper("^^", Fixity::Postfix, 200).unwrap();
        assert_eq!(show(&mut a, "a + b ^^"), "(+) a ((^^) b)");
    }

    #[test]
    fn application_binds_tighter_than_operators() {
        let mut a = arena();
        assert_eq!(show(&mut a, "f x y + g z"), "(+) (f x y) (g z)");
        assert_eq!(show(&mut a, "f (g x) [1, 2]"), "f (g x) [1, 2]");
    }

    #[test]
    fn lambdas() {
        let mut a = arena();
        assert_eq!(show(&mut a, "pi x\\ p x, q"), "pi (x\\ (,) (p x) q)");
        assert_eq!(show(&mut a, "F = x\\ x"), "(=) F (x\\ x)");
    }

    #[test]
    fn lists_and_spill() {
        let mut a = arena();
        assert_eq!(show(&mut a, "[]"), "[]");
        assert_eq!(show(&mut a, "[a, b | T]"), "[a, b | T]");
        assert_eq!(show(&mut a, "[a, (b, c)]"), "[a, (,) b c]");
        assert_eq!(show(&mut a, "{ f X }"), "(#spill) (f X)");
    }

    #[test]
    fn operators_as_constants() {
        let mut a = arena();
        assert_eq!(show(&mut a, "map (+) L"), "map (+) L");
        assert_eq!(show(&mut a, "(::)"), "(::)");
    }

    #[test]
    fn equal_string_literals_share_storage() {
        let mut a = arena();
        let t = parse_term_str(&mut a, "f \"abc\" \"abc\" \"xyz\"").unwrap();
        let [Term::CData(x), Term::CData(y), Term::CData(z)] = t.args() else {
            panic!("{t:?}");
        };
        assert!(x.ptr_eq(y));
        assert!(!x.ptr_eq(z));
        assert_eq!(a.stats().strings, 2);
    }

    #[test]
    fn literals() {
        let mut a = arena();
        assert_eq!(show(&mut a, "f 1 2.5 \"s\""), "f 1 2.5 \"s\"");
        let t = parse_term_str(&mut a, "{{ kind:foo rest of data }}").unwrap();
        match t {
            Term::Quoted(q) => {
                assert_eq!(q.kind.as_deref(), Some("foo"));
                assert_eq!(q.data, "rest of data");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn anonymous_variables_are_fresh() {
        let mut a = arena();
        assert_eq!(show(&mut a, "f _ _"), "f _-1 _-2");
    }

    #[test]
    fn applying_a_literal_fails_with_location() {
        let mut a = arena();
        let err = fails(&mut a, "1 x");
        assert!(err.loc().is_some());
        assert!(err.to_string().contains("cannot apply"), "{err}");
    }

    #[test]
    fn unexpected_tokens_are_reported() {
        let mut a = arena();
        assert!(fails(&mut a, "f (a").to_string().contains("expected `)`"));
        assert!(fails(&mut a, "+ a").to_string().contains("unexpected"));
        assert!(matches!(fails(&mut a, "99999999999999999999"), ParseError::ParseInt { .. }));
    }

    #[test]
    fn declared_operators_take_effect() {
        let mut a = arena();
        assert_eq!(show(&mut a, "a <+> b"), "a (<+>) b");
        a.define_oper("<+>", Fixity::Infixl, 100).unwrap();
        assert_eq!(show(&mut a, "a <+> b"), "(<+>) a b");
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]
            #[test]
            fn prop_left_operator_chains_nest_left(n in 2usize..8, prec in 10i64..200) {
                let mut a = Arena::new();
                a.define_oper("<>", Fixity::Infixl, prec).unwrap();
                let names: Vec<String> = (0..n).map(|i| format!("x{i}")).collect();
                let src = names.join(" <> ");
                let mut expected = names[0].clone();
                for name in &names[1..] {
                    expected = format!("(<>) {} {}", paren(&expected), name);
                }
                prop_assert_eq!(show(&mut a, &src), expected);
            }
        }

        fn paren(s: &str) -> String {
            if s.contains(' ') { format!("({s})") } else { s.to_string() }
        }
    }
}
