//! Declaration parser.
//!
//! Parses a unit into a flat [`Program`]: one or more [`Decl`]s per
//! declaration, block markers included as they appear. Nesting is not
//! checked here; see [`lprolog_ast::structure`].
//!
//! Fixity declarations update the operator table of the arena as soon as
//! they are parsed, so they affect the rest of the unit and every unit
//! parsed after it with the same arena.

use crate::{Lexer, Loader, ParseError, Parser, TokenKind, bail};
use lprolog_ast::program::{Digest, Program};
use lprolog_ast::{
    Attribute, Chr, Clause, Decl, Fixity, Loc, Macro, Mode, Sequent, Shorthand, Symbol, Term, Type,
    TypeAbbreviation,
};

/// Precedence at which `pred` argument types are parsed, so that `,`
/// separates arguments.
const PRED_ARG_PRECEDENCE: i64 = 110;

/// Declaration keywords and whether they accept attributes.
const KEYWORDS: &[(&str, bool)] = &[
    ("namespace", false),
    ("constraint", false),
    ("shorten", false),
    ("local", false),
    ("type", true),
    ("kind", true),
    ("external", true),
    ("mode", false),
    ("pred", true),
    ("macro", false),
    ("typeabbrev", false),
    ("rule", true),
    ("accumulate", false),
    ("infixl", false),
    ("infixr", false),
    ("infix", false),
    ("prefix", false),
    ("postfix", false),
];

fn keyword(kind: &TokenKind) -> Option<(&'static str, bool)> {
    let TokenKind::Ident(name) = kind else {
        return None;
    };
    KEYWORDS.iter().copied().find(|(k, _)| *k == name.as_str())
}

impl<'a, L: Loader + ?Sized> Parser<'a, L> {
    /// Parses declarations up to the end of input.
    pub fn parse_decls(&mut self) -> Result<Program, ParseError> {
        let mut out = Vec::new();
        while self.peek()?.kind != TokenKind::Eof {
            self.parse_decl(&mut out)?;
        }
        Ok(out)
    }

    fn parse_decl(&mut self, out: &mut Program) -> Result<(), ParseError> {
        let first = self.peek()?.clone();
        let start = first.loc;
        match first.kind {
            TokenKind::LBrace => {
                self.next()?;
                out.push(Decl::Begin(start));
                return Ok(());
            }
            TokenKind::RBrace => {
                self.next()?;
                out.push(Decl::End(start));
                return Ok(());
            }
            _ => {}
        }
        let mut attributes = self.parse_attributes()?;
        let tok = self.peek()?.clone();
        let Some((kw, takes_attributes)) = keyword(&tok.kind) else {
            let body = self.parse_term()?;
            self.expect(TokenKind::End)?;
            out.push(Decl::Clause(Clause {
                loc: self.span_from(&start),
                attributes,
                body,
            }));
            return Ok(());
        };
        if !attributes.is_empty() && !takes_attributes {
            bail!(tok.loc, "attributes are not allowed on {} declarations", kw);
        }
        self.next()?;
        log::trace!("declaration {kw} at {}", tok.loc);
        match kw {
            "namespace" => {
                let (name, _) = self.parse_name()?;
                self.expect(TokenKind::LBrace)?;
                out.push(Decl::Namespace(self.span_from(&start), name));
            }
            "constraint" => {
                let mut names = Vec::new();
                while self.peek()?.kind != TokenKind::LBrace {
                    names.push(self.parse_name()?.0);
                }
                self.next()?;
                out.push(Decl::Constraint(self.span_from(&start), names));
            }
            "shorten" => {
                let shorthands = self.parse_shorten()?;
                self.expect(TokenKind::End)?;
                out.push(Decl::Shorten(self.span_from(&start), shorthands));
            }
            "local" => {
                let names = self.parse_name_list()?;
                if self.peek()?.kind == TokenKind::End {
                    self.next()?;
                    out.push(Decl::Local(self.span_from(&start), names));
                } else {
                    let ty = self.parse_term()?;
                    self.expect(TokenKind::End)?;
                    let loc = self.span_from(&start);
                    let types = types(&loc, &names, &[], &ty);
                    out.push(Decl::Local(loc, names));
                    out.push(Decl::Type(types));
                }
            }
            "type" | "kind" => out.push(self.parse_type(&start, &attributes)?),
            "external" => {
                attributes.push(Attribute::External);
                let tok = self.next()?;
                match keyword(&tok.kind) {
                    Some(("type" | "kind", _)) => out.push(self.parse_type(&start, &attributes)?),
                    Some(("pred", _)) => out.extend(self.parse_pred(&start, attributes)?),
                    _ => bail!(tok.loc, "expected type, kind or pred after external, found {}", tok.kind),
                }
            }
            "mode" => {
                let mut modes = Vec::new();
                loop {
                    modes.push(self.parse_mode()?);
                    if !self.eat_symbol(",")? {
                        break;
                    }
                }
                self.expect(TokenKind::End)?;
                out.push(Decl::Mode(modes));
            }
            "pred" => out.extend(self.parse_pred(&start, attributes)?),
            "macro" => out.push(self.parse_macro(&start)?),
            "typeabbrev" => out.push(self.parse_typeabbrev(&start)?),
            "rule" => out.push(self.parse_rule(&start, attributes)?),
            "accumulate" => out.push(self.parse_accumulate(&start)?),
            fixity => {
                let fixity: Fixity = fixity.parse()?;
                self.parse_fixity(fixity)?;
                out.push(Decl::Ignored(self.span_from(&start)));
            }
        }
        Ok(())
    }

    /// Leading `:name "n"`, `:if "F"`, `:index(1 _ 0)` and the like.
    fn parse_attributes(&mut self) -> Result<Vec<Attribute>, ParseError> {
        let mut attributes = Vec::new();
        while self.peek()?.is_symbol(":") {
            self.next()?;
            let tok = self.next()?;
            let TokenKind::Ident(name) = &tok.kind else {
                bail!(tok.loc, "expected attribute name, found {}", tok.kind);
            };
            let attribute = match name.as_str() {
                "name" => Attribute::Name(self.parse_string()?),
                "before" => Attribute::Before(self.parse_string()?),
                "after" => Attribute::After(self.parse_string()?),
                "if" => Attribute::If(self.parse_string()?),
                "external" => Attribute::External,
                "index" => {
                    self.expect(TokenKind::LParen)?;
                    let mut ix = Vec::new();
                    loop {
                        let tok = self.next()?;
                        match &tok.kind {
                            TokenKind::RParen => break,
                            TokenKind::Ident(s) if s == "_" => ix.push(0),
                            TokenKind::Int(n) => match n.parse::<usize>() {
                                Ok(n) => ix.push(n),
                                Err(source) => return Err(ParseError::ParseInt { loc: tok.loc, source }),
                            },
                            other => bail!(tok.loc, "expected index depth, found {}", other),
                        }
                    }
                    Attribute::Index(ix)
                }
                other => bail!(tok.loc, "unknown attribute :{}", other),
            };
            attributes.push(attribute);
        }
        Ok(attributes)
    }

    fn parse_string(&mut self) -> Result<String, ParseError> {
        let tok = self.next()?;
        match tok.kind {
            TokenKind::Str(s) => Ok(s.to_string()),
            other => bail!(tok.loc, "expected a string, found {}", other),
        }
    }

    /// A declared name: an identifier, a macro name, a symbolic name, or
    /// any of these in parentheses.
    fn parse_name(&mut self) -> Result<(Symbol, Loc), ParseError> {
        let tok = self.next()?;
        match &tok.kind {
            TokenKind::Ident(s) | TokenKind::MacroName(s) => Ok((self.arena.intern(s), tok.loc)),
            TokenKind::Symbolic(s) if s != "," && s != "|" => Ok((self.arena.intern(s), tok.loc)),
            TokenKind::LParen => {
                let inner = self.next()?;
                let name = match &inner.kind {
                    TokenKind::Ident(s) | TokenKind::Symbolic(s) | TokenKind::MacroName(s) => {
                        self.arena.intern(s)
                    }
                    other => bail!(inner.loc, "expected a name, found {}", other),
                };
                self.expect(TokenKind::RParen)?;
                Ok((name, self.span_from(&tok.loc)))
            }
            other => bail!(tok.loc, "expected a name, found {}", other),
        }
    }

    fn parse_name_list(&mut self) -> Result<Vec<Symbol>, ParseError> {
        let mut names = vec![self.parse_name()?.0];
        while self.eat_symbol(",")? {
            names.push(self.parse_name()?.0);
        }
        Ok(names)
    }

    fn parse_type(&mut self, start: &Loc, attributes: &[Attribute]) -> Result<Decl, ParseError> {
        let names = self.parse_name_list()?;
        let ty = self.parse_term()?;
        self.expect(TokenKind::End)?;
        let loc = self.span_from(start);
        Ok(Decl::Type(types(&loc, &names, attributes, &ty)))
    }

    /// `p.{ a, b }, q.{ c }`
    fn parse_shorten(&mut self) -> Result<Vec<Shorthand>, ParseError> {
        let mut out = Vec::new();
        loop {
            let tok = self.next()?;
            let TokenKind::Ident(prefix) = &tok.kind else {
                bail!(tok.loc, "expected a namespace, found {}", tok.kind);
            };
            let dot = self.next()?;
            if !dot.is_symbol(".") {
                bail!(dot.loc, "expected `.` after namespace, found {}", dot.kind);
            }
            self.expect(TokenKind::LBrace)?;
            loop {
                let tok = self.next()?;
                let TokenKind::Ident(name) = &tok.kind else {
                    bail!(tok.loc, "expected a name, found {}", tok.kind);
                };
                let short = name.rsplit('.').next().unwrap_or(name.as_str());
                out.push(Shorthand {
                    loc: tok.loc.clone(),
                    full_name: self.arena.intern(&format!("{prefix}.{name}")),
                    short_name: self.arena.intern(short),
                });
                if !self.eat_symbol(",")? {
                    break;
                }
            }
            self.expect(TokenKind::RBrace)?;
            if !self.eat_symbol(",")? {
                return Ok(out);
            }
        }
    }

    /// `(p i o)`
    fn parse_mode(&mut self) -> Result<Mode, ParseError> {
        let open = self.expect(TokenKind::LParen)?;
        let (name, _) = self.parse_name()?;
        let mut args = Vec::new();
        loop {
            let tok = self.next()?;
            match &tok.kind {
                TokenKind::RParen => break,
                TokenKind::Ident(s) if s == "i" => args.push(true),
                TokenKind::Ident(s) if s == "o" => args.push(false),
                other => bail!(tok.loc, "expected mode i or o, found {}", other),
            }
        }
        Ok(Mode {
            loc: self.span_from(&open.loc),
            name,
            args,
        })
    }

    /// `pred p i:t1, o:t2.` declares both the mode and the type
    /// `t1 -> t2 -> prop`.
    fn parse_pred(&mut self, start: &Loc, attributes: Vec<Attribute>) -> Result<Vec<Decl>, ParseError> {
        let (name, _) = self.parse_name()?;
        let mut modes = Vec::new();
        let mut tys = Vec::new();
        if self.peek()?.kind != TokenKind::End {
            loop {
                let tok = self.next()?;
                let input = match &tok.kind {
                    TokenKind::Ident(s) if s == "i" => true,
                    TokenKind::Ident(s) if s == "o" => false,
                    other => bail!(tok.loc, "expected mode i or o, found {}", other),
                };
                let colon = self.next()?;
                if !colon.is_symbol(":") {
                    bail!(colon.loc, "expected `:` after mode, found {}", colon.kind);
                }
                modes.push(input);
                tys.push(self.parse_expr(PRED_ARG_PRECEDENCE, true, None)?);
                if !self.eat_symbol(",")? {
                    break;
                }
            }
        }
        self.expect(TokenKind::End)?;
        let loc = self.span_from(start);
        let ty = tys.into_iter().rev().fold(Term::Const(Symbol::PROP), |acc, t| {
            Term::App(Box::new(Term::Const(Symbol::ARROW)), vec![t, acc])
        });
        Ok(vec![
            Decl::Mode(vec![Mode {
                loc: loc.clone(),
                name,
                args: modes,
            }]),
            Decl::Type(vec![Type {
                loc,
                attributes,
                name,
                ty,
            }]),
        ])
    }

    /// `macro @m X Y :- body.`
    fn parse_macro(&mut self, start: &Loc) -> Result<Decl, ParseError> {
        let t = self.parse_term()?;
        self.expect(TokenKind::End)?;
        let loc = self.span_from(start);
        let Some([lhs, body]) = t.unpack_app(Symbol::RIMPL) else {
            bail!(loc, "a macro must have the form @name Args :- Body");
        };
        let Some(name) = lhs.head_symbol().filter(|s| self.arena.show(*s).starts_with('@')) else {
            bail!(loc, "macro names start with @, found {}", lhs.display(self.arena));
        };
        let params = self.parameters(&loc, lhs.args())?;
        Ok(Decl::Macro(Macro {
            loc,
            name,
            body: abstract_over(&params, body.clone()),
        }))
    }

    /// `typeabbrev (t A) value.` or `typeabbrev t value.`
    fn parse_typeabbrev(&mut self, start: &Loc) -> Result<Decl, ParseError> {
        let head = self.parse_closed()?;
        let value = self.parse_term()?;
        self.expect(TokenKind::End)?;
        let loc = self.span_from(start);
        let Some(name) = head.head_symbol() else {
            bail!(loc, "bad type abbreviation head {}", head.display(self.arena));
        };
        let params = self.parameters(&loc, head.args())?;
        Ok(Decl::TypeAbbreviation(TypeAbbreviation {
            loc,
            name,
            nparams: params.len(),
            value: abstract_over(&params, value),
        }))
    }

    fn parameters(&self, loc: &Loc, args: &[Term]) -> Result<Vec<Symbol>, ParseError> {
        args.iter()
            .map(|a| match a.as_const() {
                Some(s) => Ok(s),
                None => bail!(loc, "parameter {} is not a name", a.display(self.arena)),
            })
            .collect()
    }

    /// `rule Match \ Remove | Guard <=> New.` with every part optional.
    fn parse_rule(&mut self, start: &Loc, attributes: Vec<Attribute>) -> Result<Decl, ParseError> {
        let to_match = self.parse_sequents()?;
        let mut to_remove = Vec::new();
        if self.peek()?.kind == TokenKind::Backslash {
            self.next()?;
            to_remove = self.parse_sequents()?;
        }
        let guard = if self.eat_symbol("|")? {
            Some(self.parse_closed()?)
        } else {
            None
        };
        let new_goal = if self.eat_symbol("<=>")? {
            let t = self.parse_closed()?;
            Some(self.sequent(t))
        } else {
            None
        };
        self.expect(TokenKind::End)?;
        Ok(Decl::Chr(Chr {
            to_match,
            to_remove,
            guard,
            new_goal,
            attributes,
            loc: self.span_from(start),
        }))
    }

    fn parse_sequents(&mut self) -> Result<Vec<Sequent>, ParseError> {
        let mut out = Vec::new();
        loop {
            let tok = self.peek()?;
            if tok.is_end()
                || tok.kind == TokenKind::Backslash
                || tok.is_symbol("|")
                || tok.is_symbol("<=>")
            {
                return Ok(out);
            }
            let t = self.parse_closed()?;
            out.push(self.sequent(t));
        }
    }

    /// `(E : C ?- G)`, `(C ?- G)` or `G`; missing parts are fresh variables.
    fn sequent(&mut self, t: Term) -> Sequent {
        if let Some([lhs, conclusion]) = t.unpack_app(Symbol::SEQUENT) {
            if let Some([eigen, context]) = lhs.unpack_app(Symbol::COLON) {
                return Sequent {
                    eigen: eigen.clone(),
                    context: context.clone(),
                    conclusion: conclusion.clone(),
                };
            }
            return Sequent {
                eigen: self.arena.fresh_var(),
                context: lhs.clone(),
                conclusion: conclusion.clone(),
            };
        }
        Sequent {
            eigen: self.arena.fresh_var(),
            context: self.arena.fresh_var(),
            conclusion: t,
        }
    }

    /// `accumulate a, "dir/b".`
    fn parse_accumulate(&mut self, start: &Loc) -> Result<Decl, ParseError> {
        let mut parts = Vec::new();
        loop {
            let tok = self.next()?;
            let name = match &tok.kind {
                TokenKind::Ident(s) | TokenKind::Str(s) => s.clone(),
                other => bail!(tok.loc, "expected a unit name, found {}", other),
            };
            parts.push(self.accumulate_unit(&tok.loc, &name)?);
            if !self.eat_symbol(",")? {
                break;
            }
        }
        self.expect(TokenKind::End)?;
        Ok(Decl::Accumulated(self.span_from(start), parts))
    }

    /// Loads and parses one unit, unless its text was already seen in this
    /// session.
    pub(crate) fn accumulate_unit(&mut self, loc: &Loc, name: &str) -> Result<(Digest, Program), ParseError> {
        let source = self.loader.load(loc, name)?;
        let digest = Digest::of(&source.text);
        if !self.seen.insert(digest) {
            log::debug!("accumulate {name}: {} already loaded", source.name);
            return Ok((digest, Vec::new()));
        }
        log::debug!("accumulate {name}: parsing {} ({digest})", source.name);
        let lexer = Lexer::new(source.name, source.text);
        let mut nested = Parser::new(&mut *self.arena, &mut *self.loader, &mut *self.seen, lexer);
        let decls = nested.parse_decls()?;
        Ok((digest, decls))
    }

    /// `infixl op1 op2 160.`
    fn parse_fixity(&mut self, fixity: Fixity) -> Result<(), ParseError> {
        let mut ops: Vec<(String, Loc)> = Vec::new();
        loop {
            let tok = self.next()?;
            match &tok.kind {
                TokenKind::Int(n) => {
                    let prec = match n.parse::<i64>() {
                        Ok(p) => p,
                        Err(source) => return Err(ParseError::ParseInt { loc: tok.loc, source }),
                    };
                    if ops.is_empty() {
                        bail!(tok.loc, "{} declaration without operators", fixity);
                    }
                    for (name, loc) in ops {
                        if let Err(e) = self.arena.define_oper(&name, fixity, prec) {
                            bail!(loc, "{}", e);
                        }
                    }
                    break;
                }
                TokenKind::Ident(s) | TokenKind::Symbolic(s) => ops.push((s.to_string(), tok.loc.clone())),
                other => bail!(tok.loc, "expected an operator or a precedence, found {}", other),
            }
        }
        self.expect(TokenKind::End)?;
        Ok(())
    }
}

fn types(loc: &Loc, names: &[Symbol], attributes: &[Attribute], ty: &Term) -> Vec<Type<Vec<Attribute>>> {
    names
        .iter()
        .map(|&name| Type {
            loc: loc.clone(),
            attributes: attributes.to_vec(),
            name,
            ty: ty.clone(),
        })
        .collect()
}

/// `X\ Y\ body` for parameters `[X, Y]`.
fn abstract_over(params: &[Symbol], body: Term) -> Term {
    params
        .iter()
        .rev()
        .fold(body, |acc, &p| Term::Lam(p, Box::new(acc)))
}

#[cfg(test)]
mod tests {
    use crate::{MemoryLoader, ParseError, parse_str};
    use lprolog_ast::{Arena, Attribute, Decl, Fixity, Symbol, Term};

    fn arena() -> Arena {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut arena = Arena::new();
        arena.define_default_opers().unwrap();
        arena
    }

    fn parse(arena: &mut Arena, src: &str) -> Vec<Decl> {
        parse_str(arena, &mut MemoryLoader::new(), "t.lp", src).unwrap()
    }

    fn parse_err(arena: &mut Arena, src: &str) -> ParseError {
        parse_str(arena, &mut MemoryLoader::new(), "t.lp", src).unwrap_err()
    }

    #[test]
    fn clauses_with_attributes() {
        let mut a = arena();
        let decls = parse(&mut a, ":name \"c1\" :before \"c0\" :if \"DEBUG\" p X :- q X.");
        let [Decl::Clause(c)] = decls.as_slice() else {
            panic!("{decls:?}");
        };
        assert_eq!(
            c.attributes,
            vec![
                Attribute::Name("c1".into()),
                Attribute::Before("c0".into()),
                Attribute::If("DEBUG".into())
            ]
        );
        assert_eq!(c.body.display(&a).to_string(), "(:-) (p X) (q X)");
        assert_eq!(c.loc.source_start, 0);
    }

    #[test]
    fn blocks_are_flat_markers() {
        let mut a = arena();
        let decls = parse(&mut a, "namespace n { p. } constraint c d { } { local x. }");
        let kinds: Vec<&str> = decls
            .iter()
            .map(|d| match d {
                Decl::Namespace(..) => "ns",
                Decl::Clause(_) => "clause",
                Decl::End(_) => "end",
                Decl::Constraint(_, names) if names.len() == 2 => "constraint",
                Decl::Begin(_) => "begin",
                Decl::Local(..) => "local",
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        assert_eq!(kinds, ["ns", "clause", "end", "constraint", "end", "begin", "local", "end"]);
    }

    #[test]
    fn fixity_declarations_extend_the_grammar() {
        let mut a = arena();
        let decls = parse(&mut a, "infixl <+> 100.\np :- a <+> b <+> c.");
        assert!(matches!(decls[0], Decl::Ignored(_)));
        let Decl::Clause(c) = &decls[1] else {
            panic!("{decls:?}");
        };
        assert_eq!(c.body.display(&a).to_string(), "(:-) p ((<+>) ((<+>) a b) c)");
        let op = a.lookup("<+>").unwrap();
        assert_eq!(a.precedence_of(op).unwrap(), (Fixity::Infixl, 100));
    }

    #[test]
    fn fixity_declaration_names_several_operators() {
        let mut a = arena();
        let decls = parse(&mut a, "infixr <+ +> ++ 120.\np :- a <+ b +> c.");
        assert_eq!(decls.len(), 2);
        for name in ["<+", "+>", "++"] {
            let op = a.lookup(name).unwrap();
            assert_eq!(a.precedence_of(op).unwrap(), (Fixity::Infixr, 120));
        }
        let Decl::Clause(c) = &decls[1] else { panic!("{decls:?}") };
        assert_eq!(c.body.display(&a).to_string(), "(:-) p ((<+) a ((+>) b c))");
        let err = parse_err(&mut a, "infixl 120.");
        assert!(err.to_string().contains("without operators"), "{err}");
    }

    #[test]
    fn non_associative_declaration_rejects_chains() {
        let mut a = arena();
        let err = parse_err(&mut a, "infix <+> 100.\np :- a <+> b <+> c.");
        assert!(err.to_string().contains("non-associative"), "{err}");
        assert_eq!(err.loc().map(|l| l.line), Some(2));
    }

    #[test]
    fn conflicting_fixity_redeclaration_fails() {
        let mut a = arena();
        let err = parse_err(&mut a, "infixr + 160.");
        assert!(err.loc().is_some());
        assert!(err.to_string().contains("re-declare"), "{err}");
    }

    #[test]
    fn types_modes_and_preds() {
        let mut a = arena();
        let decls = parse(
            &mut a,
            "type foo, bar int -> prop.\nmode (foo i).\n:index(1 _) pred len i:list A, o:int.",
        );
        let Decl::Type(ts) = &decls[0] else { panic!() };
        assert_eq!(ts.len(), 2);
        assert_eq!(ts[1].ty.display(&a).to_string(), "(->) int prop");
        let Decl::Mode(ms) = &decls[1] else { panic!() };
        assert_eq!(ms[0].args, [true]);
        let Decl::Mode(ms) = &decls[2] else { panic!() };
        assert_eq!(ms[0].args, [true, false]);
        let Decl::Type(ts) = &decls[3] else { panic!() };
        assert_eq!(ts[0].attributes, [Attribute::Index(vec![1, 0])]);
        assert_eq!(
            ts[0].ty.display(&a).to_string(),
            "(->) (list A) ((->) int prop)"
        );
    }

    #[test]
    fn external_and_operator_names() {
        let mut a = arena();
        let decls = parse(&mut a, "external pred print i:A.\ntype (+) int -> int -> int.");
        let Decl::Type(ts) = &decls[1] else { panic!() };
        assert_eq!(ts[0].attributes, [Attribute::External]);
        let Decl::Type(ts) = &decls[2] else { panic!() };
        assert_eq!(a.show(ts[0].name), "+");
    }

    #[test]
    fn typed_locals() {
        let mut a = arena();
        let decls = parse(&mut a, "{ local x, y int. }");
        assert!(matches!(&decls[1], Decl::Local(_, names) if names.len() == 2));
        assert!(matches!(&decls[2], Decl::Type(ts) if ts.len() == 2));
    }

    #[test]
    fn macros_are_abstracted() {
        let mut a = arena();
        let decls = parse(&mut a, "macro @twice X :- (X, X).");
        let Decl::Macro(m) = &decls[0] else { panic!() };
        assert_eq!(a.show(m.name), "@twice");
        assert_eq!(m.body.display(&a).to_string(), "X\\ (,) X X");
    }

    #[test]
    fn type_abbreviations() {
        let mut a = arena();
        let decls = parse(&mut a, "typeabbrev (pair A) (list A).\ntypeabbrev num int.");
        let Decl::TypeAbbreviation(t) = &decls[0] else { panic!() };
        assert_eq!(t.nparams, 1);
        assert_eq!(t.value.display(&a).to_string(), "A\\ list A");
        let Decl::TypeAbbreviation(t) = &decls[1] else { panic!() };
        assert_eq!(t.nparams, 0);
    }

    #[test]
    fn constraint_rules() {
        let mut a = arena();
        let decls = parse(
            &mut a,
            "constraint leq {\n:name \"trans\" rule (leq A B) \\ (E : C ?- leq B A) | (A = B) <=> (C ?- true).\n}",
        );
        let Decl::Chr(r) = &decls[1] else { panic!("{decls:?}") };
        assert_eq!(r.to_match.len(), 1);
        assert_eq!(r.to_remove.len(), 1);
        assert_eq!(r.to_remove[0].eigen.display(&a).to_string(), "E");
        assert_eq!(r.to_remove[0].context.display(&a).to_string(), "C");
        assert!(r.guard.is_some());
        let new_goal = r.new_goal.as_ref().unwrap();
        assert_eq!(new_goal.conclusion, Term::Const(Symbol::TRUE));
        assert_eq!(r.attributes, [Attribute::Name("trans".into())]);
    }

    #[test]
    fn shorten_names() {
        let mut a = arena();
        let decls = parse(&mut a, "shorten std.map.{ find, add }.");
        let Decl::Shorten(_, s) = &decls[0] else { panic!() };
        assert_eq!(a.show(s[0].full_name), "std.map.find");
        assert_eq!(a.show(s[1].short_name), "add");
    }

    #[test]
    fn misplaced_attributes_fail() {
        let mut a = arena();
        assert!(parse_err(&mut a, ":name \"x\" namespace n {").to_string().contains("attributes"));
        assert!(parse_err(&mut a, ":bogus p.").to_string().contains("unknown attribute"));
    }

    #[test]
    fn missing_end_is_reported() {
        let mut a = arena();
        let err = parse_err(&mut a, "p X");
        assert!(err.to_string().contains("expected end of declaration"), "{err}");
    }
}
