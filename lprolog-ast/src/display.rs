//! Defines [`TermDisplay`], a structural formatter for [`Term`] values.
//!
//! The output is meant for diagnostics and for the command-line tool: it
//! shows the tree shape without consulting operator fixities. Applications
//! print in prefix form, so `a + b` shows as `(+) a b`; cons cells ending in
//! `[]` print as list literals.

use crate::{Arena, Symbol, Term};
use std::fmt;

/// A wrapper that ties together a [`Term`] and its [`Arena`].
///
/// It implements [`fmt::Display`], so it can be used with the standard
/// formatting macros:
///
/// ```rust
/// use lprolog_ast::Arena;
/// let mut arena = Arena::new();
/// let f = arena.mk_con("f");
/// let t = arena.mk_lam("x", f);
/// assert_eq!(t.display(&arena).to_string(), "x\\ f");
/// ```
///
/// Construct instances via [`Term::display`] or [`Arena::display`].
pub struct TermDisplay<'a> {
    term: &'a Term,
    arena: &'a Arena,
}

impl Term {
    /// Return a [`TermDisplay`] suitable for formatting with [`fmt::Display`].
    #[inline]
    pub fn display<'a>(&'a self, arena: &'a Arena) -> TermDisplay<'a> {
        TermDisplay { term: self, arena }
    }
}

impl Arena {
    #[inline]
    pub fn display<'a>(&'a self, term: &'a Term) -> TermDisplay<'a> {
        term.display(self)
    }
}

/// Returns `true` if `s` reads back as a plain constant.
fn is_plain_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '@' => {}
        _ => return matches!(s, "[]" | "!"),
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '\'' | '.' | '-'))
}

fn write_name(f: &mut fmt::Formatter<'_>, arena: &Arena, s: Symbol) -> fmt::Result {
    let name = arena.show(s);
    if is_plain_name(name) {
        f.write_str(name)
    } else {
        write!(f, "({name})")
    }
}

/// Writes `t`, parenthesised when it would not read back as one argument.
fn write_arg(f: &mut fmt::Formatter<'_>, arena: &Arena, t: &Term) -> fmt::Result {
    match t {
        Term::App(h, _) if h.as_const() == Some(Symbol::CONS) => {
            write!(f, "{}", t.display(arena))
        }
        Term::App(..) | Term::Lam(..) => write!(f, "({})", t.display(arena)),
        _ => write!(f, "{}", t.display(arena)),
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, arena: &Arena, mut t: &Term) -> fmt::Result {
    f.write_str("[")?;
    let mut first = true;
    while let Some([head, tail]) = t.unpack_app(Symbol::CONS) {
        if !first {
            f.write_str(", ")?;
        }
        first = false;
        write!(f, "{}", head.display(arena))?;
        t = tail;
    }
    if *t != Term::NIL {
        f.write_str(" | ")?;
        write!(f, "{}", t.display(arena))?;
    }
    f.write_str("]")
}

impl<'a> fmt::Display for TermDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = self.arena;
        match self.term {
            Term::Const(s) => write_name(f, arena, *s),
            Term::App(h, args) if h.as_const() == Some(Symbol::CONS) && args.len() == 2 => {
                write_list(f, arena, self.term)
            }
            Term::App(h, args) => {
                write_arg(f, arena, h)?;
                for a in args {
                    f.write_str(" ")?;
                    write_arg(f, arena, a)?;
                }
                Ok(())
            }
            Term::Lam(x, body) => {
                write_name(f, arena, *x)?;
                write!(f, "\\ {}", body.display(arena))
            }
            Term::CData(c) => write!(f, "{c}"),
            Term::Quoted(q) => match &q.kind {
                Some(kind) => write!(f, "{{{{kind:{kind} {}}}}}", q.data),
                None => write!(f, "{{{{{}}}}}", q.data),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Arena, Loc, Term, mk_quoted, mk_seq};

    #[test]
    fn operators_are_parenthesised() {
        let mut arena = Arena::new();
        let plus = arena.mk_con("+");
        let a = arena.mk_con("a");
        let b = arena.mk_con("b");
        let t = arena.mk_app(&Loc::initial("t"), vec![plus, a, b]).unwrap();
        assert_eq!(t.display(&arena).to_string(), "(+) a b");
    }

    #[test]
    fn nested_applications_are_parenthesised() {
        let mut arena = Arena::new();
        let f = arena.mk_con("f");
        let g = arena.mk_con("g");
        let x = arena.mk_con("X");
        let loc = Loc::initial("t");
        let gx = arena.mk_app(&loc, vec![g, x]).unwrap();
        let t = arena.mk_app(&loc, vec![f, gx]).unwrap();
        assert_eq!(arena.display(&t).to_string(), "f (g X)");
    }

    #[test]
    fn lists_print_as_literals() {
        let mut arena = Arena::new();
        let a = arena.mk_con("a");
        let b = arena.mk_con("b");
        let t = arena.mk_con("T");
        let closed = mk_seq(vec![a.clone(), b.clone(), Term::NIL]);
        let open = mk_seq(vec![a, b, t]);
        assert_eq!(closed.display(&arena).to_string(), "[a, b]");
        assert_eq!(open.display(&arena).to_string(), "[a, b | T]");
        assert_eq!(Term::NIL.display(&arena).to_string(), "[]");
    }

    #[test]
    fn literals_and_quotations() {
        let mut arena = Arena::new();
        let s = Term::CData(arena.mk_string("hi"));
        assert_eq!(s.display(&arena).to_string(), "\"hi\"");
        let raw = "{{kind:x y}}";
        let q = mk_quoted(&Loc::initial("t"), raw).unwrap();
        assert_eq!(q.display(&arena).to_string(), "{{kind:x y}}");
    }
}
