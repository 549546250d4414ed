//! Flat programs: the declaration list produced by the parser.
//!
//! Block markers (`Begin`, `Namespace`, `Constraint`, `Shorten`, `End`) are
//! kept as separate declarations; nesting is resolved later by
//! [`structure`](crate::structure). Accumulated units carry the digest of
//! their source text so repeated inclusion can be detected before any
//! structure is imposed.

use crate::{Loc, Symbol, Term};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// A clause or rule attribute, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Attribute {
    /// `:name "n"`
    Name(String),
    /// `:after "n"`
    After(String),
    /// `:before "n"`
    Before(String),
    /// `:if "FLAG"`
    If(String),
    External,
    /// `:index(1 0 2)`
    Index(Vec<usize>),
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::Name(s) => write!(f, ":name {s:?}"),
            Attribute::After(s) => write!(f, ":after {s:?}"),
            Attribute::Before(s) => write!(f, ":before {s:?}"),
            Attribute::If(s) => write!(f, ":if {s:?}"),
            Attribute::External => f.write_str(":external"),
            Attribute::Index(ix) => {
                f.write_str(":index(")?;
                for (i, n) in ix.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{n}")?;
                }
                f.write_str(")")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause<A> {
    pub loc: Loc,
    pub attributes: A,
    pub body: Term,
}

/// `eigen : context ?- conclusion`, one side of a constraint rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequent {
    pub eigen: Term,
    pub context: Term,
    pub conclusion: Term,
}

/// A constraint-handling rule `to_match \ to_remove | guard <=> new_goal`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chr<A> {
    pub to_match: Vec<Sequent>,
    pub to_remove: Vec<Sequent>,
    pub guard: Option<Term>,
    pub new_goal: Option<Sequent>,
    pub attributes: A,
    pub loc: Loc,
}

/// `macro @name X Y :- body`, with `body` abstracted over the parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub loc: Loc,
    pub name: Symbol,
    pub body: Term,
}

/// Argument modes of a predicate; `true` marks an input argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mode {
    pub loc: Loc,
    pub name: Symbol,
    pub args: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type<A> {
    pub loc: Loc,
    pub attributes: A,
    pub name: Symbol,
    pub ty: Term,
}

/// `typeabbrev (name A B) value`, with `value` abstracted over the
/// `nparams` parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAbbreviation {
    pub loc: Loc,
    pub name: Symbol,
    pub value: Term,
    pub nparams: usize,
}

/// `full_name` may be referred to as `short_name` in the enclosing scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shorthand {
    pub loc: Loc,
    pub full_name: Symbol,
    pub short_name: Symbol,
}

/// SHA-256 of the text of an accumulated unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digest(pub [u8; 32]);

impl Digest {
    pub fn of(text: &str) -> Self {
        Digest(Sha256::digest(text.as_bytes()).into())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// One flat declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    /// `{`
    Begin(Loc),
    /// `namespace n {`
    Namespace(Loc, Symbol),
    /// `constraint c1 c2 {`
    Constraint(Loc, Vec<Symbol>),
    Shorten(Loc, Vec<Shorthand>),
    /// `}`
    End(Loc),
    /// Units pulled in by `accumulate`, each with the digest of its text.
    Accumulated(Loc, Vec<(Digest, Vec<Decl>)>),
    Clause(Clause<Vec<Attribute>>),
    Local(Loc, Vec<Symbol>),
    Mode(Vec<Mode>),
    Chr(Chr<Vec<Attribute>>),
    Macro(Macro),
    Type(Vec<Type<Vec<Attribute>>>),
    TypeAbbreviation(TypeAbbreviation),
    /// A directive with no declarative content, such as a fixity declaration.
    Ignored(Loc),
}

impl Decl {
    /// Source location of the declaration, when it has a single one.
    pub fn loc(&self) -> Option<&Loc> {
        match self {
            Decl::Begin(loc)
            | Decl::Namespace(loc, _)
            | Decl::Constraint(loc, _)
            | Decl::Shorten(loc, _)
            | Decl::End(loc)
            | Decl::Accumulated(loc, _)
            | Decl::Local(loc, _)
            | Decl::Ignored(loc) => Some(loc),
            Decl::Clause(c) => Some(&c.loc),
            Decl::Chr(c) => Some(&c.loc),
            Decl::Macro(m) => Some(&m.loc),
            Decl::TypeAbbreviation(t) => Some(&t.loc),
            Decl::Mode(ms) => ms.first().map(|m| &m.loc),
            Decl::Type(ts) => ts.first().map(|t| &t.loc),
        }
    }
}

/// A flat program.
pub type Program = Vec<Decl>;

/// A query, as parsed by the goal entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    pub loc: Loc,
    pub term: Term,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_stable_hex() {
        let d = Digest::of("");
        assert_eq!(
            d.to_string(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(Digest::of("p."), Digest::of("p."));
        assert_ne!(Digest::of("p."), Digest::of("q."));
    }

    #[test]
    fn attributes_print_as_written() {
        assert_eq!(Attribute::Name("c1".into()).to_string(), ":name \"c1\"");
        assert_eq!(Attribute::Index(vec![1, 0, 2]).to_string(), ":index(1 0 2)");
        assert_eq!(Attribute::External.to_string(), ":external");
    }

    #[test]
    fn decl_locations() {
        let loc = Loc::initial("u");
        assert_eq!(Decl::End(loc.clone()).loc(), Some(&loc));
        assert_eq!(Decl::Mode(Vec::new()).loc(), None);
    }
}
