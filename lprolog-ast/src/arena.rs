//! Defines the [`Arena`] type, the context every parsing and construction
//! step runs against.
//!
//! An arena owns the symbol table, the operator table and the pool of
//! hash-consed strings. Terms only hold [`Symbol`] handles, so a term must
//! be read back (shown, displayed, re-parsed against) with the arena that
//! built it.

use crate::cdata::STRING;
use crate::{CData, Loc, OperDefs, Symbol, SymbolTable, Term, TermError, anomaly, bail_syntax};
use indexmap::IndexMap;
use std::sync::Arc;

/// Owns all interned data of a parsing session.
///
/// Grammar extension is a mutation of the arena, so everything that may
/// declare operators takes `&mut Arena`; a shared `&Arena` is enough to
/// read terms back.
///
/// ```
/// use lprolog_ast::{Arena, Fixity, Loc, Term};
/// let mut arena = Arena::new();
/// let plus = arena.define_oper("+", Fixity::Infixl, 160).unwrap();
/// let a = arena.mk_con("a");
/// let b = arena.mk_con("b");
/// let t = arena
///     .mk_app(&Loc::initial("demo"), vec![Term::Const(plus), a, b])
///     .unwrap();
/// assert_eq!(t.display(&arena).to_string(), "(+) a b");
/// ```
#[derive(Default, Clone, Debug)]
pub struct Arena {
    pub(crate) symbols: SymbolTable,

    /// Operator definitions associated with this arena.
    pub(crate) opers: OperDefs,

    /// Hash-consed string literals, keyed by their text.
    pub(crate) strings: IndexMap<Arc<str>, CData>,

    /// Set once the pervasive baseline has been loaded.
    bootstrapped: bool,
}

/// Sizes of the tables of an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    pub symbols: usize,
    pub operators: usize,
    pub strings: usize,
}

impl Arena {
    /// Create a new arena holding only the well-known symbols.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            symbols: self.symbols.len(),
            operators: self.opers.len(),
            strings: self.strings.len(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Interns `name`. See [`SymbolTable::intern`].
    #[inline]
    pub fn intern(&mut self, name: &str) -> Symbol {
        self.symbols.intern(name)
    }

    #[inline]
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.symbols.lookup(name)
    }

    /// Text of `symbol`.
    #[inline]
    pub fn show(&self, symbol: Symbol) -> &str {
        self.symbols.show(symbol)
    }

    /// A fresh unification variable, `_-N`.
    pub fn fresh_var(&mut self) -> Term {
        Term::Const(self.symbols.fresh_var())
    }

    /// A fresh constant name, `__-N`.
    pub fn fresh_name(&mut self) -> Symbol {
        self.symbols.fresh_name()
    }

    /// Marks the pervasive baseline as loaded.
    ///
    /// Returns `false` if it already was, in which case the caller must not
    /// load it again.
    pub fn begin_bootstrap(&mut self) -> bool {
        !std::mem::replace(&mut self.bootstrapped, true)
    }

    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped
    }

    /// A constant named `name`.
    pub fn mk_con(&mut self, name: &str) -> Term {
        Term::Const(self.intern(name))
    }

    /// Abstraction of `body` over the variable `name`.
    pub fn mk_lam(&mut self, name: &str, body: Term) -> Term {
        Term::Lam(self.intern(name), Box::new(body))
    }

    pub fn mk_int(&self, i: i64) -> CData {
        CData::int(i)
    }

    pub fn mk_float(&self, x: f64) -> CData {
        CData::float(x)
    }

    /// A string literal sharing its allocation with every equal literal
    /// built through this arena.
    pub fn mk_string(&mut self, s: &str) -> CData {
        if let Some(data) = self.strings.get(s) {
            return data.clone();
        }
        let text: Arc<str> = Arc::from(s);
        let data = CData::from_shared(&STRING, Arc::new(text.clone()));
        self.strings.insert(text, data.clone());
        data
    }

    pub fn mk_loc(&self, loc: Loc) -> CData {
        CData::loc(loc)
    }

    /// Builds the application of `terms[0]` to `terms[1..]`.
    ///
    /// - A single constant, application or quotation is returned unchanged.
    /// - An application head absorbs the remaining terms as extra arguments.
    /// - A constant or quotation head becomes the head of a new application.
    ///
    /// # Errors
    /// Any other head (a lambda, a literal) is a syntax error at `loc`.
    ///
    /// # Panics
    /// Panics on an empty list.
    pub fn mk_app(&self, loc: &Loc, mut terms: Vec<Term>) -> Result<Term, TermError> {
        if terms.is_empty() {
            anomaly!("mk_app: empty application");
        }
        let rest = terms.split_off(1);
        let head = terms.remove(0);
        match head {
            Term::App(..) | Term::Const(_) | Term::Quoted(_) if rest.is_empty() => Ok(head),
            Term::App(h, mut args) => {
                args.extend(rest);
                Ok(Term::App(h, args))
            }
            Term::Const(_) | Term::Quoted(_) => Ok(Term::App(Box::new(head), rest)),
            other => {
                bail_syntax!(
                    loc,
                    "cannot apply {} {}",
                    other.kind_name(),
                    other.display(self)
                );
            }
        }
    }
}
