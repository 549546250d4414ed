//! Hash-consed symbols.
//!
//! Every distinct name is interned once into a [`SymbolTable`] and
//! represented everywhere else by a copyable [`Symbol`] handle, so symbol
//! equality is an integer comparison. Tables only grow.
//!
//! A fixed set of well-known symbols is pre-seeded at the same indices in
//! every table, which lets them be used as constants such as
//! [`Symbol::CONS`] without a table at hand.
//!
//! # Aliases
//! Interning normalises a few legacy spellings: `nil` is `[]`, `cons` is
//! `::` and `&` is `,`.
//!
//! # Reserved names
//! Names made of `_` or `__` followed by `-` and a decimal number are
//! reserved for [`SymbolTable::fresh_var`] and [`SymbolTable::fresh_name`].
//! The lexer never produces an identifier containing `-`, so no parsed text
//! can collide with them.

use indexmap::IndexSet;
use smartstring::alias::String;
use std::fmt;

/// Handle of an interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub(crate) u32);

macro_rules! builtin_symbols {
    ( $( $(#[$meta:meta])* $name:ident = $text:literal ),+ $(,)? ) => {
        impl Symbol {
            builtin_symbols!(@consts 0u32; $( $(#[$meta])* $name ),+);
        }

        /// Texts of the pre-seeded symbols, in index order.
        pub(crate) const BUILTIN_NAMES: &[&str] = &[ $( $text ),+ ];
    };
    (@consts $n:expr; $(#[$meta:meta])* $name:ident $(, $(#[$rmeta:meta])* $rest:ident )* ) => {
        $(#[$meta])*
        pub const $name: Symbol = Symbol($n);
        builtin_symbols!(@consts $n + 1u32; $( $(#[$rmeta])* $rest ),*);
    };
    (@consts $n:expr; ) => {};
}

builtin_symbols! {
    /// The empty list `[]`.
    NIL = "[]",
    /// List constructor `::`.
    CONS = "::",
    /// Conjunction `,`.
    AND = ",",
    /// Disjunction `;`.
    OR = ";",
    /// Clause neck `:-`.
    RIMPL = ":-",
    /// Implication `=>`.
    IMPL = "=>",
    /// Type arrow `->`.
    ARROW = "->",
    /// Cut `!`.
    CUT = "!",
    /// Universal quantifier.
    PI = "pi",
    /// Existential quantifier.
    SIGMA = "sigma",
    EQ = "=",
    IS = "is",
    /// Anonymous variable as written in source.
    UNDERSCORE = "_",
    /// Spill marker for `{ t }`.
    SPILL = "#spill",
    /// Sequent separator in constraint rules.
    SEQUENT = "?-",
    COLON = ":",
    /// Type of propositions.
    PROP = "prop",
    /// Kind of types.
    TYPE = "type",
    CTYPE = "ctype",
    MAIN = "main",
    TRUE = "true",
    FAIL = "fail",
    /// Mode flag for input arguments.
    INPUT = "i",
    /// Mode flag for output arguments.
    OUTPUT = "o",
}

impl Symbol {
    /// Position of this symbol in its table.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is one of the pre-seeded symbols.
    #[inline]
    pub fn is_builtin(self) -> bool {
        self.index() < BUILTIN_NAMES.len()
    }
}

/// Maps a legacy spelling to its canonical text.
fn normalize(text: &str) -> &str {
    match text {
        "nil" => "[]",
        "cons" => "::",
        "&" => ",",
        other => other,
    }
}

/// Interning table mapping names to [`Symbol`]s.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    names: IndexSet<String>,
    next_var: i64,
    next_name: i64,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Creates a table holding only the well-known symbols.
    pub fn new() -> Self {
        let mut names = IndexSet::with_capacity(BUILTIN_NAMES.len() * 4);
        for name in BUILTIN_NAMES {
            names.insert(String::from(*name));
        }
        Self {
            names,
            next_var: 0,
            next_name: 0,
        }
    }

    /// Number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Interns `text`, returning the canonical handle.
    ///
    /// Idempotent: equal texts (after alias normalisation) always yield the
    /// same handle.
    pub fn intern(&mut self, text: &str) -> Symbol {
        let text = normalize(text);
        if let Some(index) = self.names.get_index_of(text) {
            return Symbol(index as u32);
        }
        let (index, _) = self.names.insert_full(String::from(text));
        Symbol(index as u32)
    }

    /// Looks a name up without interning it.
    pub fn lookup(&self, text: &str) -> Option<Symbol> {
        self.names
            .get_index_of(normalize(text))
            .map(|index| Symbol(index as u32))
    }

    /// Text of an interned symbol.
    ///
    /// # Panics
    /// Panics if `symbol` was minted by another table with more entries.
    pub fn show(&self, symbol: Symbol) -> &str {
        match self.names.get_index(symbol.index()) {
            Some(name) => name.as_str(),
            None => crate::anomaly!("symbol {} not in table of size {}", symbol.0, self.len()),
        }
    }

    /// Mints a unification variable name that is never produced by parsing.
    pub fn fresh_var(&mut self) -> Symbol {
        self.next_var -= 1;
        let name = format!("_{}", self.next_var);
        self.intern(&name)
    }

    /// Mints a constant name that is never produced by parsing.
    pub fn fresh_name(&mut self) -> Symbol {
        self.next_name -= 1;
        let name = format!("__{}", self.next_name);
        self.intern(&name)
    }
}

/// Renders a symbol as `#index`, for contexts without a table.
impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
