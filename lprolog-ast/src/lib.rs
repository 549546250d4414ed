//! # lprolog AST
//!
//! Terms, declarations and programs of a higher-order logic-programming
//! language, together with the tables the parser consults while building
//! them.
//!
//! The central type is [`Arena`]: it interns names into [`Symbol`]
//! handles, holds the live operator table that grammar declarations extend,
//! and pools string literals. Everything that builds terms goes through an
//! arena, and everything that reads them back (display, operator lookup)
//! needs the same arena.
//!
//! A parser produces a flat [`program::Program`], a list of [`Decl`]s in
//! which block markers are separate entries. [`structure`] nests it into a
//! [`structured::Program`] tree.
//!
//! ## Example
//! ```rust
//! use lprolog_ast::{Arena, Fixity, Loc, Symbol, Term, mk_seq};
//! let mut arena = Arena::new();
//! arena.define_default_opers().unwrap();
//! assert_eq!(arena.precedence_of(Symbol::CONS).unwrap(), (Fixity::Infixr, 150));
//!
//! let p = arena.mk_con("p");
//! let x = arena.mk_con("X");
//! let list = mk_seq(vec![x.clone(), Term::NIL]);
//! let goal = arena.mk_app(&Loc::initial("demo"), vec![p, list]).unwrap();
//! assert_eq!(goal.display(&arena).to_string(), "p [X]");
//! ```
//!
//! ## License
//!
//! Copyright (c) 2025 the lprolog authors
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).

mod arena;
pub mod cdata;
mod display;
mod error;
mod loc;
mod oper;
pub mod program;
pub mod structured;
mod symbol;
mod term;

pub use arena::{Arena, ArenaStats};
pub use cdata::{CData, CDataType};
pub use display::TermDisplay;
pub use error::TermError;
pub use loc::Loc;
pub use oper::{
    APPL_PRECEDENCE, Assoc, Fixity, INF_PRECEDENCE, LAM_PRECEDENCE, LIST_ELEMENT_PRECEDENCE,
    MAX_OPER_PREC, MIN_OPER_PREC, MIN_PRECEDENCE, OperDef, OperDefTab, OperDefs, Placement,
};
pub use program::{
    Attribute, Chr, Clause, Decl, Digest, Goal, Macro, Mode, Sequent, Shorthand, Type,
    TypeAbbreviation,
};
pub use structured::structure;
pub use symbol::{Symbol, SymbolTable};
pub use term::{Quote, Term, mk_quoted, mk_seq};
