//! # lprolog-parser
//!
//! Operator-precedence parser for a higher-order logic programming language.
//!
//! The grammar is extensible at parse time: `infixl`, `infixr`, `infix`,
//! `prefix` and `postfix` declarations update the operator table of the
//! [`Arena`] and take effect for every following term. Parsing is single
//! pass and does not recover: the first error abandons the unit.
//!
//! ## Entry points
//! - [`parse_program`]: named units through a [`Loader`], each wrapped in an
//!   `Accumulated` declaration with its digest.
//! - [`parse_str`]: one unit given as text.
//! - [`parse_goal`]: a single query.
//! - [`pervasives::init`]: operator baseline and built-in declarations.
//!
//! ## Example
//! ```rust
//! use lprolog_ast::Arena;
//! use lprolog_parser::{NoLoader, ParserConfig, init, parse_str};
//!
//! let mut arena = Arena::new();
//! init(&mut arena, &ParserConfig::default()).unwrap();
//! let program = parse_str(&mut arena, &mut NoLoader, "demo.lp", "infixl ++ 160.\np :- a ++ b.").unwrap();
//! assert_eq!(program.len(), 2);
//! ```
//!
//! ## License
//!
//! Copyright (c) 2025 the lprolog authors
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).

mod accumulate;
mod decl;
mod error;
pub mod extract;
mod lexer;
mod parser;
pub mod pervasives;
mod token;

pub use accumulate::{FsLoader, Loader, MemoryLoader, NoLoader, SOURCE_EXTENSION, Source};
pub use error::ParseError;
pub(crate) use error::bail;
pub use extract::extract_literal;
pub use lexer::Lexer;
pub use parser::Parser;
pub use pervasives::{ParserConfig, SyntaxVariant, init};
pub use token::{Token, TokenKind};

use lprolog_ast::program::{Goal, Program};
use lprolog_ast::{Arena, Decl, Loc, Term};
use std::collections::HashSet;

/// Location used for units named on the command line.
const TOP_LEVEL: &str = "<command line>";

/// Parses one term, optionally followed by `.`.
pub fn parse_term_str(arena: &mut Arena, text: &str) -> Result<Term, ParseError> {
    parse_goal(arena, "<term>", text).map(|goal| goal.term)
}

/// Parses a unit given as text. `accumulate` directives go through `loader`.
pub fn parse_str<L: Loader + ?Sized>(
    arena: &mut Arena,
    loader: &mut L,
    name: &str,
    text: &str,
) -> Result<Program, ParseError> {
    let mut seen = HashSet::new();
    let mut parser = Parser::new(arena, loader, &mut seen, Lexer::new(name, text));
    parser.parse_decls()
}

/// Parses the units `names`, in order, through `loader`.
///
/// Each unit becomes an `Accumulated` declaration. A unit whose text was
/// already read, directly or through `accumulate`, yields no declarations.
pub fn parse_program<L: Loader + ?Sized, S: AsRef<str>>(
    arena: &mut Arena,
    loader: &mut L,
    names: &[S],
) -> Result<Program, ParseError> {
    let loc = Loc::initial(TOP_LEVEL);
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let mut top = Parser::new(&mut *arena, &mut *loader, &mut seen, Lexer::new(TOP_LEVEL, ""));
        let unit = top.accumulate_unit(&loc, name.as_ref())?;
        out.push(Decl::Accumulated(loc.clone(), vec![unit]));
    }
    Ok(out)
}

/// Parses a single goal, optionally followed by `.`.
pub fn parse_goal(arena: &mut Arena, name: &str, text: &str) -> Result<Goal, ParseError> {
    let mut loader = NoLoader;
    let mut seen = HashSet::new();
    let mut parser = Parser::new(arena, &mut loader, &mut seen, Lexer::new(name, text));
    let start = parser.peek()?.loc.clone();
    let term = parser.parse_term()?;
    let loc = parser.span_from(&start);
    if parser.peek()?.kind == TokenKind::End {
        parser.next()?;
    }
    parser.expect(TokenKind::Eof)?;
    Ok(Goal { loc, term })
}
