//! Grammar bootstrap.
//!
//! [`init`] installs the built-in operators and parses the pervasive
//! declarations (kinds, types and modes of the built-in predicates) into
//! an arena, once.

use crate::{NoLoader, ParseError, parse_str};
use lprolog_ast::Arena;
use lprolog_ast::program::Program;
use log::Level;

/// Surface grammar variant. Both produce the same AST.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxVariant {
    #[default]
    Standard,
    /// Older surface syntax with a few extra operators.
    ///
    /// `&` as conjunction is not specific to it: the symbol table reads `&`
    /// as `,` in every variant.
    Legacy,
}

/// Bootstrap configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Report bootstrap progress at `info` level rather than `debug`.
    pub verbose: bool,
    pub syntax: SyntaxVariant,
}

impl ParserConfig {
    fn level(&self) -> Level {
        if self.verbose { Level::Info } else { Level::Debug }
    }
}

const PERVASIVES_NAME: &str = "<pervasives>";

pub const PERVASIVES: &str = r#"
% Kinds.
kind prop, int, float, string type.
kind list type -> type.

% Logical connectives.
type true, fail, ! prop.
type (,), (;), (:-), (=>) prop -> prop -> prop.
type pi, sigma (A -> prop) -> prop.

% Lists.
type nil list A.
type (::) A -> list A -> list A.

% Comparison and evaluation.
type (=), (==), (is) A -> A -> prop.
type (<), (>), (=<), (>=) A -> A -> prop.
mode (is o i).

% Arithmetic.
type (+), (*), div, mod int -> int -> int.
type (/) float -> float -> float.
type (~) int -> int.
type (^) string -> string -> string.

% Builtins.
external pred print i:A.
external pred halt.
type main prop.
"#;

pub const LEGACY_PERVASIVES: &str = r#"
infixl rem 170.
infixl xor 160.
infix =:= 140.
infix ~= 140.

type rem, xor int -> int -> int.
type (=:=), (~=) A -> A -> prop.
"#;

/// Installs the operator baseline and parses the pervasive declarations.
///
/// Runs once per arena: later calls log and return an empty program.
pub fn init(arena: &mut Arena, config: &ParserConfig) -> Result<Program, ParseError> {
    let level = config.level();
    if !arena.begin_bootstrap() {
        log::log!(level, "pervasives already loaded");
        return Ok(Vec::new());
    }
    arena.define_default_opers()?;
    let mut program = parse_str(arena, &mut NoLoader, PERVASIVES_NAME, PERVASIVES)?;
    if config.syntax == SyntaxVariant::Legacy {
        program.extend(parse_str(arena, &mut NoLoader, PERVASIVES_NAME, LEGACY_PERVASIVES)?);
    }
    let stats = arena.stats();
    log::log!(
        level,
        "pervasives loaded ({:?}): {} declarations, {} operators, {} symbols",
        config.syntax,
        program.len(),
        stats.operators,
        stats.symbols,
    );
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_term_str;
    use lprolog_ast::{Decl, Fixity, Symbol};

    fn init_log() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn bootstrap_is_idempotent() {
        init_log();
        let mut arena = Arena::new();
        let program = init(&mut arena, &ParserConfig::default()).unwrap();
        assert!(!program.is_empty());
        assert!(arena.is_bootstrapped());
        let before = arena.stats();
        let again = init(&mut arena, &ParserConfig::default()).unwrap();
        assert!(again.is_empty());
        assert_eq!(arena.stats(), before);
    }

    #[test]
    fn pervasive_types_name_builtins() {
        init_log();
        let mut arena = Arena::new();
        let program = init(&mut arena, &ParserConfig::default()).unwrap();
        let names: Vec<Symbol> = program
            .iter()
            .filter_map(|d| match d {
                Decl::Type(ts) => Some(ts.iter().map(|t| t.name)),
                _ => None,
            })
            .flatten()
            .collect();
        for s in [Symbol::AND, Symbol::PI, Symbol::NIL, Symbol::CONS, Symbol::PROP, Symbol::MAIN] {
            assert!(names.contains(&s), "{}", arena.show(s));
        }
    }

    #[test]
    fn legacy_adds_operators() {
        init_log();
        let mut arena = Arena::new();
        let config = ParserConfig {
            verbose: true,
            syntax: SyntaxVariant::Legacy,
        };
        init(&mut arena, &config).unwrap();
        let xor = arena.lookup("xor").unwrap();
        assert_eq!(arena.precedence_of(xor).unwrap(), (Fixity::Infixl, 160));
        let t = parse_term_str(&mut arena, "a xor b").unwrap();
        assert_eq!(t.head_symbol(), Some(xor));

        let mut standard = Arena::new();
        init(&mut standard, &ParserConfig::default()).unwrap();
        assert!(standard.lookup("xor").is_none());
    }

    #[test]
    fn ampersand_is_conjunction_in_every_variant() {
        init_log();
        for syntax in [SyntaxVariant::Standard, SyntaxVariant::Legacy] {
            let mut arena = Arena::new();
            init(&mut arena, &ParserConfig { verbose: false, syntax }).unwrap();
            let t = parse_term_str(&mut arena, "a & b").unwrap();
            assert_eq!(t.head_symbol(), Some(Symbol::AND), "{syntax:?}");
            assert_eq!(t.display(&arena).to_string(), "(,) a b");
        }
    }
}
