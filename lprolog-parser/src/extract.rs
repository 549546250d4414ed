//! Lookup of string constants embedded in a parsed program.

use lprolog_ast::{Arena, Decl, Symbol, Term};

/// Returns the string of the first fact `name "s"` or macro `@name :- "s"`,
/// searching accumulated units in place.
pub fn extract_literal(arena: &Arena, program: &[Decl], name: &str) -> Option<String> {
    let fact = arena.lookup(name);
    let mac = arena.lookup(&format!("@{name}"));
    find(program, fact, mac)
}

fn find(program: &[Decl], fact: Option<Symbol>, mac: Option<Symbol>) -> Option<String> {
    program.iter().find_map(|decl| match decl {
        Decl::Clause(c) => match c.body.args() {
            [Term::CData(d)] if fact.is_some() && c.body.head_symbol() == fact => {
                d.as_str().map(str::to_string)
            }
            _ => None,
        },
        Decl::Macro(m) if Some(m.name) == mac => match &m.body {
            Term::CData(d) => d.as_str().map(str::to_string),
            _ => None,
        },
        Decl::Accumulated(_, parts) => parts.iter().find_map(|(_, decls)| find(decls, fact, mac)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryLoader, parse_str};

    #[test]
    fn facts_macros_and_accumulated_units() {
        let mut arena = Arena::new();
        arena.define_default_opers().unwrap();
        let mut loader = MemoryLoader::new();
        loader.insert("lib.lp", "macro @banner :- \"hello\".\n");
        let program = parse_str(
            &mut arena,
            &mut loader,
            "main.lp",
            "version \"1.2\".\nversion 3.\naccumulate lib.\n",
        )
        .unwrap();
        assert_eq!(extract_literal(&arena, &program, "version").as_deref(), Some("1.2"));
        assert_eq!(extract_literal(&arena, &program, "banner").as_deref(), Some("hello"));
        assert_eq!(extract_literal(&arena, &program, "missing"), None);
    }
}
