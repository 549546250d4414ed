//! Operator fixities, precedences and the operator table.
//!
//! Operators may appear in prefix, infix, or postfix position; infix
//! operators are additionally left-, right- or non-associative. The
//! [`Fixity`] enum folds position and associativity together the way the
//! surface syntax declares them (`infixl`, `infixr`, `infix`, `prefix`,
//! `postfix`), while [`Placement`] and [`Assoc`] take them apart again for
//! the parser.
//!
//! Precedences grow with binding strength: an operator of precedence 170
//! binds tighter than one of precedence 160. User operators live in
//! [`MIN_OPER_PREC`]`..=`[`MAX_OPER_PREC`]; application, lambda binders and
//! the "no operator" sentinel sit above that range.
//!
//! The table is append-only. Once a symbol has a definition for a placement
//! that definition is final; re-declaring it identically is accepted so the
//! pervasive baseline can be loaded more than once.

use crate::{Arena, Symbol, TermError};
use indexmap::IndexMap;
use smartstring::alias::String;
use std::fmt;
use std::str::FromStr;

/// Minimal precedence in use; parsing a full term starts here.
pub const MIN_PRECEDENCE: i64 = 0;
/// Smallest precedence a user operator may be declared with.
pub const MIN_OPER_PREC: i64 = 0;
/// Largest precedence a user operator may be declared with.
pub const MAX_OPER_PREC: i64 = 256;
/// Precedence of application by juxtaposition.
pub const APPL_PRECEDENCE: i64 = MAX_OPER_PREC + 1;
/// Precedence at which a lambda binder `x\` is accepted.
///
/// It sits above application so that `pi x\ p x` reads as `pi` applied to
/// a lambda.
pub const LAM_PRECEDENCE: i64 = APPL_PRECEDENCE + 1;
/// Greater than every precedence in use; only atomic terms parse here.
pub const INF_PRECEDENCE: i64 = LAM_PRECEDENCE + 1;
/// Precedence at which list elements are parsed, just above `,`.
pub const LIST_ELEMENT_PRECEDENCE: i64 = 111;

/// Declared fixity of an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Fixity {
    /// Left-associative infix, `a + b + c` is `(a + b) + c`.
    Infixl = 0,
    /// Right-associative infix, `a :: b :: c` is `a :: (b :: c)`.
    Infixr = 1,
    /// Non-associative infix; chaining requires parentheses.
    Infix = 2,
    Prefix = 3,
    Postfix = 4,
}

impl Fixity {
    /// The total number of fixity variants.
    pub const COUNT: usize = 5;

    /// Declaration keywords of each variant, in declaration order.
    pub const STRS: &[&str] = &["infixl", "infixr", "infix", "prefix", "postfix"];

    /// Where the operator sits relative to its operands.
    pub fn placement(self) -> Placement {
        match self {
            Fixity::Infixl | Fixity::Infixr | Fixity::Infix => Placement::Infix,
            Fixity::Prefix => Placement::Prefix,
            Fixity::Postfix => Placement::Postfix,
        }
    }

    /// How operators of equal precedence group.
    ///
    /// Prefix operators nest to the right and postfix ones to the left.
    pub fn assoc(self) -> Assoc {
        match self {
            Fixity::Infixl | Fixity::Postfix => Assoc::Left,
            Fixity::Infixr | Fixity::Prefix => Assoc::Right,
            Fixity::Infix => Assoc::None,
        }
    }
}

impl From<Fixity> for usize {
    fn from(f: Fixity) -> Self {
        f as usize
    }
}

impl fmt::Display for Fixity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Fixity::STRS[usize::from(*self)])
    }
}

/// Parses a declaration keyword into a [`Fixity`].
impl FromStr for Fixity {
    type Err = TermError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "infixl" => Ok(Fixity::Infixl),
            "infixr" => Ok(Fixity::Infixr),
            "infix" => Ok(Fixity::Infix),
            "prefix" => Ok(Fixity::Prefix),
            "postfix" => Ok(Fixity::Postfix),
            other => Err(TermError::InvalidFixity(String::from(other))),
        }
    }
}

impl TryFrom<&str> for Fixity {
    type Error = TermError;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Operator associativity classification.
///
/// | Variant | Description |
/// |----------|--------------|
/// | [`Assoc::None`]  | Non-associative, cannot chain with itself. |
/// | [`Assoc::Left`]  | Left-associative, groups from left to right. |
/// | [`Assoc::Right`] | Right-associative, groups from right to left. |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Assoc {
    None = 0,
    Left = 1,
    Right = 2,
}

/// Rendered in associativity conflict messages.
impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Assoc::None => "none",
            Assoc::Left => "left",
            Assoc::Right => "right",
        })
    }
}

/// Syntactic slot of an operator; a symbol has at most one definition per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Placement {
    Prefix = 0,
    Infix = 1,
    Postfix = 2,
}

impl Placement {
    pub const COUNT: usize = 3;
}

/// A single operator definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperDef {
    pub fixity: Fixity,
    /// Binding strength, `MIN_OPER_PREC..=MAX_OPER_PREC`.
    pub prec: i64,
}

impl OperDef {
    #[inline]
    pub fn assoc(&self) -> Assoc {
        self.fixity.assoc()
    }

    #[inline]
    pub fn placement(&self) -> Placement {
        self.fixity.placement()
    }
}

/// Definitions of one symbol, indexed by [`Placement`].
#[derive(Debug, Clone, Default)]
pub struct OperDefTab {
    tab: [Option<OperDef>; Placement::COUNT],
    /// Placement of the first definition, reported by `precedence_of`.
    first: Option<Placement>,
}

/// Shared empty table returned for symbols without definitions.
static EMPTY_OPER_DEF_TAB: OperDefTab = OperDefTab::new();

impl OperDefTab {
    pub const fn new() -> Self {
        Self {
            tab: [None; Placement::COUNT],
            first: None,
        }
    }

    /// Returns `true` if at least one placement is defined.
    pub fn is_oper(&self) -> bool {
        self.first.is_some()
    }

    pub fn get(&self, placement: Placement) -> Option<&OperDef> {
        self.tab[placement as usize].as_ref()
    }

    /// The earliest definition of this symbol.
    pub fn first(&self) -> Option<&OperDef> {
        self.first.and_then(|p| self.get(p))
    }
}

impl std::ops::Index<Placement> for OperDefTab {
    type Output = Option<OperDef>;

    fn index(&self, i: Placement) -> &Self::Output {
        &self.tab[i as usize]
    }
}

/// Registry of all operator definitions, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct OperDefs {
    map: IndexMap<Symbol, OperDefTab>,
}

impl OperDefs {
    pub fn new() -> Self {
        Self {
            map: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// All definitions of `symbol`; empty when it is not an operator.
    pub fn tab(&self, symbol: Symbol) -> &OperDefTab {
        self.map.get(&symbol).unwrap_or(&EMPTY_OPER_DEF_TAB)
    }

    /// Definition of `symbol` in the given slot.
    pub fn get(&self, symbol: Symbol, placement: Placement) -> Option<&OperDef> {
        self.tab(symbol).get(placement)
    }
}

/// Operators available before any declaration is read.
///
/// ```text
/// infix  :- 1.      infix  ?- 2.
/// infixr ;  100.    infixr ,  110.     infixr -> 120.   infixr => 130.
/// infixr :  135.    infix  =  140. (and the other comparisons)
/// infixr :: 150.    infixl +  160.     infixl -  160.
/// infixl *  170.    infixl /  170.     infixl div 170.  infixl mod 170.
/// infixr ^  180.    prefix -  190.     prefix ~  190.
/// ```
const DEFAULT_OPERS: &[(&str, Fixity, i64)] = &[
    (":-", Fixity::Infix, 1),
    ("?-", Fixity::Infix, 2),
    (";", Fixity::Infixr, 100),
    (",", Fixity::Infixr, 110),
    ("->", Fixity::Infixr, 120),
    ("=>", Fixity::Infixr, 130),
    (":", Fixity::Infixr, 135),
    ("=", Fixity::Infix, 140),
    ("==", Fixity::Infix, 140),
    ("<", Fixity::Infix, 140),
    (">", Fixity::Infix, 140),
    ("=<", Fixity::Infix, 140),
    (">=", Fixity::Infix, 140),
    ("is", Fixity::Infix, 140),
    ("::", Fixity::Infixr, 150),
    ("+", Fixity::Infixl, 160),
    ("-", Fixity::Infixl, 160),
    ("*", Fixity::Infixl, 170),
    ("/", Fixity::Infixl, 170),
    ("div", Fixity::Infixl, 170),
    ("mod", Fixity::Infixl, 170),
    ("^", Fixity::Infixr, 180),
    ("-", Fixity::Prefix, 190),
    ("~", Fixity::Prefix, 190),
];

impl Arena {
    /// The live operator table.
    pub fn opers(&self) -> &OperDefs {
        &self.opers
    }

    /// Operator definition of `symbol` in the given slot, if any.
    #[inline]
    pub fn oper(&self, symbol: Symbol, placement: Placement) -> Option<&OperDef> {
        self.opers.get(symbol, placement)
    }

    /// Returns `true` if `symbol` has any operator definition.
    pub fn is_oper(&self, symbol: Symbol) -> bool {
        self.opers.tab(symbol).is_oper()
    }

    /// Fixity and precedence of `symbol`.
    ///
    /// When a symbol is defined in several slots (`-` is both prefix and
    /// infix) the earliest definition is reported.
    ///
    /// # Errors
    /// [`TermError::UnknownFixity`] when `symbol` is not an operator.
    pub fn precedence_of(&self, symbol: Symbol) -> Result<(Fixity, i64), TermError> {
        match self.opers.tab(symbol).first() {
            Some(def) => Ok((def.fixity, def.prec)),
            None => Err(TermError::UnknownFixity(String::from(self.show(symbol)))),
        }
    }

    /// Registers `name` as an operator.
    ///
    /// Subsequent parses through this arena see the new operator
    /// immediately.
    ///
    /// # Errors
    /// Fails if the precedence is out of range or if the slot of `fixity` is
    /// already taken by a different definition.
    pub fn define_oper(&mut self, name: &str, fixity: Fixity, prec: i64) -> Result<Symbol, TermError> {
        if !(MIN_OPER_PREC..=MAX_OPER_PREC).contains(&prec) {
            return Err(TermError::PrecedenceOutOfRange {
                name: String::from(name),
                prec,
                min: MIN_OPER_PREC,
                max: MAX_OPER_PREC,
            });
        }
        let symbol = self.intern(name);
        let def = OperDef { fixity, prec };
        let placement = fixity.placement();
        let tab = self.opers.map.entry(symbol).or_default();
        match tab.tab[placement as usize] {
            Some(old) if old == def => return Ok(symbol),
            Some(old) => {
                return Err(TermError::FixityRedefinition {
                    name: String::from(name),
                    old: format!("{} {}", old.fixity, old.prec).into(),
                    new: format!("{} {}", fixity, prec).into(),
                });
            }
            None => {}
        }
        tab.tab[placement as usize] = Some(def);
        tab.first.get_or_insert(placement);
        log::debug!("operator {:?} declared {} {}", name, fixity, prec);
        Ok(symbol)
    }

    /// Installs the built-in operator baseline.
    ///
    /// Safe to call repeatedly: identical definitions are accepted.
    pub fn define_default_opers(&mut self) -> Result<(), TermError> {
        for &(name, fixity, prec) in DEFAULT_OPERS {
            self.define_oper(name, fixity, prec)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixity_from_str_valid() {
        assert_eq!("infixl".parse::<Fixity>().unwrap(), Fixity::Infixl);
        assert_eq!("infixr".parse::<Fixity>().unwrap(), Fixity::Infixr);
        assert_eq!("infix".parse::<Fixity>().unwrap(), Fixity::Infix);
        assert_eq!("prefix".parse::<Fixity>().unwrap(), Fixity::Prefix);
        assert_eq!("postfix".parse::<Fixity>().unwrap(), Fixity::Postfix);
    }

    #[test]
    fn fixity_from_str_invalid() {
        let err = "pre_fix".parse::<Fixity>().unwrap_err();
        assert_eq!(err.to_string(), "invalid fixity: pre_fix");
    }

    #[test]
    fn fixity_display_round_trips() {
        for s in Fixity::STRS {
            assert_eq!(s.parse::<Fixity>().unwrap().to_string(), *s);
        }
        assert_eq!(Fixity::STRS.len(), Fixity::COUNT);
    }

    #[test]
    fn fixity_splits_into_placement_and_assoc() {
        assert_eq!(Fixity::Infixl.assoc(), Assoc::Left);
        assert_eq!(Fixity::Infixr.assoc(), Assoc::Right);
        assert_eq!(Fixity::Infix.assoc(), Assoc::None);
        assert_eq!(Fixity::Prefix.placement(), Placement::Prefix);
        assert_eq!(Fixity::Postfix.placement(), Placement::Postfix);
        assert_eq!(Fixity::Infix.placement(), Placement::Infix);
    }

    #[test]
    fn assoc_follows_fixity() {
        assert_eq!(Fixity::Infixl.assoc(), Assoc::Left);
        assert_eq!(Fixity::Infixr.assoc(), Assoc::Right);
        assert_eq!(Fixity::Infix.assoc(), Assoc::None);
        assert_eq!(Assoc::Left.to_string(), "left");
    }

    #[test]
    fn precedence_constants_are_ordered() {
        assert!(MIN_PRECEDENCE <= MIN_OPER_PREC);
        assert!(MAX_OPER_PREC < APPL_PRECEDENCE);
        assert!(MIN_PRECEDENCE < APPL_PRECEDENCE && APPL_PRECEDENCE < LAM_PRECEDENCE);
        assert!(LAM_PRECEDENCE < INF_PRECEDENCE);
        assert!(LIST_ELEMENT_PRECEDENCE > 110 && LIST_ELEMENT_PRECEDENCE < APPL_PRECEDENCE);
    }

    #[test]
    fn registered_operator_is_reported_exactly() {
        let mut arena = Arena::new();
        let plus = arena.define_oper("+++", Fixity::Infixl, 42).unwrap();
        assert_eq!(arena.precedence_of(plus).unwrap(), (Fixity::Infixl, 42));
        assert!(arena.is_oper(plus));
        assert_eq!(arena.oper(plus, Placement::Infix).unwrap().prec, 42);
        assert!(arena.oper(plus, Placement::Prefix).is_none());
    }

    #[test]
    fn unknown_symbol_has_no_fixity() {
        let mut arena = Arena::new();
        let foo = arena.intern("foo");
        let err = arena.precedence_of(foo).unwrap_err();
        assert!(matches!(err, TermError::UnknownFixity(ref n) if n == "foo"));
        assert!(!arena.is_oper(foo));
    }

    #[test]
    fn definitions_are_final() {
        let mut arena = Arena::new();
        arena.define_oper("+", Fixity::Infixl, 160).unwrap();
        arena.define_oper("+", Fixity::Infixl, 160).unwrap();
        let err = arena.define_oper("+", Fixity::Infixr, 160).unwrap_err();
        assert!(matches!(err, TermError::FixityRedefinition { .. }));
        let err = arena.define_oper("+", Fixity::Infixl, 10).unwrap_err();
        assert!(matches!(err, TermError::FixityRedefinition { .. }));
    }

    #[test]
    fn one_symbol_many_slots() {
        let mut arena = Arena::new();
        let minus = arena.define_oper("-", Fixity::Infixl, 160).unwrap();
        arena.define_oper("-", Fixity::Prefix, 190).unwrap();
        assert_eq!(arena.precedence_of(minus).unwrap(), (Fixity::Infixl, 160));
        assert_eq!(arena.oper(minus, Placement::Prefix).unwrap().prec, 190);
    }

    #[test]
    fn precedence_range_is_enforced() {
        let mut arena = Arena::new();
        let err = arena
            .define_oper("@@", Fixity::Infix, MAX_OPER_PREC + 1)
            .unwrap_err();
        assert!(matches!(err, TermError::PrecedenceOutOfRange { .. }));
    }

    #[test]
    fn default_opers_are_idempotent() {
        let mut arena = Arena::new();
        arena.define_default_opers().unwrap();
        let n = arena.opers().len();
        arena.define_default_opers().unwrap();
        assert_eq!(arena.opers().len(), n);
        assert_eq!(
            arena.precedence_of(Symbol::AND).unwrap(),
            (Fixity::Infixr, 110)
        );
    }
}
