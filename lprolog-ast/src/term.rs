//! The term AST.
//!
//! [`Term`] is a plain owned tree. Names are [`Symbol`] handles interned in
//! an [`Arena`](crate::Arena), so comparing two constants is an integer
//! comparison; the rest of the tree compares structurally.
//!
//! Applications are kept flat: the head of an `App` is never itself an
//! `App` when built through [`Arena::mk_app`](crate::Arena::mk_app).

use crate::{CData, Loc, Symbol, TermError, anomaly, bail_syntax};

/// A term of the higher-order language.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A constant or a variable reference.
    Const(Symbol),
    /// Application of a head to a non-empty argument list.
    App(Box<Term>, Vec<Term>),
    /// Single-variable abstraction `x\ body`.
    Lam(Symbol, Box<Term>),
    CData(CData),
    Quoted(Quote),
}

/// Verbatim text captured from a `{{ ... }}` block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quote {
    pub data: String,
    /// Span of `data`, without delimiters or kind prefix.
    pub loc: Loc,
    /// Tag of the embedded syntax, from a leading `kind:tag` marker.
    pub kind: Option<String>,
}

impl Term {
    /// The empty list constant.
    pub const NIL: Term = Term::Const(Symbol::NIL);

    #[inline]
    pub fn is_const(&self) -> bool {
        matches!(self, Term::Const(_))
    }

    #[inline]
    pub fn is_app(&self) -> bool {
        matches!(self, Term::App(..))
    }

    /// The symbol of a constant.
    pub fn as_const(&self) -> Option<Symbol> {
        match self {
            Term::Const(s) => Some(*s),
            _ => None,
        }
    }

    /// The head symbol of a constant or of an application of a constant.
    pub fn head_symbol(&self) -> Option<Symbol> {
        match self {
            Term::Const(s) => Some(*s),
            Term::App(h, _) => h.as_const(),
            _ => None,
        }
    }

    /// Arguments of an application; empty for every other term.
    pub fn args(&self) -> &[Term] {
        match self {
            Term::App(_, args) => args,
            _ => &[],
        }
    }

    pub fn arity(&self) -> usize {
        self.args().len()
    }

    /// Short name of the variant, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Term::Const(_) => "constant",
            Term::App(..) => "application",
            Term::Lam(..) => "lambda",
            Term::CData(c) => c.ty().name,
            Term::Quoted(_) => "quotation",
        }
    }

    /// Splits `c a1 .. an` into `(c, [a1 .. an])` when the head is `symbol`.
    pub fn unpack_app(&self, symbol: Symbol) -> Option<&[Term]> {
        match self {
            Term::App(h, args) if h.as_const() == Some(symbol) => Some(args),
            _ => None,
        }
    }
}

impl From<Symbol> for Term {
    fn from(s: Symbol) -> Self {
        Term::Const(s)
    }
}

impl From<CData> for Term {
    fn from(c: CData) -> Self {
        Term::CData(c)
    }
}

/// Builds a [`Term::Quoted`] from the raw text of a quotation block.
///
/// `raw` includes the delimiters: a run of `n >= 2` opening braces and the
/// matching run of closing braces. The text between them is kept verbatim,
/// unless it starts (after optional whitespace) with `kind:`; then the tag
/// runs up to the first space or newline and `data` is the rest, with
/// trailing whitespace dropped. `loc` is the span of `raw` and is narrowed
/// to the span of `data`.
pub fn mk_quoted(loc: &Loc, raw: &str) -> Result<Term, TermError> {
    let n = raw.bytes().take_while(|&b| b == b'{').count();
    let closes = raw.bytes().rev().take_while(|&b| b == b'}').count();
    if n < 2 || closes < n || raw.len() < 2 * n {
        bail_syntax!(loc, "bad quotation delimiters");
    }
    let inner = &raw[n..raw.len() - n];
    let rest = inner.trim_start();
    let Some(tagged) = rest.strip_prefix("kind:") else {
        return Ok(Term::Quoted(Quote {
            data: inner.to_owned(),
            loc: loc.strip(n, n),
            kind: None,
        }));
    };
    let Some(end) = tagged.find([' ', '\n']) else {
        bail_syntax!(loc, "bad quotation: kind is not followed by a space or newline");
    };
    if end == 0 {
        bail_syntax!(loc, "bad quotation: empty kind");
    }
    let kind = &tagged[..end];
    let body = &tagged[end + 1..];
    let data = body.trim_end();
    let data_start = raw.len() - n - body.len();
    let trailing = body.len() - data.len();
    Ok(Term::Quoted(Quote {
        data: data.to_owned(),
        loc: loc.strip(data_start, n + trailing),
        kind: Some(kind.to_owned()),
    }))
}

/// Right-folds `[e1, .., en, tail]` into `e1 :: .. :: en :: tail`.
///
/// A one-element input is returned as is, so callers append the tail
/// themselves: `[a, b]` is `mk_seq([a, b, NIL])`.
///
/// # Panics
/// Panics on empty input; the empty list is [`Term::NIL`].
pub fn mk_seq(mut terms: Vec<Term>) -> Term {
    let Some(mut acc) = terms.pop() else {
        anomaly!("mk_seq: empty sequence");
    };
    while let Some(t) = terms.pop() {
        acc = Term::App(Box::new(Term::Const(Symbol::CONS)), vec![t, acc]);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(len: usize) -> Loc {
        Loc {
            source_name: "q".into(),
            source_start: 100,
            source_stop: 100 + len,
            line: 4,
            line_starts_at: 90,
        }
    }

    fn quote(t: Term) -> Quote {
        match t {
            Term::Quoted(q) => q,
            other => panic!("not a quotation: {other:?}"),
        }
    }

    #[test]
    fn quoted_plain_text_is_verbatim() {
        let raw = "{{ just text }}";
        let q = quote(mk_quoted(&loc(raw.len()), raw).unwrap());
        assert_eq!(q.data, " just text ");
        assert_eq!(q.kind, None);
        assert_eq!(q.loc.source_start, 102);
        assert_eq!(q.loc.source_stop, 100 + raw.len() - 2);
    }

    #[test]
    fn quoted_kind_is_extracted() {
        let raw = "{{ kind:foo rest of data }}";
        let q = quote(mk_quoted(&loc(raw.len()), raw).unwrap());
        assert_eq!(q.kind.as_deref(), Some("foo"));
        assert_eq!(q.data, "rest of data");
        assert_eq!(q.loc.source_start, 112);
        assert_eq!(q.loc.source_stop, 112 + "rest of data".len());
        assert_eq!(q.loc.line_starts_at, 87);
    }

    #[test]
    fn quoted_kind_ends_at_newline() {
        let raw = "{{{kind:elpi\nfoo }} bar}}}";
        let q = quote(mk_quoted(&loc(raw.len()), raw).unwrap());
        assert_eq!(q.kind.as_deref(), Some("elpi"));
        assert_eq!(q.data, "foo }} bar");
    }

    #[test]
    fn quoted_kind_must_be_terminated() {
        let raw = "{{kind:foo}}";
        let err = mk_quoted(&loc(raw.len()), raw).unwrap_err();
        assert!(matches!(err, TermError::Syntax { .. }));
    }

    #[test]
    fn seq_folds_right() {
        let a = Term::Const(Symbol::TRUE);
        let b = Term::Const(Symbol::FAIL);
        let l = mk_seq(vec![a.clone(), b.clone(), Term::NIL]);
        let cons = |h: Term, t: Term| Term::App(Box::new(Term::Const(Symbol::CONS)), vec![h, t]);
        assert_eq!(l, cons(a, cons(b, Term::NIL)));
        assert_eq!(mk_seq(vec![Term::NIL]), Term::NIL);
    }

    #[test]
    #[should_panic(expected = "anomaly")]
    fn seq_rejects_empty() {
        mk_seq(Vec::new());
    }

    #[test]
    fn accessors() {
        let t = Term::App(
            Box::new(Term::Const(Symbol::PI)),
            vec![Term::Const(Symbol::TRUE)],
        );
        assert_eq!(t.head_symbol(), Some(Symbol::PI));
        assert_eq!(t.arity(), 1);
        assert_eq!(t.unpack_app(Symbol::PI).map(<[Term]>::len), Some(1));
        assert!(t.unpack_app(Symbol::SIGMA).is_none());
        assert_eq!(t.kind_name(), "application");
        assert_eq!(Term::NIL.arity(), 0);
    }
}
