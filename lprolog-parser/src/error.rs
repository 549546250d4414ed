//! # Parser Error Type
//!
//! This module defines [`ParseError`], the unified error enum of the parser
//! pipeline. It aggregates failures from:
//!
//! - **Lexing and parsing** (unexpected token, operator conflicts),
//! - **Numeric literals** (text → integer or float),
//! - **Term construction and operator-table updates** ([`TermError`]),
//! - **Accumulation** (unit lookup and file reading).
//!
//! Every variant raised from source text carries the [`Loc`] of the
//! offending span; [`ParseError::loc`] returns it.

use lprolog_ast::{Loc, TermError};
use smartstring::alias::String;
use thiserror::Error;

/// Represents all errors that abandon the parse of a unit.
///
/// Conversions from [`TermError`] are derived with `#[from]`, so the term
/// builders and operator declarations of `lprolog_ast` can be called with
/// `?` from parser code.
///
/// ```rust
/// # use lprolog_parser::ParseError;
/// # use lprolog_ast::TermError;
/// let err: ParseError = TermError::UnknownFixity("foo".into()).into();
/// assert!(matches!(err, ParseError::Term(TermError::UnknownFixity(_))));
/// ```
#[derive(Debug, Error)]
pub enum ParseError {
    /// Unexpected token, malformed literal or operator conflict.
    #[error("{loc}: syntax error: {message}")]
    Syntax { loc: Loc, message: String },

    /// Error raised by a term builder or by the operator table.
    #[error(transparent)]
    Term(#[from] TermError),

    /// An integer literal does not fit.
    #[error("{loc}: bad integer literal: {source}")]
    ParseInt {
        loc: Loc,
        source: std::num::ParseIntError,
    },

    #[error("{loc}: bad float literal: {source}")]
    ParseFloat {
        loc: Loc,
        source: std::num::ParseFloatError,
    },

    /// A source unit could not be read.
    #[error("cannot read {name}: {source}")]
    Io {
        name: std::string::String,
        source: std::io::Error,
    },

    /// An accumulated unit could not be resolved.
    #[error("{loc}: cannot accumulate {name:?}: {message}")]
    Load {
        loc: Loc,
        name: String,
        message: String,
    },
}

impl ParseError {
    /// Location of the offending source span, when known.
    pub fn loc(&self) -> Option<&Loc> {
        match self {
            ParseError::Syntax { loc, .. }
            | ParseError::ParseInt { loc, .. }
            | ParseError::ParseFloat { loc, .. }
            | ParseError::Load { loc, .. } => Some(loc),
            ParseError::Term(e) => e.loc(),
            ParseError::Io { .. } => None,
        }
    }
}

/// Return a `ParseError::Syntax` at a location with a formatted message.
///
/// # Example
/// ```rust, ignore
/// bail!(tok.loc, "unexpected {}", tok.kind);
/// ```
macro_rules! bail {
    ($loc:expr, $($arg:tt)*) => {
        return Err($crate::ParseError::Syntax {
            loc: ::core::clone::Clone::clone(&$loc),
            message: ::smartstring::alias::String::from(format!($($arg)*)),
        })
    };
}

pub(crate) use bail;

#[cfg(test)]
mod tests {
    use super::*;

    fn demo(n: i64) -> Result<i64, ParseError> {
        if n < 0 {
            bail!(Loc::initial("demo.lp"), "negative: {}", n);
        }
        Ok(n)
    }

    #[test]
    fn bail_builds_syntax_error() {
        let err = demo(-1).unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
        assert!(err.to_string().ends_with("syntax error: negative: -1"));
        assert_eq!(err.loc().map(|l| &*l.source_name), Some("demo.lp"));
    }

    #[test]
    fn term_errors_keep_their_location() {
        let err: ParseError = TermError::Structure {
            loc: Loc::initial("u.lp"),
            message: "unmatched block end".into(),
        }
        .into();
        assert!(err.loc().is_some());
        assert!(err.to_string().contains("unmatched block end"));
    }

    #[test]
    fn io_errors_name_the_unit() {
        let err = ParseError::Io {
            name: "missing.lp".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "cannot read missing.lp: gone");
        assert!(err.loc().is_none());
    }
}
