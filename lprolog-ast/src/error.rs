//! Defines [`TermError`], the unified error type for AST construction.
//!
//! Covers user syntax errors raised by the term builders, structural errors
//! raised while nesting a flat program, and operator-table failures.
//! Internal invariant violations are not represented here: they go through
//! [`anomaly!`](crate::anomaly) and abort.

use crate::Loc;
use smartstring::alias::String;
use thiserror::Error;

/// Represents all recoverable errors of the AST layer.
///
/// Callers that need to tell a plain identifier from a misused operator match
/// on [`TermError::UnknownFixity`] specifically.
#[derive(Debug, Clone, Error)]
pub enum TermError {
    /// Malformed input detected while building a term.
    #[error("{loc}: syntax error: {message}")]
    Syntax { loc: Loc, message: String },

    /// Unbalanced or misplaced block markers, or misplaced attributes.
    #[error("{loc}: {message}")]
    Structure { loc: Loc, message: String },

    #[error("no fixity declared for {0:?}")]
    UnknownFixity(String),

    #[error("invalid fixity: {0}")]
    InvalidFixity(String),

    #[error("precedence {prec} of {name:?} out of range {min}..={max}")]
    PrecedenceOutOfRange {
        name: String,
        prec: i64,
        min: i64,
        max: i64,
    },

    #[error("cannot re-declare {name:?} as {new}; it is already {old}")]
    FixityRedefinition {
        name: String,
        old: String,
        new: String,
    },
}

impl TermError {
    /// Location of the offending source span, when the error has one.
    pub fn loc(&self) -> Option<&Loc> {
        match self {
            TermError::Syntax { loc, .. } | TermError::Structure { loc, .. } => Some(loc),
            _ => None,
        }
    }
}

/// Returns `TermError::Syntax` at the given location with a formatted message.
///
/// # Example
/// ```rust, ignore
/// bail_syntax!(loc, "unexpected {}", what);
/// ```
#[macro_export]
macro_rules! bail_syntax {
    ($loc:expr, $($arg:tt)*) => {
        return Err($crate::TermError::Syntax {
            loc: ::core::clone::Clone::clone(&$loc),
            message: ::smartstring::alias::String::from(format!($($arg)*)),
        })
    };
}

/// Aborts on a broken internal invariant.
///
/// Reserved for inputs that an earlier pipeline stage must never produce,
/// such as an empty argument list handed to a constructor. These are bugs,
/// not user errors, so they are never turned into a [`TermError`].
#[macro_export]
macro_rules! anomaly {
    ($($arg:tt)*) => {
        panic!("anomaly: {}", format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_mentions_location() {
        let loc = Loc::initial("demo.lp");
        let err = TermError::Syntax {
            loc,
            message: "bad".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("demo.lp"), "msg={msg}");
        assert!(msg.ends_with("syntax error: bad"), "msg={msg}");
        assert!(err.loc().is_some());
    }

    #[test]
    fn unknown_fixity_has_no_location() {
        let err = TermError::UnknownFixity("foo".into());
        assert_eq!(err.to_string(), "no fixity declared for \"foo\"");
        assert!(err.loc().is_none());
    }

    #[test]
    #[should_panic(expected = "anomaly: empty application")]
    fn anomaly_panics() {
        anomaly!("empty application");
    }
}
