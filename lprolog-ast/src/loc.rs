//! Source locations.
//!
//! A [`Loc`] is a half-open byte range `[source_start, source_stop)` inside a
//! named source unit, together with the 1-based line of the start offset and
//! the byte offset at which that line begins. The column is derived.

use std::fmt;
use std::sync::Arc;

/// A source span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Loc {
    /// Name of the source unit (file path or a descriptive label).
    pub source_name: Arc<str>,
    /// Byte offset of the first character.
    pub source_start: usize,
    /// Byte offset one past the last character.
    pub source_stop: usize,
    /// 1-based line number of `source_start`.
    pub line: usize,
    /// Byte offset at which `line` begins.
    pub line_starts_at: usize,
}

impl Loc {
    /// Empty location at the very beginning of `source_name`.
    pub fn initial(source_name: impl Into<Arc<str>>) -> Self {
        Self {
            source_name: source_name.into(),
            source_start: 0,
            source_stop: 0,
            line: 1,
            line_starts_at: 0,
        }
    }

    /// 0-based column of the start offset.
    #[inline]
    pub fn column(&self) -> usize {
        self.source_start.saturating_sub(self.line_starts_at)
    }

    /// Number of bytes covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.source_stop.saturating_sub(self.source_start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops `front` bytes from the start and `back` bytes from the end.
    ///
    /// `line_starts_at` is moved back by `back` as well. This keeps the
    /// column arithmetic compatible with locations produced by earlier
    /// releases; it is only meaningful when the stripped suffix holds no
    /// newline.
    pub fn strip(&self, front: usize, back: usize) -> Loc {
        Loc {
            source_name: self.source_name.clone(),
            source_start: self.source_start + front,
            source_stop: self.source_stop.saturating_sub(back),
            line: self.line,
            line_starts_at: self.line_starts_at.saturating_sub(back),
        }
    }

    /// Smallest location covering both `self` and `other`.
    ///
    /// Line bookkeeping follows whichever location starts first.
    pub fn merge(&self, other: &Loc) -> Loc {
        let first = if self.source_start <= other.source_start {
            self
        } else {
            other
        };
        Loc {
            source_name: first.source_name.clone(),
            source_start: first.source_start,
            source_stop: self.source_stop.max(other.source_stop),
            line: first.line,
            line_starts_at: first.line_starts_at,
        }
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "File \"{}\", line {}, column {}, characters {}-{}",
            self.source_name,
            self.line,
            self.column(),
            self.source_start,
            self.source_stop
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::{TestResult, quickcheck};

    fn loc(start: usize, stop: usize, line: usize, line_starts_at: usize) -> Loc {
        Loc {
            source_name: "t".into(),
            source_start: start,
            source_stop: stop,
            line,
            line_starts_at,
        }
    }

    #[test]
    fn strip_moves_both_ends_and_line_start() {
        let l = loc(10, 30, 2, 8).strip(3, 2);
        assert_eq!(l.source_start, 13);
        assert_eq!(l.source_stop, 28);
        assert_eq!(l.line, 2);
        assert_eq!(l.line_starts_at, 6);
    }

    #[test]
    fn strip_saturates_line_start() {
        let l = loc(0, 6, 1, 0).strip(2, 2);
        assert_eq!(l.line_starts_at, 0);
        assert_eq!(l.len(), 2);
    }

    #[test]
    fn merge_covers_both() {
        let a = loc(5, 9, 1, 0);
        let b = loc(12, 20, 2, 11);
        let m = b.merge(&a);
        assert_eq!((m.source_start, m.source_stop), (5, 20));
        assert_eq!(m.line, 1);
    }

    #[test]
    fn display_has_line_and_column() {
        let l = loc(14, 17, 3, 10);
        assert_eq!(
            l.to_string(),
            "File \"t\", line 3, column 4, characters 14-17"
        );
    }

    quickcheck! {
        fn merge_is_commutative_and_covering(a: (u16, u16), b: (u16, u16)) -> TestResult {
            let span = |(x, y): (u16, u16)| (x.min(y) as usize, x.max(y) as usize);
            let (a0, a1) = span(a);
            let (b0, b1) = span(b);
            let la = loc(a0, a1, 1, 0);
            let lb = loc(b0, b1, 1, 0);
            let m = la.merge(&lb);
            TestResult::from_bool(
                m == lb.merge(&la)
                    && m.source_start == a0.min(b0)
                    && m.source_stop == a1.max(b1),
            )
        }
    }
}
