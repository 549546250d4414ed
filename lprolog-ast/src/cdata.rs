//! Opaque literal data embedded in terms.
//!
//! A [`CData`] value pairs a payload with a `'static` [`CDataType`]
//! descriptor. The descriptor is a capability table: it knows how to print,
//! compare and hash payloads of its type, and whether payloads are
//! hash-consed. Built-in descriptors cover integers, floats, strings and
//! source locations; extensions declare their own statics.
//!
//! ```
//! use lprolog_ast::{Arena, CData};
//! let mut arena = Arena::new();
//! let a = arena.mk_string("hello");
//! let b = arena.mk_string("hello");
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), Some("hello"));
//! assert_eq!(CData::int(3).as_int(), Some(3));
//! ```

use crate::Loc;
use std::any::Any;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Type descriptor of embedded data.
pub struct CDataType {
    /// Short type name, used in diagnostics.
    pub name: &'static str,
    pub pp: fn(&CData, &mut fmt::Formatter<'_>) -> fmt::Result,
    pub compare: fn(&CData, &CData) -> Ordering,
    pub hash: fn(&CData, &mut dyn Hasher),
    /// Whether equal payloads are expected to share one allocation.
    pub hconsed: bool,
}

impl fmt::Debug for CDataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CDataType")
            .field("name", &self.name)
            .field("hconsed", &self.hconsed)
            .finish()
    }
}

/// A typed opaque payload.
#[derive(Clone)]
pub struct CData {
    ty: &'static CDataType,
    value: Arc<dyn Any + Send + Sync>,
}

impl CData {
    /// Wraps `value` as data of type `ty`.
    ///
    /// The descriptor functions of `ty` must expect payloads of type `T`.
    pub fn new<T: Any + Send + Sync>(ty: &'static CDataType, value: T) -> Self {
        Self {
            ty,
            value: Arc::new(value),
        }
    }

    /// Wraps an already shared payload.
    pub fn from_shared(ty: &'static CDataType, value: Arc<dyn Any + Send + Sync>) -> Self {
        Self { ty, value }
    }

    pub fn int(i: i64) -> Self {
        Self::new(&INT, i)
    }

    pub fn float(x: f64) -> Self {
        Self::new(&FLOAT, x)
    }

    pub fn loc(loc: Loc) -> Self {
        Self::new(&LOC, loc)
    }

    /// The type descriptor.
    #[inline]
    pub fn ty(&self) -> &'static CDataType {
        self.ty
    }

    /// Returns `true` if this value has descriptor `ty`.
    #[inline]
    pub fn is(&self, ty: &'static CDataType) -> bool {
        std::ptr::eq(self.ty, ty)
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Returns `true` if both values share the same payload allocation.
    pub fn ptr_eq(&self, other: &CData) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    pub fn as_int(&self) -> Option<i64> {
        if self.is(&INT) {
            self.downcast_ref::<i64>().copied()
        } else {
            None
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        if self.is(&FLOAT) {
            self.downcast_ref::<f64>().copied()
        } else {
            None
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        if self.is(&STRING) {
            self.downcast_ref::<Arc<str>>().map(|s| &**s)
        } else {
            None
        }
    }

    pub fn as_loc(&self) -> Option<&Loc> {
        if self.is(&LOC) {
            self.downcast_ref::<Loc>()
        } else {
            None
        }
    }
}

impl PartialEq for CData {
    fn eq(&self, other: &Self) -> bool {
        if !std::ptr::eq(self.ty, other.ty) {
            return false;
        }
        if self.ty.hconsed && self.ptr_eq(other) {
            return true;
        }
        (self.ty.compare)(self, other) == Ordering::Equal
    }
}

impl Eq for CData {}

impl Hash for CData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ty.name.hash(state);
        (self.ty.hash)(self, state);
    }
}

impl fmt::Display for CData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.ty.pp)(self, f)
    }
}

impl fmt::Debug for CData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CData({}: ", self.ty.name)?;
        (self.ty.pp)(self, f)?;
        f.write_str(")")
    }
}

/// Prints the payload with its `Display` impl.
pub fn pp_display<T: Any + fmt::Display>(c: &CData, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match c.downcast_ref::<T>() {
        Some(v) => fmt::Display::fmt(v, f),
        None => write!(f, "<{}?>", c.ty().name),
    }
}

/// Compares payloads with their `Ord` impl.
pub fn compare_ord<T: Any + Ord>(a: &CData, b: &CData) -> Ordering {
    match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
        (Some(x), Some(y)) => x.cmp(y),
        (x, y) => x.is_some().cmp(&y.is_some()),
    }
}

/// Feeds the payload into `state` with its `Hash` impl.
pub fn hash_payload<T: Any + Hash>(c: &CData, mut state: &mut dyn Hasher) {
    if let Some(v) = c.downcast_ref::<T>() {
        v.hash(&mut state);
    }
}

fn pp_float(c: &CData, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match c.downcast_ref::<f64>() {
        Some(r) if r.is_finite() && r.fract() == 0.0 => write!(f, "{:.1}", r),
        Some(r) => write!(f, "{}", r),
        None => f.write_str("<float?>"),
    }
}

fn compare_float(a: &CData, b: &CData) -> Ordering {
    match (a.downcast_ref::<f64>(), b.downcast_ref::<f64>()) {
        (Some(x), Some(y)) => x.total_cmp(y),
        (x, y) => x.is_some().cmp(&y.is_some()),
    }
}

fn hash_float(c: &CData, mut state: &mut dyn Hasher) {
    if let Some(r) = c.downcast_ref::<f64>() {
        r.to_bits().hash(&mut state);
    }
}

fn pp_string(c: &CData, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let Some(s) = c.downcast_ref::<Arc<str>>() else {
        return f.write_str("<string?>");
    };
    f.write_str("\"")?;
    for ch in s.chars() {
        match ch {
            '\\' => f.write_str("\\\\")?,
            '"' => f.write_str("\\\"")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("\"")
}

fn compare_loc(a: &CData, b: &CData) -> Ordering {
    match (a.downcast_ref::<Loc>(), b.downcast_ref::<Loc>()) {
        (Some(x), Some(y)) => (&x.source_name, x.source_start, x.source_stop).cmp(&(
            &y.source_name,
            y.source_start,
            y.source_stop,
        )),
        (x, y) => x.is_some().cmp(&y.is_some()),
    }
}

pub static INT: CDataType = CDataType {
    name: "int",
    pp: pp_display::<i64>,
    compare: compare_ord::<i64>,
    hash: hash_payload::<i64>,
    hconsed: false,
};

pub static FLOAT: CDataType = CDataType {
    name: "float",
    pp: pp_float,
    compare: compare_float,
    hash: hash_float,
    hconsed: false,
};

/// Strings, hash-consed through [`Arena::mk_string`](crate::Arena::mk_string).
pub static STRING: CDataType = CDataType {
    name: "string",
    pp: pp_string,
    compare: compare_ord::<Arc<str>>,
    hash: hash_payload::<Arc<str>>,
    hconsed: true,
};

pub static LOC: CDataType = CDataType {
    name: "loc",
    pp: pp_display::<Loc>,
    compare: compare_loc,
    hash: hash_payload::<Loc>,
    hconsed: false,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(c: &CData) -> u64 {
        let mut h = DefaultHasher::new();
        c.hash(&mut h);
        h.finish()
    }

    #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    struct Color(u8);

    impl fmt::Display for Color {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "color#{}", self.0)
        }
    }

    static COLOR: CDataType = CDataType {
        name: "color",
        pp: pp_display::<Color>,
        compare: compare_ord::<Color>,
        hash: hash_payload::<Color>,
        hconsed: false,
    };

    #[test]
    fn ints_compare_by_value() {
        assert_eq!(CData::int(7), CData::int(7));
        assert_ne!(CData::int(7), CData::int(8));
        assert_eq!(hash_of(&CData::int(7)), hash_of(&CData::int(7)));
        assert_eq!(CData::int(7).to_string(), "7");
    }

    #[test]
    fn types_never_mix() {
        assert_ne!(CData::int(1), CData::float(1.0));
        assert_eq!(CData::int(1).as_float(), None);
    }

    #[test]
    fn floats_print_with_fraction() {
        assert_eq!(CData::float(2.0).to_string(), "2.0");
        assert_eq!(CData::float(2.5).to_string(), "2.5");
        assert_eq!(CData::float(f64::NAN), CData::float(f64::NAN));
    }

    #[test]
    fn strings_are_escaped() {
        let s = CData::new(&STRING, Arc::<str>::from("a\"b\n"));
        assert_eq!(s.to_string(), "\"a\\\"b\\n\"");
        assert_eq!(s.as_str(), Some("a\"b\n"));
    }

    #[test]
    fn extension_types_use_their_descriptor() {
        let a = CData::new(&COLOR, Color(3));
        let b = CData::new(&COLOR, Color(3));
        assert_eq!(a, b);
        assert!(a.is(&COLOR));
        assert_eq!(format!("{a:?}"), "CData(color: color#3)");
        assert_eq!(a.downcast_ref::<Color>(), Some(&Color(3)));
    }
}
