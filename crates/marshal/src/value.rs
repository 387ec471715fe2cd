//! The value model walked by the tree builder.
//!
//! Records are never introspected at runtime. A record type describes its
//! fields once through [`XmlRecord::describe`] (normally generated by
//! `#[derive(XmlRecord)]`), and every value exposes its shape through
//! [`XmlValue::as_value`].

use std::any::TypeId;
use std::borrow::Cow;
use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::Arc;

/// Raw per-field declaration as written on the record type.
///
/// Produced by [`XmlRecord::describe`] in declaration order and parsed once
/// per type by the field metadata cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    /// The Rust identifier of the field.
    pub ident: &'static str,
    /// The tag string from `#[xml("...")]`, if any.
    pub tag: Option<&'static str>,
    /// Set by `#[xml(embed)]`.
    pub embedded: bool,
    /// Whether the field's static type is [`XmlName`].
    pub element_name: bool,
}

impl FieldDecl {
    pub const fn new(ident: &'static str, tag: Option<&'static str>) -> Self {
        Self {
            ident,
            tag,
            embedded: false,
            element_name: false,
        }
    }

    pub const fn embedded(mut self, embedded: bool) -> Self {
        self.embedded = embedded;
        self
    }

    pub const fn element_name(mut self, element_name: bool) -> Self {
        self.element_name = element_name;
        self
    }
}

/// A value that can be turned into markup.
pub trait XmlValue: Sync {
    /// Returns the shape of this value, looking through optional wrappers.
    fn as_value(&self) -> ValueRef<'_>;

    /// Whether this type overrides the enclosing element's name.
    fn is_element_name() -> bool
    where
        Self: Sized,
    {
        false
    }
}

/// A record: an ordered set of named fields.
pub trait XmlRecord: Sync {
    /// The declared type name, used when no tag name is available.
    fn type_name(&self) -> &'static str;

    /// Identity of the concrete type, used as the metadata cache key.
    fn type_key(&self) -> TypeId;

    /// Scans the declared fields. Called at most a handful of times per
    /// process; the result is cached.
    fn describe(&self) -> Vec<FieldDecl>;

    /// Borrows the field at the given declaration index.
    fn field(&self, index: usize) -> Option<&dyn XmlValue>;
}

/// An ordered, indexable collection of values.
pub trait XmlSequence: Sync {
    fn len(&self) -> usize;

    fn item(&self, index: usize) -> Option<&dyn XmlValue>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The shape of a value as seen by the tree builder.
#[derive(Clone, Copy)]
pub enum ValueRef<'a> {
    /// An absent optional.
    Null,
    Record(&'a dyn XmlRecord),
    Sequence(&'a dyn XmlSequence),
    Scalar(Scalar<'a>),
}

impl ValueRef<'_> {
    /// Zero numbers, `false`, empty strings and collections, and nulls are
    /// empty. Records never are.
    pub fn is_empty(&self) -> bool {
        match self {
            ValueRef::Null => true,
            ValueRef::Record(_) => false,
            ValueRef::Sequence(seq) => seq.is_empty(),
            ValueRef::Scalar(scalar) => scalar.is_zero(),
        }
    }

    pub(crate) fn describe_kind(&self) -> &'static str {
        match self {
            ValueRef::Null => "null",
            ValueRef::Record(_) => "record",
            ValueRef::Sequence(_) => "sequence",
            ValueRef::Scalar(_) => "scalar",
        }
    }
}

impl fmt::Debug for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::Null => f.write_str("Null"),
            ValueRef::Record(record) => write!(f, "Record({})", record.type_name()),
            ValueRef::Sequence(seq) => write!(f, "Sequence(len = {})", seq.len()),
            ValueRef::Scalar(scalar) => write!(f, "Scalar({scalar:?})"),
        }
    }
}

/// A terminal value.
#[derive(Clone, Copy)]
pub enum Scalar<'a> {
    Str(&'a str),
    Bool(bool),
    Int(i128),
    UInt(u128),
    Float(f64),
    Char(char),
    /// Any other terminal type, rendered through its `Display` impl.
    Display(&'a (dyn fmt::Display + Sync)),
}

impl Scalar<'_> {
    /// Appends the textual form of this scalar to `out`.
    ///
    /// Floats always carry exactly two fractional digits. No escaping is
    /// applied here.
    pub fn write_to(&self, out: &mut String) {
        // Writing into a String cannot fail.
        let _ = match self {
            Scalar::Str(s) => {
                out.push_str(s);
                Ok(())
            }
            Scalar::Bool(b) => {
                out.push_str(if *b { "true" } else { "false" });
                Ok(())
            }
            Scalar::Int(n) => write!(out, "{n}"),
            Scalar::UInt(n) => write!(out, "{n}"),
            Scalar::Float(x) => write!(out, "{x:.2}"),
            Scalar::Char(c) => {
                out.push(*c);
                Ok(())
            }
            Scalar::Display(d) => write!(out, "{d}"),
        };
    }

    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Scalar::Str(s) => Cow::Borrowed(s),
            other => {
                let mut out = String::new();
                other.write_to(&mut out);
                Cow::Owned(out)
            }
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Scalar::Str(s) => s.is_empty(),
            Scalar::Bool(b) => !b,
            Scalar::Int(n) => *n == 0,
            Scalar::UInt(n) => *n == 0,
            Scalar::Float(x) => *x == 0.0,
            Scalar::Char(c) => *c == '\0',
            Scalar::Display(_) => false,
        }
    }
}

impl fmt::Debug for Scalar<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_text())
    }
}

/// Overrides the name of the enclosing element when used as a record field.
///
/// Only `local` is used; namespace prefixes are not resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct XmlName {
    pub space: String,
    pub local: String,
}

impl XmlName {
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            space: String::new(),
            local: local.into(),
        }
    }
}

impl XmlValue for XmlName {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Scalar(Scalar::Str(&self.local))
    }

    fn is_element_name() -> bool {
        true
    }
}

macro_rules! impl_scalar {
    ($variant:ident as $wide:ty => $($ty:ty),+ $(,)?) => {
        $(
            impl XmlValue for $ty {
                fn as_value(&self) -> ValueRef<'_> {
                    ValueRef::Scalar(Scalar::$variant(*self as $wide))
                }
            }
        )+
    };
}

impl_scalar!(Int as i128 => i8, i16, i32, i64, i128, isize);
impl_scalar!(UInt as u128 => u8, u16, u32, u64, u128, usize);
impl_scalar!(Float as f64 => f32, f64);

impl XmlValue for bool {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Scalar(Scalar::Bool(*self))
    }
}

impl XmlValue for char {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Scalar(Scalar::Char(*self))
    }
}

impl XmlValue for String {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Scalar(Scalar::Str(self))
    }
}

impl XmlValue for str {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Scalar(Scalar::Str(self))
    }
}

impl XmlValue for &str {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Scalar(Scalar::Str(self))
    }
}

impl XmlValue for Cow<'_, str> {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Scalar(Scalar::Str(self))
    }
}

impl<T: XmlValue> XmlValue for Option<T> {
    fn as_value(&self) -> ValueRef<'_> {
        match self {
            Some(inner) => inner.as_value(),
            None => ValueRef::Null,
        }
    }
}

impl<T: XmlValue + ?Sized> XmlValue for Box<T> {
    fn as_value(&self) -> ValueRef<'_> {
        (**self).as_value()
    }
}

impl<T: XmlValue + ?Sized + Send> XmlValue for Arc<T> {
    fn as_value(&self) -> ValueRef<'_> {
        (**self).as_value()
    }
}

impl<T: XmlValue> XmlValue for &T {
    fn as_value(&self) -> ValueRef<'_> {
        (**self).as_value()
    }
}

impl<T: XmlValue> XmlSequence for Vec<T> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn item(&self, index: usize) -> Option<&dyn XmlValue> {
        self.get(index).map(|v| v as &dyn XmlValue)
    }
}

impl<T: XmlValue> XmlValue for Vec<T> {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Sequence(self)
    }
}

impl<T: XmlValue> XmlSequence for VecDeque<T> {
    fn len(&self) -> usize {
        VecDeque::len(self)
    }

    fn item(&self, index: usize) -> Option<&dyn XmlValue> {
        self.get(index).map(|v| v as &dyn XmlValue)
    }
}

impl<T: XmlValue> XmlValue for VecDeque<T> {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Sequence(self)
    }
}

impl<T: XmlValue, const N: usize> XmlSequence for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn item(&self, index: usize) -> Option<&dyn XmlValue> {
        self.get(index).map(|v| v as &dyn XmlValue)
    }
}

impl<T: XmlValue, const N: usize> XmlValue for [T; N] {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Sequence(self)
    }
}

impl<T: XmlValue> XmlSequence for &[T] {
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn item(&self, index: usize) -> Option<&dyn XmlValue> {
        self.get(index).map(|v| v as &dyn XmlValue)
    }
}

impl<T: XmlValue> XmlValue for &[T] {
    fn as_value(&self) -> ValueRef<'_> {
        ValueRef::Sequence(self)
    }
}

#[cfg(feature = "chrono")]
mod chrono_impls {
    use super::{Scalar, ValueRef, XmlValue};

    macro_rules! impl_display {
        ($($ty:ty),+ $(,)?) => {
            $(
                impl XmlValue for $ty {
                    fn as_value(&self) -> ValueRef<'_> {
                        ValueRef::Scalar(Scalar::Display(self))
                    }
                }
            )+
        };
    }

    impl_display!(
        chrono::DateTime<chrono::Utc>,
        chrono::NaiveDate,
        chrono::NaiveDateTime,
    );
}
