mod compare;
mod float;


use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

// re-exports
pub use float::{Float32, Float64};

///
/// Value
///
/// Dynamically typed value flowing through a compiled traversal.
///
/// Null → the absent value; equal only to itself.
/// List → ordered collection, used for predicate bounds and membership sets.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Float32(Float32),
    Float64(Float64),
    Int(i64),
    List(Vec<Self>),
    Null,
    Text(String),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from a list literal.
    ///
    /// Intended for tests and inline construction.
    /// Requires `Clone` because items are borrowed.
    pub fn from_slice<T>(items: &[T]) -> Self
    where
        T: Into<Self> + Clone,
    {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }

    /// Build a `Value::List` from owned items.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    ///
    /// TYPES
    ///

    /// Returns true if the value is one of the numeric variants.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float32(_) | Self::Float64(_))
    }

    /// Returns true if the value is Text.
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    /// Returns true if the value is Null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns true if the value is a floating-point NaN payload.
    #[must_use]
    pub fn is_nan(&self) -> bool {
        match self {
            Self::Float32(f) => f.get().is_nan(),
            Self::Float64(f) => f.get().is_nan(),
            _ => false,
        }
    }

    /// Stable label for error messages and diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Float32(_) => "float32",
            Self::Float64(_) => "float64",
            Self::Int(_) => "int",
            Self::List(_) => "list",
            Self::Null => "null",
            Self::Text(_) => "text",
        }
    }

    ///
    /// CONVERSION
    ///

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        if let Self::Text(s) = self {
            Some(s.as_str())
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&[Self]> {
        if let Self::List(xs) = self {
            Some(xs.as_slice())
        } else {
            None
        }
    }

    ///
    /// COMPARISON
    ///

    /// Cross-type numeric comparison; returns None if either side is
    /// non-numeric or NaN.
    #[must_use]
    pub fn cmp_numeric(&self, other: &Self) -> Option<Ordering> {
        compare::cmp_numeric(self, other)
    }

    /// Equality honoring cross-numeric representations: `Int(0)`,
    /// `Float64(-0.0)` and `Float32(0.0)` all compare equal; Null equals
    /// only Null.
    #[must_use]
    pub fn eq_value(&self, other: &Self) -> bool {
        compare::eq_value(self, other)
    }

    /// Ordering comparator for comparison predicates.
    ///
    /// Returns `None` for cross-family pairs, Null, or NaN.
    #[must_use]
    pub fn strict_order_cmp(&self, other: &Self) -> Option<Ordering> {
        compare::strict_order_cmp(self, other)
    }
}

#[macro_export]
macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    bool    => Bool,
    f32     => Float32,
    f64     => Float64,
    Float32 => Float32,
    Float64 => Float64,
    i8      => Int,
    i16     => Int,
    i32     => Int,
    i64     => Int,
    u8      => Int,
    u16     => Int,
    u32     => Int,
    &str    => Text,
    String  => Text,
}

impl From<Vec<Self>> for Value {
    fn from(vec: Vec<Self>) -> Self {
        Self::List(vec)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Self>,
{
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Null, Into::into)
    }
}
