use crate::value::Value;
use num_traits::ToPrimitive;
use std::cmp::Ordering;

///
/// CONSTANTS
///

const F64_SAFE_I128: i128 = 1i128 << 53;

///
/// NumericRepr
///

enum NumericRepr {
    Int(i128),
    F64(f64),
}

fn numeric_repr(value: &Value) -> Option<NumericRepr> {
    match value {
        Value::Int(i) => Some(NumericRepr::Int(i128::from(*i))),
        Value::Float32(f) => Some(NumericRepr::F64(f64::from(f.get()))),
        Value::Float64(f) => Some(NumericRepr::F64(f.get())),
        _ => None,
    }
}

/// Cross-width numeric comparator.
///
/// Exact over the full integer range: integers beyond the 2^53 safe window
/// compare against the float's integral part instead of being cast through
/// a lossy `as f64`. Returns `None` when either side is non-numeric or NaN.
#[must_use]
pub(crate) fn cmp_numeric(left: &Value, right: &Value) -> Option<Ordering> {
    match (numeric_repr(left)?, numeric_repr(right)?) {
        (NumericRepr::Int(a), NumericRepr::Int(b)) => Some(a.cmp(&b)),
        (NumericRepr::F64(a), NumericRepr::F64(b)) => a.partial_cmp(&b),
        (NumericRepr::Int(a), NumericRepr::F64(b)) => cmp_int_f64(a, b),
        (NumericRepr::F64(a), NumericRepr::Int(b)) => cmp_int_f64(b, a).map(Ordering::reverse),
    }
}

// Compare an exact integer against an f64 without precision loss.
#[expect(clippy::cast_precision_loss)]
fn cmp_int_f64(int: i128, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if float.is_infinite() {
        return Some(if float > 0.0 {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }
    if (-F64_SAFE_I128..=F64_SAFE_I128).contains(&int) {
        return (int as f64).partial_cmp(&float);
    }

    // beyond the i128 range the float's magnitude decides outright
    let Some(truncated) = float.trunc().to_i128() else {
        return Some(if float > 0.0 {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    };

    match int.cmp(&truncated) {
        Ordering::Equal if float.fract() > 0.0 => Some(Ordering::Less),
        Ordering::Equal if float.fract() < 0.0 => Some(Ordering::Greater),
        ordering => Some(ordering),
    }
}

/// Equality across numeric representations.
///
/// `Int(0)`, `Float32(-0.0)` and `Float64(0.0)` are all equal; same-signed
/// infinities are equal across widths, opposite-signed never are. Null
/// equals only Null. Lists compare element-wise under the same rules.
#[must_use]
pub(crate) fn eq_value(left: &Value, right: &Value) -> bool {
    if left.is_numeric() && right.is_numeric() {
        return match cmp_numeric(left, right) {
            Some(ordering) => ordering == Ordering::Equal,
            // NaN on either side: ordering is undefined, fall back to
            // structural identity so a stored NaN still equals itself
            None => left == right,
        };
    }

    match (left, right) {
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| eq_value(x, y))
        }
        _ => left == right,
    }
}

/// Ordering comparator for comparison predicates.
///
/// Numeric pairs order via [`cmp_numeric`]; text and bool order within their
/// own family. Returns `None` for mismatched families, Null, or NaN.
#[must_use]
pub(crate) fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ if left.is_numeric() && right.is_numeric() => cmp_numeric(left, right),
        _ => None,
    }
}
