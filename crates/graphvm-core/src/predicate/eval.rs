use crate::{
    predicate::{Predicate, TestOp, TestPredicate, TypeError},
    value::Value,
};
use std::cmp::Ordering;

///
/// Predicate evaluation
///
/// Truth semantics for the predicate tree. Type errors propagate out of
/// every level; a failing child aborts the whole evaluation rather than
/// collapsing to a boolean.
///

pub(crate) fn test(predicate: &Predicate, value: &Value) -> Result<bool, TypeError> {
    match predicate {
        Predicate::Test(leaf) => test_leaf(leaf, value),
        Predicate::And(children) => {
            for child in children {
                if !test(child, value)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Predicate::Or(children) => {
            for child in children {
                if test(child, value)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
    }
}

fn test_leaf(leaf: &TestPredicate, value: &Value) -> Result<bool, TypeError> {
    let raw = match leaf.op {
        TestOp::Eq => value.eq_value(&leaf.operand),
        TestOp::Neq => !value.eq_value(&leaf.operand),
        TestOp::Gt => order(leaf.op, value, &leaf.operand)? == Ordering::Greater,
        TestOp::Lt => order(leaf.op, value, &leaf.operand)? == Ordering::Less,
        TestOp::Gte => order(leaf.op, value, &leaf.operand)? != Ordering::Less,
        TestOp::Lte => order(leaf.op, value, &leaf.operand)? != Ordering::Greater,
        TestOp::Between => {
            let (lo, hi) = range_bounds(leaf)?;
            order(leaf.op, value, lo)? != Ordering::Less && order(leaf.op, value, hi)? == Ordering::Less
        }
        TestOp::Inside => {
            let (lo, hi) = range_bounds(leaf)?;
            order(leaf.op, value, lo)? == Ordering::Greater && order(leaf.op, value, hi)? == Ordering::Less
        }
        TestOp::Outside => {
            let (lo, hi) = range_bounds(leaf)?;
            let below = order(leaf.op, value, lo)? == Ordering::Less;
            let above = order(leaf.op, value, hi)? == Ordering::Greater;
            below || above
        }
        TestOp::Within => membership(value, &leaf.operand),
        TestOp::Without => !membership(value, &leaf.operand),
        TestOp::Containing => text_test(leaf, value, |h, n| h.contains(n))?,
        TestOp::StartingWith => text_test(leaf, value, |h, n| h.starts_with(n))?,
        TestOp::EndingWith => text_test(leaf, value, |h, n| h.ends_with(n))?,
    };

    Ok(raw != leaf.negated)
}

// Ordering comparison with eager NaN-bound rejection.
fn order(op: TestOp, value: &Value, bound: &Value) -> Result<Ordering, TypeError> {
    if bound.is_nan() {
        return Err(TypeError::NanBound { op });
    }

    value
        .strict_order_cmp(bound)
        .ok_or_else(|| TypeError::Incomparable {
            left: value.kind_name(),
            right: bound.kind_name(),
        })
}

// Extract the two-element bound list of between/inside/outside, rejecting
// NaN in either bound before any comparison runs.
fn range_bounds(leaf: &TestPredicate) -> Result<(&Value, &Value), TypeError> {
    let [lo, hi] = leaf
        .operand
        .as_list()
        .ok_or(TypeError::MalformedBound { op: leaf.op })?
    else {
        return Err(TypeError::MalformedBound { op: leaf.op });
    };

    if lo.is_nan() || hi.is_nan() {
        return Err(TypeError::NanBound { op: leaf.op });
    }

    Ok((lo, hi))
}

// Membership over the operand set. A null or absent operand behaves as the
// empty set; element equality follows the cross-numeric eq rules.
fn membership(value: &Value, operand: &Value) -> bool {
    match operand {
        Value::Null => false,
        Value::List(items) => items.iter().any(|item| value.eq_value(item)),
        scalar => value.eq_value(scalar),
    }
}

fn text_test(
    leaf: &TestPredicate,
    value: &Value,
    test: impl FnOnce(&str, &str) -> bool,
) -> Result<bool, TypeError> {
    match (value.as_text(), leaf.operand.as_text()) {
        (Some(haystack), Some(needle)) => Ok(test(haystack, needle)),
        _ => Err(TypeError::TextRequired { op: leaf.op }),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use crate::{
        predicate::{Predicate, TypeError},
        value::Value,
    };

    enum Expect {
        Is(bool),
        TypeErr,
    }

    fn int_list(items: &[i64]) -> Vec<Value> {
        items.iter().copied().map(Value::Int).collect()
    }

    // Full operator truth matrix: every row is also asserted under negation,
    // which must flip booleans and preserve type errors.
    #[test]
    fn truth_matrix_with_negation() {
        use Expect::{Is, TypeErr};

        let null = Value::Null;
        let cases: Vec<(Predicate, Value, Expect)> = vec![
            (Predicate::eq(0), Value::Int(0), Is(true)),
            (Predicate::eq(0), Value::from(-0.0_f64), Is(true)),
            (Predicate::eq(-0.0_f64), Value::from(0.0_f32), Is(true)),
            (Predicate::eq(0), Value::Int(1), Is(false)),
            (Predicate::eq(0), null.clone(), Is(false)),
            (Predicate::eq(null.clone()), null.clone(), Is(true)),
            (Predicate::eq(null.clone()), Value::Int(0), Is(false)),
            (
                Predicate::eq(f64::INFINITY),
                Value::from(f64::NEG_INFINITY),
                Is(false),
            ),
            (
                Predicate::eq(f32::INFINITY),
                Value::from(f32::NEG_INFINITY),
                Is(false),
            ),
            (
                Predicate::eq(f32::INFINITY),
                Value::from(f64::NEG_INFINITY),
                Is(false),
            ),
            (
                Predicate::eq(f32::INFINITY),
                Value::from(f64::INFINITY),
                Is(true),
            ),
            (Predicate::neq(0), Value::Int(0), Is(false)),
            (Predicate::neq(0), null.clone(), Is(true)),
            (Predicate::neq(null.clone()), null.clone(), Is(false)),
            (Predicate::neq(null.clone()), Value::Int(0), Is(true)),
            (Predicate::gt(0), Value::Int(-1), Is(false)),
            (Predicate::gt(0), Value::Int(0), Is(false)),
            (Predicate::gt(0), Value::Int(1), Is(true)),
            (Predicate::lt(0), Value::Int(-1), Is(true)),
            (Predicate::lt(0), Value::Int(0), Is(false)),
            (Predicate::lt(0), Value::Int(1), Is(false)),
            (Predicate::gte(0), Value::Int(-1), Is(false)),
            (Predicate::gte(0), Value::Int(0), Is(true)),
            (Predicate::gte(0), Value::Int(1), Is(true)),
            (Predicate::lte(0), Value::Int(-1), Is(true)),
            (Predicate::lte(0), Value::Int(0), Is(true)),
            (Predicate::lte(0), Value::Int(1), Is(false)),
            (Predicate::between(1, 10), Value::Int(0), Is(false)),
            (Predicate::between(1, 10), Value::Int(1), Is(true)),
            (Predicate::between(1, 10), Value::Int(9), Is(true)),
            (Predicate::between(1, 10), Value::Int(10), Is(false)),
            (Predicate::inside(1, 10), Value::Int(0), Is(false)),
            (Predicate::inside(1, 10), Value::Int(1), Is(false)),
            (Predicate::inside(1, 10), Value::Int(9), Is(true)),
            (Predicate::inside(1, 10), Value::Int(10), Is(false)),
            (Predicate::outside(1, 10), Value::Int(0), Is(true)),
            (Predicate::outside(1, 10), Value::Int(1), Is(false)),
            (Predicate::outside(1, 10), Value::Int(9), Is(false)),
            (Predicate::outside(1, 10), Value::Int(10), Is(false)),
            (Predicate::within(int_list(&[])), Value::Int(0), Is(false)),
            (
                Predicate::within(vec![null.clone()]),
                Value::Int(0),
                Is(false),
            ),
            (
                Predicate::within(vec![null.clone()]),
                null.clone(),
                Is(true),
            ),
            (
                Predicate::within(vec![null.clone(), Value::Int(2), Value::Int(3)]),
                Value::Int(0),
                Is(false),
            ),
            (
                Predicate::within(vec![null.clone(), Value::Int(2), Value::Int(3)]),
                null.clone(),
                Is(true),
            ),
            (
                Predicate::within(vec![null.clone(), Value::Int(2), Value::Int(3)]),
                Value::Int(2),
                Is(true),
            ),
            (Predicate::within(int_list(&[1, 2, 3])), Value::Int(0), Is(false)),
            (Predicate::within(int_list(&[1, 2, 3])), Value::Int(1), Is(true)),
            (Predicate::within(int_list(&[1, 2, 3])), Value::Int(10), Is(false)),
            (
                Predicate::within(int_list(&[1, 2, 3])),
                Value::from(2.0_f64),
                Is(true),
            ),
            (Predicate::without(int_list(&[])), Value::Int(0), Is(true)),
            (
                Predicate::without(vec![null.clone()]),
                Value::Int(0),
                Is(true),
            ),
            (
                Predicate::without(vec![null.clone()]),
                null.clone(),
                Is(false),
            ),
            (
                Predicate::without(vec![null.clone(), Value::Int(2), Value::Int(3)]),
                Value::Int(0),
                Is(true),
            ),
            (
                Predicate::without(vec![null.clone(), Value::Int(2), Value::Int(3)]),
                null.clone(),
                Is(false),
            ),
            (
                Predicate::without(vec![null.clone(), Value::Int(2), Value::Int(3)]),
                Value::Int(2),
                Is(false),
            ),
            (Predicate::without(int_list(&[1, 2, 3])), Value::Int(0), Is(true)),
            (Predicate::without(int_list(&[1, 2, 3])), Value::Int(1), Is(false)),
            (Predicate::without(int_list(&[1, 2, 3])), Value::Int(10), Is(true)),
            (
                Predicate::between("m", "n").and(Predicate::neq("marko")),
                Value::Text("marko".into()),
                Is(false),
            ),
            (
                Predicate::between("m", "n").and(Predicate::neq("marko")),
                Value::Text("matthias".into()),
                Is(true),
            ),
            (
                Predicate::between("m", "n").or(Predicate::eq("daniel")),
                Value::Text("marko".into()),
                Is(true),
            ),
            (
                Predicate::between("m", "n").or(Predicate::eq("daniel")),
                Value::Text("daniel".into()),
                Is(true),
            ),
            (
                Predicate::between("m", "n").or(Predicate::eq("daniel")),
                Value::Text("stephen".into()),
                Is(false),
            ),
            (Predicate::containing("ark"), Value::Text("marko".into()), Is(true)),
            (Predicate::containing("ark"), Value::Text("josh".into()), Is(false)),
            (
                Predicate::starting_with("jo"),
                Value::Text("marko".into()),
                Is(false),
            ),
            (
                Predicate::starting_with("jo"),
                Value::Text("josh".into()),
                Is(true),
            ),
            (
                Predicate::ending_with("ter"),
                Value::Text("marko".into()),
                Is(false),
            ),
            (
                Predicate::ending_with("ter"),
                Value::Text("peter".into()),
                Is(true),
            ),
            (
                Predicate::containing("o").and(Predicate::gte("j")),
                Value::Text("marko".into()),
                Is(true),
            ),
            (
                Predicate::containing("o")
                    .and(Predicate::gte("j"))
                    .and(Predicate::ending_with("ko")),
                Value::Text("marko".into()),
                Is(true),
            ),
            (
                Predicate::containing("o")
                    .and(Predicate::gte("j").and(Predicate::ending_with("ko"))),
                Value::Text("josh".into()),
                Is(false),
            ),
            // type errors
            (
                Predicate::outside(1, f64::NAN),
                Value::Int(0),
                TypeErr,
            ),
            (
                Predicate::outside(f64::NAN, f64::NAN),
                Value::Int(0),
                TypeErr,
            ),
            (Predicate::inside(-1, f64::NAN), Value::Int(0), TypeErr),
            (Predicate::inside(f64::NAN, 1), Value::Int(0), TypeErr),
            (Predicate::gt(f64::NAN), Value::Int(0), TypeErr),
            (Predicate::containing(null.clone()), Value::Text("abc".into()), TypeErr),
            (Predicate::containing("abc"), null.clone(), TypeErr),
            (Predicate::containing(null.clone()), null.clone(), TypeErr),
            (
                Predicate::starting_with(null.clone()),
                Value::Text("abc".into()),
                TypeErr,
            ),
            (Predicate::starting_with("abc"), null.clone(), TypeErr),
            (
                Predicate::ending_with(null.clone()),
                Value::Text("abc".into()),
                TypeErr,
            ),
            (Predicate::ending_with("abc"), null.clone(), TypeErr),
            (Predicate::gt(1), Value::Text("one".into()), TypeErr),
        ];

        for (predicate, value, expected) in cases {
            let result = predicate.test(&value);
            let negated = predicate.clone().negate().test(&value);
            let not = Predicate::not(predicate.clone()).test(&value);

            match expected {
                Expect::Is(expected) => {
                    assert_eq!(
                        result,
                        Ok(expected),
                        "{predicate:?}.test({value:?})"
                    );
                    assert_eq!(
                        negated,
                        Ok(!expected),
                        "negated {predicate:?}.test({value:?})"
                    );
                    assert_eq!(not, Ok(!expected), "not({predicate:?}).test({value:?})");
                }
                Expect::TypeErr => {
                    assert!(result.is_err(), "{predicate:?}.test({value:?})");
                    assert!(negated.is_err(), "negated {predicate:?}.test({value:?})");
                    assert!(not.is_err(), "not({predicate:?}).test({value:?})");
                }
            }
        }
    }

    #[test]
    fn empty_membership_sets_compose() {
        let zero = Value::Int(0);
        let empty = int_list(&[]);

        let within_and_within =
            Predicate::within(empty.clone()).and(Predicate::within(empty.clone()));
        let within_and_without =
            Predicate::within(empty.clone()).and(Predicate::without(empty.clone()));
        let without_and_without =
            Predicate::without(empty.clone()).and(Predicate::without(empty.clone()));
        let within_or_without =
            Predicate::within(empty.clone()).or(Predicate::without(empty));

        assert_eq!(within_and_within.test(&zero), Ok(false));
        assert_eq!(within_and_without.test(&zero), Ok(false));
        assert_eq!(without_and_without.test(&zero), Ok(true));
        assert_eq!(within_or_without.test(&zero), Ok(true));
    }

    #[test]
    fn nan_bound_errors_are_eager() {
        // the low bound alone already decides 0 < 1, but the NaN high bound
        // must still surface as a type error
        let err = Predicate::outside(1, f64::NAN)
            .test(&Value::Int(0))
            .unwrap_err();

        assert!(matches!(err, TypeError::NanBound { .. }));
    }

    #[test]
    fn and_short_circuits_before_later_type_errors() {
        let predicate = Predicate::eq(1).and(Predicate::containing("x"));

        // first child is false for 0, so the invalid text comparison on an
        // int value is never reached
        assert_eq!(predicate.test(&Value::Int(0)), Ok(false));
        assert!(predicate.test(&Value::Int(1)).is_err());
    }

    #[test]
    fn malformed_range_bounds_are_type_errors() {
        let mut predicate = Predicate::between(1, 10);
        predicate.set_operand(Value::Int(1));

        assert_eq!(
            predicate.test(&Value::Int(5)),
            Err(TypeError::MalformedBound {
                op: crate::predicate::TestOp::Between
            })
        );
    }
}
