mod eval;


use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Predicate algebra
///
/// Composable boolean tests over traversal values. A predicate is a tagged
/// tree: leaves carry an operator and a comparison operand, internal nodes
/// are AND/OR connectives over an ordered child sequence. Composition
/// flattens same-connective nodes, so the tree never nests AND under AND or
/// OR under OR. All interpretation lives in `eval`.
///

///
/// TestOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum TestOp {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    Between,
    Inside,
    Outside,
    Within,
    Without,
    Containing,
    StartingWith,
    EndingWith,
}

impl fmt::Display for TestOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Between => "between",
            Self::Inside => "inside",
            Self::Outside => "outside",
            Self::Within => "within",
            Self::Without => "without",
            Self::Containing => "containing",
            Self::StartingWith => "startingWith",
            Self::EndingWith => "endingWith",
        };
        write!(f, "{label}")
    }
}

///
/// TestPredicate
///
/// One leaf: operator, mutable comparison operand, and a negation flag.
/// Negating a leaf flips the flag instead of rewriting the operator, so
/// every operator (including the text family) has an exact inverse.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct TestPredicate {
    pub op: TestOp,
    pub operand: Value,
    pub negated: bool,
}

impl TestPredicate {
    #[must_use]
    pub fn new(op: TestOp, operand: impl Into<Value>) -> Self {
        Self {
            op,
            operand: operand.into(),
            negated: false,
        }
    }

    #[must_use]
    pub const fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }
}

///
/// Predicate
///

#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    Test(TestPredicate),
    And(Vec<Self>),
    Or(Vec<Self>),
}

impl Predicate {
    ///
    /// CONSTRUCTION
    ///

    #[must_use]
    pub fn eq(value: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(TestOp::Eq, value))
    }

    #[must_use]
    pub fn neq(value: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(TestOp::Neq, value))
    }

    #[must_use]
    pub fn gt(value: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(TestOp::Gt, value))
    }

    #[must_use]
    pub fn lt(value: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(TestOp::Lt, value))
    }

    #[must_use]
    pub fn gte(value: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(TestOp::Gte, value))
    }

    #[must_use]
    pub fn lte(value: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(TestOp::Lte, value))
    }

    #[must_use]
    pub fn between(lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(
            TestOp::Between,
            Value::List(vec![lo.into(), hi.into()]),
        ))
    }

    #[must_use]
    pub fn inside(lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(
            TestOp::Inside,
            Value::List(vec![lo.into(), hi.into()]),
        ))
    }

    #[must_use]
    pub fn outside(lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(
            TestOp::Outside,
            Value::List(vec![lo.into(), hi.into()]),
        ))
    }

    #[must_use]
    pub fn within<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Test(TestPredicate::new(TestOp::Within, Value::from_list(values.into_iter().collect())))
    }

    #[must_use]
    pub fn without<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Test(TestPredicate::new(TestOp::Without, Value::from_list(values.into_iter().collect())))
    }

    #[must_use]
    pub fn containing(needle: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(TestOp::Containing, needle))
    }

    #[must_use]
    pub fn starting_with(needle: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(TestOp::StartingWith, needle))
    }

    #[must_use]
    pub fn ending_with(needle: impl Into<Value>) -> Self {
        Self::Test(TestPredicate::new(TestOp::EndingWith, needle))
    }

    ///
    /// COMPOSITION
    ///

    /// Conjoin two predicates.
    ///
    /// Same-connective children are spliced into one node, so
    /// `a.and(b.and(c))` is a single three-child AND. Since every AND is
    /// built here, AND nodes never nest.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        Self::And(Self::splice_and(vec![self, other]))
    }

    /// Disjoin two predicates. Mirror of [`and`](Self::and).
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self::Or(Self::splice_or(vec![self, other]))
    }

    fn splice_and(children: Vec<Self>) -> Vec<Self> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Self::And(grandchildren) => out.extend(grandchildren),
                other => out.push(other),
            }
        }

        out
    }

    fn splice_or(children: Vec<Self>) -> Vec<Self> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Self::Or(grandchildren) => out.extend(grandchildren),
                other => out.push(other),
            }
        }

        out
    }

    /// Logical inverse: leaves flip their negation flag, connectives apply
    /// De Morgan over negated children. The result shares no state with the
    /// input.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Test(leaf) => Self::Test(leaf.negate()),
            Self::And(children) => Self::Or(children.into_iter().map(Self::negate).collect()),
            Self::Or(children) => Self::And(children.into_iter().map(Self::negate).collect()),
        }
    }

    /// Free-function spelling of [`negate`](Self::negate).
    #[must_use]
    pub fn not(predicate: Self) -> Self {
        predicate.negate()
    }

    ///
    /// EVALUATION
    ///

    /// Evaluate this predicate against a value.
    ///
    /// A semantically invalid comparison (NaN bound, null text operand,
    /// cross-family ordering) is a [`TypeError`], distinguished from a
    /// `false` outcome.
    pub fn test(&self, value: &Value) -> Result<bool, TypeError> {
        eval::test(self, value)
    }

    ///
    /// OPERAND
    ///

    /// The leaf comparison operand; `None` for connective nodes.
    #[must_use]
    pub const fn operand(&self) -> Option<&Value> {
        if let Self::Test(leaf) = self {
            Some(&leaf.operand)
        } else {
            None
        }
    }

    /// Replace the leaf comparison operand. Connective nodes are unchanged.
    pub fn set_operand(&mut self, operand: Value) {
        if let Self::Test(leaf) = self {
            leaf.operand = operand;
        }
    }
}

///
/// Connective
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Connective {
    And,
    Or,
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
        }
    }
}

///
/// ComposeError
///
/// Raised when a non-predicate argument is combined with `and`/`or`.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("only predicates can be {connective}'d together")]
pub struct ComposeError {
    pub connective: Connective,
}

///
/// TypeError
///
/// Distinguished non-boolean outcome of a predicate test: the comparison was
/// semantically invalid rather than false.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum TypeError {
    #[error("cannot compare {left} with {right}")]
    Incomparable {
        left: &'static str,
        right: &'static str,
    },

    #[error("NaN is not a usable bound for '{op}'")]
    NanBound { op: TestOp },

    #[error("'{op}' requires a two-element bound list")]
    MalformedBound { op: TestOp },

    #[error("'{op}' requires text on both sides")]
    TextRequired { op: TestOp },

    #[error("'{step}' requires a numeric value, found {found}")]
    NumericRequired {
        step: &'static str,
        found: &'static str,
    },
}
