pub mod compiler;


use crate::{
    coefficient::Coefficient,
    predicate::{ComposeError, Connective, Predicate},
    value::Value,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

///
/// Operation names
///
/// The closed vocabulary the compiler resolves. Source operations configure
/// a session; traversal operations describe pipeline steps.
///

pub mod op {
    /// Reserved source instruction carrying a session id across round-trips.
    pub const SESSION: &str = "session";
    /// Source instruction declaring a named session-memory binding.
    pub const BIND: &str = "bind";

    /// Source step seeding the pipeline with literal values.
    pub const INJECT: &str = "inject";
    /// Filter that keeps everything.
    pub const IDENTITY: &str = "identity";
    /// Filter applying a predicate to the traverser value.
    pub const IS: &str = "is";
    /// Map to a fixed literal.
    pub const CONSTANT: &str = "constant";
    /// Numeric increment map.
    pub const INCR: &str = "incr";
    /// Map materializing the traverser path.
    pub const PATH: &str = "path";
    /// Side-effect appending values into named session memory.
    pub const AGGREGATE: &str = "aggregate";
}

///
/// Arg
///
/// One instruction argument: a literal value or a predicate. Predicates are
/// first-class arguments so filter steps can carry composed tests.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Arg {
    Value(Value),
    Predicate(Predicate),
}

impl Arg {
    /// Conjoin two predicate arguments.
    ///
    /// Anything else in either position is a composition error naming the
    /// attempted connective.
    pub fn and(self, other: Self) -> Result<Self, ComposeError> {
        match (self, other) {
            (Self::Predicate(left), Self::Predicate(right)) => {
                Ok(Self::Predicate(left.and(right)))
            }
            _ => Err(ComposeError {
                connective: Connective::And,
            }),
        }
    }

    /// Disjoin two predicate arguments. Mirror of [`and`](Self::and).
    pub fn or(self, other: Self) -> Result<Self, ComposeError> {
        match (self, other) {
            (Self::Predicate(left), Self::Predicate(right)) => Ok(Self::Predicate(left.or(right))),
            _ => Err(ComposeError {
                connective: Connective::Or,
            }),
        }
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Predicate> for Arg {
    fn from(predicate: Predicate) -> Self {
        Self::Predicate(predicate)
    }
}

///
/// Instruction
///
/// An operation name, its ordered arguments, an optional label set, and a
/// coefficient.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: Coefficient")]
pub struct Instruction<C: Coefficient> {
    op: String,
    args: Vec<Arg>,
    labels: BTreeSet<String>,
    coefficient: C,
}

impl<C: Coefficient> Instruction<C> {
    #[must_use]
    pub fn new(op: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            op: op.into(),
            args,
            labels: BTreeSet::new(),
            coefficient: C::unity(),
        }
    }

    #[must_use]
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_coefficient(mut self, coefficient: C) -> Self {
        self.coefficient = coefficient;
        self
    }

    #[must_use]
    pub fn op(&self) -> &str {
        &self.op
    }

    #[must_use]
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    #[must_use]
    pub const fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    #[must_use]
    pub const fn coefficient(&self) -> &C {
        &self.coefficient
    }
}

///
/// Bytecode
///
/// Two ordered instruction sequences: source instructions configuring a
/// session and traversal instructions describing pipeline steps.
/// Identity-agnostic: equality is over the sequences alone.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(bound = "C: Coefficient")]
pub struct Bytecode<C: Coefficient> {
    source_instructions: Vec<Instruction<C>>,
    instructions: Vec<Instruction<C>>,
}

impl<C: Coefficient> Bytecode<C> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            source_instructions: Vec::new(),
            instructions: Vec::new(),
        }
    }

    ///
    /// BUILDING
    ///

    pub fn add_source_instruction(&mut self, instruction: Instruction<C>) {
        self.source_instructions.push(instruction);
    }

    /// Add a source instruction after dropping any existing one with the
    /// same operation name.
    pub fn add_unique_source_instruction(&mut self, instruction: Instruction<C>) {
        self.source_instructions.retain(|i| i.op != instruction.op);
        self.source_instructions.push(instruction);
    }

    pub fn add_instruction(&mut self, instruction: Instruction<C>) {
        self.instructions.push(instruction);
    }

    #[must_use]
    pub fn with_source(mut self, instruction: Instruction<C>) -> Self {
        self.add_source_instruction(instruction);
        self
    }

    #[must_use]
    pub fn with_step(mut self, instruction: Instruction<C>) -> Self {
        self.add_instruction(instruction);
        self
    }

    ///
    /// ACCESS
    ///

    #[must_use]
    pub fn source_instructions(&self) -> &[Instruction<C>] {
        &self.source_instructions
    }

    #[must_use]
    pub fn instructions(&self) -> &[Instruction<C>] {
        &self.instructions
    }

    ///
    /// SESSION ACCUMULATION
    ///

    /// Append all of `incoming`'s source instructions onto this bytecode,
    /// preserving order. Used to accumulate session configuration across
    /// register calls.
    pub fn merge_source_instructions(&mut self, incoming: &Self) {
        self.source_instructions
            .extend(incoming.source_instructions.iter().cloned());
    }

    /// Keep only the source instructions matching the guard.
    pub fn retain_source_instructions(&mut self, keep: impl FnMut(&Instruction<C>) -> bool) {
        self.source_instructions.retain(keep);
    }
}

impl<C: Coefficient> Default for Bytecode<C> {
    fn default() -> Self {
        Self::new()
    }
}
