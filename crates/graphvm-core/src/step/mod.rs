pub mod filter;
pub mod map;
pub mod side_effect;
pub mod source;

use crate::{
    bytecode::Instruction, coefficient::Coefficient, error::MachineError, machine::SessionMemory,
    traverser::Traverser, value::Value,
};
use std::collections::BTreeSet;

///
/// Step function contract
///
/// Every pipeline stage is one of four shapes: a source produces initial
/// values, a filter keeps or drops traversers, a map replaces the value,
/// and a side-effect writes session memory while passing the traverser
/// through. Stages share no mutable state except the explicit session
/// memory handed to side-effects.
///

///
/// StepFunction
///

pub trait StepFunction<C: Coefficient> {
    fn coefficient(&self) -> &C;
    fn labels(&self) -> &BTreeSet<String>;
}

///
/// SourceFunction
///
/// The leading stage; pulls raw values from its provider until exhausted.
///

pub trait SourceFunction<C: Coefficient>: StepFunction<C> {
    fn pull(&mut self) -> Option<Value>;
}

///
/// FilterFunction
///

pub trait FilterFunction<C: Coefficient>: StepFunction<C> {
    fn test(&mut self, traverser: &Traverser<C>) -> Result<bool, MachineError>;
}

///
/// MapFunction
///

pub trait MapFunction<C: Coefficient>: StepFunction<C> {
    fn apply(&mut self, traverser: &Traverser<C>) -> Result<Value, MachineError>;
}

///
/// SideEffectFunction
///

pub trait SideEffectFunction<C: Coefficient>: StepFunction<C> {
    fn apply(
        &mut self,
        traverser: &Traverser<C>,
        memory: &mut SessionMemory,
    ) -> Result<(), MachineError>;
}

///
/// CompiledStep
///
/// Closed union over the step shapes; what the per-operation factories
/// return to the compiler.
///

pub enum CompiledStep<C: Coefficient> {
    Source(Box<dyn SourceFunction<C>>),
    Filter(Box<dyn FilterFunction<C>>),
    Map(Box<dyn MapFunction<C>>),
    SideEffect(Box<dyn SideEffectFunction<C>>),
}

///
/// StepInfo
///
/// Coefficient and labels every step carries, lifted off its instruction.
///

#[derive(Clone, Debug)]
pub struct StepInfo<C: Coefficient> {
    pub(crate) coefficient: C,
    pub(crate) labels: BTreeSet<String>,
}

impl<C: Coefficient> StepInfo<C> {
    #[must_use]
    pub fn from_instruction(instruction: &Instruction<C>) -> Self {
        Self {
            coefficient: instruction.coefficient().clone(),
            labels: instruction.labels().clone(),
        }
    }
}

// Expand the StepFunction boilerplate for steps embedding a `info` field.
macro_rules! impl_step_function {
    ( $( $step:ident ),* $(,)? ) => {
        $(
            impl<C: $crate::coefficient::Coefficient> $crate::step::StepFunction<C> for $step<C> {
                fn coefficient(&self) -> &C {
                    &self.info.coefficient
                }

                fn labels(&self) -> &std::collections::BTreeSet<String> {
                    &self.info.labels
                }
            }
        )*
    };
}

pub(crate) use impl_step_function;
