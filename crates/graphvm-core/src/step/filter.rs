use crate::{
    bytecode::{Arg, Instruction, compiler::CompileError},
    coefficient::Coefficient,
    error::MachineError,
    predicate::Predicate,
    step::{FilterFunction, StepInfo, impl_step_function},
    traverser::Traverser,
};

///
/// IdentityFilter
///
/// Keeps every traverser; carries labels and coefficient like any stage.
///

pub struct IdentityFilter<C: Coefficient> {
    info: StepInfo<C>,
}

impl<C: Coefficient> IdentityFilter<C> {
    pub fn compile(instruction: &Instruction<C>) -> Result<Self, CompileError> {
        Ok(Self {
            info: StepInfo::from_instruction(instruction),
        })
    }
}

impl<C: Coefficient> FilterFunction<C> for IdentityFilter<C> {
    fn test(&mut self, _traverser: &Traverser<C>) -> Result<bool, MachineError> {
        Ok(true)
    }
}

///
/// IsFilter
///
/// Applies a predicate to the traverser value. A literal argument is sugar
/// for an equality predicate.
///

pub struct IsFilter<C: Coefficient> {
    info: StepInfo<C>,
    predicate: Predicate,
}

impl<C: Coefficient> IsFilter<C> {
    pub fn compile(instruction: &Instruction<C>) -> Result<Self, CompileError> {
        let predicate = match instruction.args() {
            [Arg::Predicate(predicate)] => predicate.clone(),
            [Arg::Value(value)] => Predicate::eq(value.clone()),
            args => {
                return Err(CompileError::InvalidArguments {
                    op: instruction.op().to_string(),
                    reason: format!("takes one predicate or literal, found {}", args.len()),
                });
            }
        };

        Ok(Self {
            info: StepInfo::from_instruction(instruction),
            predicate,
        })
    }
}

impl<C: Coefficient> FilterFunction<C> for IsFilter<C> {
    fn test(&mut self, traverser: &Traverser<C>) -> Result<bool, MachineError> {
        self.predicate
            .test(traverser.value())
            .map_err(MachineError::from)
    }
}

impl_step_function!(IdentityFilter, IsFilter);
