use crate::{
    bytecode::{Arg, Instruction, compiler::CompileError},
    coefficient::Coefficient,
    error::MachineError,
    machine::SessionMemory,
    step::{SideEffectFunction, StepInfo, impl_step_function},
    traverser::Traverser,
    value::Value,
};

///
/// AggregateSideEffect
///
/// Appends every traverser value into a named session-memory list and
/// passes the traverser through unchanged. The accumulated list is readable
/// through the session after the result sequence is consumed.
///

pub struct AggregateSideEffect<C: Coefficient> {
    info: StepInfo<C>,
    key: String,
}

impl<C: Coefficient> AggregateSideEffect<C> {
    pub fn compile(instruction: &Instruction<C>) -> Result<Self, CompileError> {
        let [Arg::Value(Value::Text(key))] = instruction.args() else {
            return Err(CompileError::InvalidArguments {
                op: instruction.op().to_string(),
                reason: "takes one memory name".to_string(),
            });
        };

        Ok(Self {
            info: StepInfo::from_instruction(instruction),
            key: key.clone(),
        })
    }
}

impl<C: Coefficient> SideEffectFunction<C> for AggregateSideEffect<C> {
    fn apply(
        &mut self,
        traverser: &Traverser<C>,
        memory: &mut SessionMemory,
    ) -> Result<(), MachineError> {
        memory.append(&self.key, traverser.value().clone());

        Ok(())
    }
}

impl_step_function!(AggregateSideEffect);
