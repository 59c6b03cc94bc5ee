use crate::{
    bytecode::{Arg, Instruction, compiler::CompileError},
    coefficient::Coefficient,
    step::{SourceFunction, StepInfo, impl_step_function},
    value::Value,
};
use std::collections::VecDeque;

///
/// InjectSource
///
/// Seeds the pipeline with the literal values of its instruction. The stock
/// source step; graph-backed providers plug in through the same
/// [`SourceFunction`] seam.
///

pub struct InjectSource<C: Coefficient> {
    info: StepInfo<C>,
    values: VecDeque<Value>,
}

impl<C: Coefficient> InjectSource<C> {
    pub fn compile(instruction: &Instruction<C>) -> Result<Self, CompileError> {
        let mut values = VecDeque::with_capacity(instruction.args().len());
        for arg in instruction.args() {
            match arg {
                Arg::Value(value) => values.push_back(value.clone()),
                Arg::Predicate(_) => {
                    return Err(CompileError::InvalidArguments {
                        op: instruction.op().to_string(),
                        reason: "takes literal values, not predicates".to_string(),
                    });
                }
            }
        }

        Ok(Self {
            info: StepInfo::from_instruction(instruction),
            values,
        })
    }

    /// A source that yields nothing; used for bytecode with no traversal
    /// instructions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            info: StepInfo {
                coefficient: C::unity(),
                labels: std::collections::BTreeSet::new(),
            },
            values: VecDeque::new(),
        }
    }
}

impl<C: Coefficient> SourceFunction<C> for InjectSource<C> {
    fn pull(&mut self) -> Option<Value> {
        self.values.pop_front()
    }
}

impl_step_function!(InjectSource);
