use crate::{
    bytecode::{Arg, Instruction, compiler::CompileError},
    coefficient::Coefficient,
    error::MachineError,
    predicate::TypeError,
    step::{MapFunction, StepInfo, impl_step_function},
    traverser::Traverser,
    value::{Float32, Float64, Value},
};

///
/// ConstantMap
///
/// Replaces every traverser value with a fixed literal.
///

pub struct ConstantMap<C: Coefficient> {
    info: StepInfo<C>,
    constant: Value,
}

impl<C: Coefficient> ConstantMap<C> {
    pub fn compile(instruction: &Instruction<C>) -> Result<Self, CompileError> {
        let [Arg::Value(constant)] = instruction.args() else {
            return Err(CompileError::InvalidArguments {
                op: instruction.op().to_string(),
                reason: "takes exactly one literal".to_string(),
            });
        };

        Ok(Self {
            info: StepInfo::from_instruction(instruction),
            constant: constant.clone(),
        })
    }
}

impl<C: Coefficient> MapFunction<C> for ConstantMap<C> {
    fn apply(&mut self, _traverser: &Traverser<C>) -> Result<Value, MachineError> {
        Ok(self.constant.clone())
    }
}

///
/// IncrMap
///
/// Numeric increment; non-numeric input is a type error, not a silent skip.
///

pub struct IncrMap<C: Coefficient> {
    info: StepInfo<C>,
}

impl<C: Coefficient> IncrMap<C> {
    pub fn compile(instruction: &Instruction<C>) -> Result<Self, CompileError> {
        Ok(Self {
            info: StepInfo::from_instruction(instruction),
        })
    }
}

impl<C: Coefficient> MapFunction<C> for IncrMap<C> {
    fn apply(&mut self, traverser: &Traverser<C>) -> Result<Value, MachineError> {
        match traverser.value() {
            Value::Int(i) => Ok(Value::Int(i.saturating_add(1))),
            Value::Float32(f) => Ok(Value::Float32(Float32::new(f.get() + 1.0))),
            Value::Float64(f) => Ok(Value::Float64(Float64::new(f.get() + 1.0))),
            other => Err(TypeError::NumericRequired {
                step: "incr",
                found: other.kind_name(),
            }
            .into()),
        }
    }
}

///
/// PathMap
///
/// Materializes the traverser's path as a list value.
///

pub struct PathMap<C: Coefficient> {
    info: StepInfo<C>,
}

impl<C: Coefficient> PathMap<C> {
    pub fn compile(instruction: &Instruction<C>) -> Result<Self, CompileError> {
        Ok(Self {
            info: StepInfo::from_instruction(instruction),
        })
    }
}

impl<C: Coefficient> MapFunction<C> for PathMap<C> {
    fn apply(&mut self, traverser: &Traverser<C>) -> Result<Value, MachineError> {
        Ok(Value::List(traverser.path().values().cloned().collect()))
    }
}

impl_step_function!(ConstantMap, IncrMap, PathMap);
