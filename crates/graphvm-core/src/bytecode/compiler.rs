use crate::{
    bytecode::{Bytecode, Instruction, op},
    coefficient::Coefficient,
    machine::{Processor, SessionMemory, SharedMemory},
    step::{
        CompiledStep, FilterFunction, MapFunction, SideEffectFunction, SourceFunction,
        filter::{IdentityFilter, IsFilter},
        map::{ConstantMap, IncrMap, PathMap},
        side_effect::AggregateSideEffect,
        source::InjectSource,
    },
    value::Value,
};
use thiserror::Error as ThisError;
use tracing::trace;

///
/// CompileError
///
/// Fatal at compile time: the register/submit call fails before any
/// traverser is produced.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CompileError {
    #[error("unknown operation '{op}'")]
    UnknownOperation { op: String },

    #[error("a traversal must begin with a source step, found '{op}'")]
    MissingSource { op: String },

    #[error("source step '{op}' cannot appear mid-traversal")]
    MisplacedSource { op: String },

    #[error("invalid arguments for '{op}': {reason}")]
    InvalidArguments { op: String, reason: String },
}

///
/// SourceCompilation
///
/// The persisted form of a session: accumulated source instructions plus
/// the side-effect memory written during prior submissions.
///

pub struct SourceCompilation<C: Coefficient> {
    source_code: Bytecode<C>,
    memory: SharedMemory,
}

impl<C: Coefficient> SourceCompilation<C> {
    #[must_use]
    pub fn new(source_code: Bytecode<C>) -> Self {
        Self {
            source_code,
            memory: SessionMemory::shared(),
        }
    }

    #[must_use]
    pub const fn source_code(&self) -> &Bytecode<C> {
        &self.source_code
    }

    /// Accumulate another register call's source instructions. Session
    /// memory is preserved across merges.
    pub fn merge(&mut self, incoming: &Bytecode<C>) {
        self.source_code.merge_source_instructions(incoming);
    }

    /// A point-in-time snapshot of the named session memory.
    #[must_use]
    pub fn memory_snapshot(&self) -> SessionMemory {
        self.memory.read().clone()
    }

    // Consistent view for one submit: cloned source code, shared memory.
    pub(crate) fn snapshot(&self) -> Self {
        Self {
            source_code: self.source_code.clone(),
            memory: SharedMemory::clone(&self.memory),
        }
    }

    pub(crate) fn memory_handle(&self) -> SharedMemory {
        SharedMemory::clone(&self.memory)
    }
}

// Stages after the source; the compiler guarantees no nested sources.
pub(crate) enum PipelineStep<C: Coefficient> {
    Filter(Box<dyn FilterFunction<C>>),
    Map(Box<dyn MapFunction<C>>),
    SideEffect(Box<dyn SideEffectFunction<C>>),
}

///
/// Compilation
///
/// An executable pipeline: one source, a stage chain, and the session
/// memory side-effects write into.
///

pub struct Compilation<C: Coefficient> {
    source: Box<dyn SourceFunction<C>>,
    stages: Vec<PipelineStep<C>>,
    memory: SharedMemory,
}

impl<C: Coefficient> std::fmt::Debug for Compilation<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compilation")
            .field("stages", &self.stages.len())
            .finish_non_exhaustive()
    }
}

impl<C: Coefficient> Compilation<C> {
    /// Compile standalone bytecode with no session context.
    pub fn compile(bytecode: &Bytecode<C>) -> Result<Self, CompileError> {
        Self::build(None, bytecode)
    }

    /// Compile against a pre-existing session: its source instructions are
    /// applied to session memory before the traversal instructions run.
    pub fn compile_with_source(
        source: &SourceCompilation<C>,
        bytecode: &Bytecode<C>,
    ) -> Result<Self, CompileError> {
        Self::build(Some(source), bytecode)
    }

    fn build(
        session: Option<&SourceCompilation<C>>,
        bytecode: &Bytecode<C>,
    ) -> Result<Self, CompileError> {
        let memory = session.map_or_else(SessionMemory::shared, SourceCompilation::memory_handle);

        if let Some(session) = session {
            apply_source_instructions(&memory, session.source_code().source_instructions())?;
        }
        apply_source_instructions(&memory, bytecode.source_instructions())?;

        let mut instructions = bytecode.instructions().iter();
        let source: Box<dyn SourceFunction<C>> = match instructions.next() {
            None => Box::new(InjectSource::empty()),
            Some(instruction) => match compile_step(instruction)? {
                CompiledStep::Source(source) => source,
                _ => {
                    return Err(CompileError::MissingSource {
                        op: instruction.op().to_string(),
                    });
                }
            },
        };

        let mut stages = Vec::new();
        for instruction in instructions {
            match compile_step(instruction)? {
                CompiledStep::Source(_) => {
                    return Err(CompileError::MisplacedSource {
                        op: instruction.op().to_string(),
                    });
                }
                CompiledStep::Filter(step) => stages.push(PipelineStep::Filter(step)),
                CompiledStep::Map(step) => stages.push(PipelineStep::Map(step)),
                CompiledStep::SideEffect(step) => stages.push(PipelineStep::SideEffect(step)),
            }
        }

        trace!(stages = stages.len(), "compiled traversal pipeline");

        Ok(Self {
            source,
            stages,
            memory,
        })
    }

    /// Hand the pipeline over to its pull-driven result sequence.
    #[must_use]
    pub fn into_processor(self) -> Processor<C> {
        Processor::new(self.source, self.stages, self.memory)
    }
}

///
/// Step factory registry
///
/// Closed compile-time dispatch from operation name to step constructor.
/// Unknown names fail here, before any traverser is produced.
///

pub(crate) fn compile_step<C: Coefficient>(
    instruction: &Instruction<C>,
) -> Result<CompiledStep<C>, CompileError> {
    trace!(op = instruction.op(), "compiling instruction");

    match instruction.op() {
        op::INJECT => Ok(CompiledStep::Source(Box::new(InjectSource::compile(
            instruction,
        )?))),
        op::IDENTITY => Ok(CompiledStep::Filter(Box::new(IdentityFilter::compile(
            instruction,
        )?))),
        op::IS => Ok(CompiledStep::Filter(Box::new(IsFilter::compile(
            instruction,
        )?))),
        op::CONSTANT => Ok(CompiledStep::Map(Box::new(ConstantMap::compile(
            instruction,
        )?))),
        op::INCR => Ok(CompiledStep::Map(Box::new(IncrMap::compile(instruction)?))),
        op::PATH => Ok(CompiledStep::Map(Box::new(PathMap::compile(instruction)?))),
        op::AGGREGATE => Ok(CompiledStep::SideEffect(Box::new(
            AggregateSideEffect::compile(instruction)?,
        ))),
        other => Err(CompileError::UnknownOperation {
            op: other.to_string(),
        }),
    }
}

// Apply session-configuring source instructions to session memory. The
// reserved session marker is machine-level and carries nothing to apply.
fn apply_source_instructions<C: Coefficient>(
    memory: &SharedMemory,
    instructions: &[Instruction<C>],
) -> Result<(), CompileError> {
    for instruction in instructions {
        match instruction.op() {
            op::SESSION => {}
            op::BIND => {
                let (name, value) = bind_args(instruction)?;
                memory.write().bind(name, value);
            }
            other => {
                return Err(CompileError::UnknownOperation {
                    op: other.to_string(),
                });
            }
        }
    }

    Ok(())
}

fn bind_args<C: Coefficient>(instruction: &Instruction<C>) -> Result<(String, Value), CompileError> {
    use crate::bytecode::Arg;

    let [Arg::Value(Value::Text(name)), Arg::Value(initial)] = instruction.args() else {
        return Err(CompileError::InvalidArguments {
            op: instruction.op().to_string(),
            reason: "takes a memory name and an initial value".to_string(),
        });
    };

    Ok((name.clone(), initial.clone()))
}
