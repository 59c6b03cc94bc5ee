use crate::{
    bytecode::compiler::PipelineStep,
    coefficient::Coefficient,
    error::MachineError,
    machine::{SessionMemory, SharedMemory},
    step::SourceFunction,
    traverser::Traverser,
};

///
/// Processor
///
/// The pull-driven result sequence of one compiled pipeline. Lazy and
/// finite; not restartable — every pull advances the shared cursor. The
/// processor exclusively owns its source cursor, so abandoning it
/// mid-iteration drops cleanly without touching the session map.
///

pub struct Processor<C: Coefficient> {
    source: Box<dyn SourceFunction<C>>,
    stages: Vec<PipelineStep<C>>,
    memory: SharedMemory,
    done: bool,
}

impl<C: Coefficient> Processor<C> {
    pub(crate) fn new(
        source: Box<dyn SourceFunction<C>>,
        stages: Vec<PipelineStep<C>>,
        memory: SharedMemory,
    ) -> Self {
        Self {
            source,
            stages,
            memory,
            done: false,
        }
    }

    /// A point-in-time snapshot of the memory this pipeline writes into.
    /// For session-bound pipelines this is the session's memory.
    #[must_use]
    pub fn memory_snapshot(&self) -> SessionMemory {
        self.memory.read().clone()
    }

    // Run one traverser through the stage chain; false drops it.
    fn advance(&mut self, traverser: &mut Traverser<C>) -> Result<bool, MachineError> {
        for stage in &mut self.stages {
            match stage {
                PipelineStep::Filter(step) => {
                    if !step.test(traverser)? {
                        return Ok(false);
                    }
                    traverser.pass_through(step.labels(), step.coefficient());
                }
                PipelineStep::Map(step) => {
                    let value = step.apply(traverser)?;
                    traverser.map_to(value, step.labels(), step.coefficient());
                }
                PipelineStep::SideEffect(step) => {
                    step.apply(traverser, &mut self.memory.write())?;
                    traverser.pass_through(step.labels(), step.coefficient());
                }
            }
        }

        Ok(true)
    }
}

impl<C: Coefficient> std::fmt::Debug for Processor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("stages", &self.stages.len())
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

impl<C: Coefficient> Iterator for Processor<C> {
    type Item = Result<Traverser<C>, MachineError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let Some(value) = self.source.pull() else {
                self.done = true;
                return None;
            };

            let mut traverser = Traverser::spawn(
                value,
                self.source.coefficient().clone(),
                self.source.labels(),
            );

            match self.advance(&mut traverser) {
                Ok(true) => return Some(Ok(traverser)),
                Ok(false) => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
    }
}
