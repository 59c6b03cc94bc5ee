mod memory;
mod processor;


use crate::{
    bytecode::{
        Arg, Bytecode, Instruction,
        compiler::{Compilation, SourceCompilation},
        op,
    },
    coefficient::Coefficient,
    error::MachineError,
    value::Value,
};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};
use tracing::debug;
use uuid::Uuid;

// re-exports
pub use memory::{SessionMemory, SharedMemory};
pub use processor::Processor;

///
/// SessionId
///
/// Opaque, uniform-random 128-bit session identifier.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        Uuid::parse_str(text).ok().map(Self)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

///
/// Machine
///
/// The register/submit/close surface a traversal client talks to.
///

pub trait Machine<C: Coefficient> {
    /// Establish or extend a session. Returns the handle bytecode the
    /// caller must present on future calls: exactly one source instruction
    /// carrying the session id.
    fn register(&self, bytecode: Bytecode<C>) -> Bytecode<C>;

    /// Compile and execute bytecode, returning the lazy result sequence.
    /// A known session id compiles against that session; anything else is
    /// a standalone compilation.
    fn submit(&self, bytecode: &Bytecode<C>) -> Result<Processor<C>, MachineError>;

    /// Discard a session. Unknown or absent ids are no-ops.
    fn close(&self, bytecode: &Bytecode<C>);
}

///
/// LocalMachine
///
/// In-process session machine over a sharded concurrent map, so operations
/// on different sessions never serialize against each other.
///

pub struct LocalMachine<C: Coefficient> {
    sources: DashMap<SessionId, SourceCompilation<C>>,
}

impl<C: Coefficient> LocalMachine<C> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sources: DashMap::new(),
        }
    }

    /// Open a machine handle that can be shared across callers.
    #[must_use]
    pub fn open() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sources.len()
    }

    /// Snapshot of a session's named memory, if the bytecode carries a
    /// known session id.
    #[must_use]
    pub fn session_memory(&self, bytecode: &Bytecode<C>) -> Option<SessionMemory> {
        let id = Self::session_id(bytecode)?;

        self.sources
            .get(&id)
            .map(|source| source.memory_snapshot())
    }

    /// Snapshot of a session's accumulated source code, if the bytecode
    /// carries a known session id.
    #[must_use]
    pub fn session_source_code(&self, bytecode: &Bytecode<C>) -> Option<Bytecode<C>> {
        let id = Self::session_id(bytecode)?;

        self.sources
            .get(&id)
            .map(|source| source.source_code().clone())
    }

    // The session id carried by the reserved source instruction, if any.
    fn session_id(bytecode: &Bytecode<C>) -> Option<SessionId> {
        bytecode
            .source_instructions()
            .iter()
            .find(|instruction| instruction.op() == op::SESSION)
            .and_then(|instruction| match instruction.args() {
                [Arg::Value(Value::Text(id))] => SessionId::parse(id),
                _ => None,
            })
    }

    // The minimal bytecode handed back from register: only the marker.
    fn session_handle(id: SessionId) -> Bytecode<C> {
        let mut handle = Bytecode::new();
        handle.add_unique_source_instruction(Instruction::new(
            op::SESSION,
            vec![Arg::Value(Value::Text(id.to_string()))],
        ));

        handle
    }
}

impl<C: Coefficient> Machine<C> for LocalMachine<C> {
    fn register(&self, mut bytecode: Bytecode<C>) -> Bytecode<C> {
        if let Some(id) = Self::session_id(&bytecode) {
            // the shard guard keeps the merge invisible to concurrent
            // submits until it completes
            if let Some(mut stored) = self.sources.get_mut(&id) {
                bytecode.retain_source_instructions(|instruction| instruction.op() != op::SESSION);
                stored.merge(&bytecode);
                debug!(session = %id, "extended session");

                return Self::session_handle(id);
            }
        }

        let id = SessionId::random();
        self.sources.insert(id, SourceCompilation::new(bytecode));
        debug!(session = %id, "registered session");

        Self::session_handle(id)
    }

    fn submit(&self, bytecode: &Bytecode<C>) -> Result<Processor<C>, MachineError> {
        let session = Self::session_id(bytecode)
            .and_then(|id| self.sources.get(&id).map(|source| source.snapshot()));

        let compilation = match session {
            Some(session) => Compilation::compile_with_source(&session, bytecode)?,
            None => Compilation::compile(bytecode)?,
        };

        Ok(compilation.into_processor())
    }

    fn close(&self, bytecode: &Bytecode<C>) {
        if let Some(id) = Self::session_id(bytecode) {
            if self.sources.remove(&id).is_some() {
                debug!(session = %id, "closed session");
            }
        }
    }
}

impl<C: Coefficient> Default for LocalMachine<C> {
    fn default() -> Self {
        Self::new()
    }
}
