//! GraphVM — a session-aware bytecode machine and streaming executor for
//! graph traversal queries.
//!
//! ## Crate layout
//! - `core`: the execution core — values, predicates, bytecode, the
//!   compiler, and the session machine.
//!
//! The `prelude` module mirrors the surface a traversal client uses.

pub use graphvm_core as core;

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use graphvm_core::error::MachineError as Error;

///
/// Client Prelude
///

pub mod prelude {
    pub use crate::core::{
        bytecode::{Arg, Bytecode, Instruction, op},
        coefficient::{Coefficient, LongCoefficient},
        error::MachineError,
        machine::{LocalMachine, Machine, Processor, SessionMemory},
        predicate::Predicate,
        traverser::Traverser,
        value::Value,
    };
}

///
/// TESTS
///
