use crate::{
    bytecode::compiler::CompileError,
    predicate::{ComposeError, TypeError},
};
use thiserror::Error as ThisError;

///
/// MachineError
///
/// Everything a register/submit call or a running pipeline can surface.
/// Composition and type errors are local to one evaluation; compile errors
/// abort only the call that triggered them. None of them corrupt the
/// session map or other in-flight operations.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MachineError {
    #[error(transparent)]
    Compose(#[from] ComposeError),

    #[error(transparent)]
    Type(#[from] TypeError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl MachineError {
    /// True when a predicate was inapplicable to a value, as opposed to
    /// evaluating to false.
    #[must_use]
    pub const fn is_type_error(&self) -> bool {
        matches!(self, Self::Type(_))
    }

    #[must_use]
    pub const fn is_compile_error(&self) -> bool {
        matches!(self, Self::Compile(_))
    }
}

///
/// TESTS
///
