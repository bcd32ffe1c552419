use thiserror::Error;

use crate::scheduler::ParamId;

/// Errors surfaced by scheduling calls. All of them are local-call
/// failures: the timeline is left unchanged whenever a call is rejected.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum AutomationError {
    #[error("parameter {0:?} is not registered")]
    UnknownParameter(ParamId),
    #[error("parameter {0:?} is already registered")]
    DuplicateParameter(ParamId),
    #[error("exponential curve cannot reach {0}; substitute a step or linear curve")]
    InvalidExponentialTarget(f64),
    #[error("target decay requires a positive time constant, got {0}")]
    InvalidDuration(f64),
}
