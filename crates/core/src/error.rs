use thiserror::Error;

use crate::{FieldId, Operation, State, units::Dimension};

/// Classified failures reported by every Braid operation.
///
/// Lifecycle and registry violations are detected locally, before any call
/// reaches a solver backend. Backend failures surface as
/// [`Error::RemoteCallFailure`] with the code the backend reported.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The operation is not permitted in the current lifecycle state.
    #[error("cannot {operation} while the solver is in state {state}")]
    IllegalStateTransition { operation: Operation, state: State },

    /// No parameter with this name is registered.
    #[error("unknown parameter `{name}`")]
    UnknownParameter { name: String },

    /// The parameter was fixed at commit and can no longer be changed.
    #[error("parameter `{parameter}` is locked after commit")]
    ParameterLocked { parameter: &'static str },

    /// A value or field unit has the wrong physical dimension.
    #[error("unit mismatch for `{subject}`: expected {expected}, found {found}")]
    UnitMismatch {
        subject: &'static str,
        expected: Dimension,
        found: Dimension,
    },

    /// Two grids that must share a shape do not.
    #[error("shape mismatch: source is {from:?}, target is {to:?}")]
    ShapeMismatch { from: (usize, usize), to: (usize, usize) },

    /// A model was asked to evolve backwards in time.
    #[error("target time {requested} s precedes model time {current} s")]
    InvalidTargetTime { requested: f64, current: f64 },

    /// A model's internal step would overshoot a coupling step.
    #[error("{model} steps by {step} s, which exceeds the coupling step of {limit} s")]
    StepSizeError {
        model: &'static str,
        step: f64,
        limit: f64,
    },

    /// The solver backend reported an error code.
    #[error("remote call `{operation}` failed with code {code}")]
    RemoteCallFailure { operation: &'static str, code: i32 },

    /// The grid does not carry the requested field.
    #[error("grid has no `{field}` field")]
    UnknownField { field: FieldId },

    /// A 1-based cell index lies outside the grid.
    #[error("cell ({i}, {j}) is outside the grid range (1..={nx}, 1..={ny})")]
    IndexOutOfBounds {
        i: usize,
        j: usize,
        nx: usize,
        ny: usize,
    },

    /// A configuration struct failed validation.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    /// A value is outside its valid domain.
    #[error("invalid value for `{subject}`: {reason}")]
    InvalidValue {
        subject: &'static str,
        reason: &'static str,
    },
}
