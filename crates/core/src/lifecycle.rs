use std::fmt;

use crate::Error;

/// The phase of a stateful solver handle.
///
/// A handle starts [`State::Uninitialized`] and ends [`State::Stopped`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum State {
    #[default]
    Uninitialized,
    Initialized,
    Run,
    End,
    Stopped,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Uninitialized => "UNINITIALIZED",
            State::Initialized => "INITIALIZED",
            State::Run => "RUN",
            State::End => "END",
            State::Stopped => "STOPPED",
        };
        f.write_str(name)
    }
}

/// An operation category whose legality depends on the lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Initialize,
    GetParameter,
    SetParameter,
    Commit,
    Evolve,
    GetField,
    SetField,
    Query,
    Cleanup,
    Stop,
}

impl Operation {
    /// Every operation category, in declaration order.
    pub const ALL: [Operation; 10] = [
        Operation::Initialize,
        Operation::GetParameter,
        Operation::SetParameter,
        Operation::Commit,
        Operation::Evolve,
        Operation::GetField,
        Operation::SetField,
        Operation::Query,
        Operation::Cleanup,
        Operation::Stop,
    ];
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Initialize => "initialize",
            Operation::GetParameter => "get a parameter",
            Operation::SetParameter => "set a parameter",
            Operation::Commit => "commit parameters",
            Operation::Evolve => "evolve",
            Operation::GetField => "read a field",
            Operation::SetField => "write a field",
            Operation::Query => "query the model",
            Operation::Cleanup => "clean up",
            Operation::Stop => "stop",
        };
        f.write_str(name)
    }
}

/// What a permitted operation does to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// Permitted without a state change.
    Stay,
    /// Permitted, and moves the handle to a new state once it succeeds.
    MoveTo(State),
    /// Already satisfied; the operation is skipped.
    Skip,
}

impl State {
    fn rule(self, operation: Operation) -> Option<Rule> {
        use Operation as Op;
        use State as S;

        match (self, operation) {
            (S::Uninitialized, Op::Initialize) => Some(Rule::MoveTo(S::Initialized)),
            (S::Initialized, Op::Commit) => Some(Rule::MoveTo(S::Run)),
            (S::Initialized | S::Run, Op::GetParameter | Op::SetParameter | Op::Query) => {
                Some(Rule::Stay)
            }
            (S::Run, Op::Evolve | Op::GetField | Op::SetField) => Some(Rule::Stay),
            (S::Initialized | S::Run | S::End, Op::Cleanup) => Some(Rule::MoveTo(S::End)),
            (S::End, Op::Stop) => Some(Rule::MoveTo(S::Stopped)),
            (S::Stopped, Op::Stop) => Some(Rule::Skip),
            _ => None,
        }
    }

    /// Returns `true` if `operation` may be invoked in this state.
    #[must_use]
    pub fn permits(self, operation: Operation) -> bool {
        self.rule(operation).is_some()
    }
}

/// Guards every operation on a solver handle against its current state.
///
/// All legality decisions go through [`Lifecycle::guard`] or
/// [`Lifecycle::transition`]; handles never inspect the state themselves to
/// decide whether an operation is allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lifecycle {
    state: State,
}

impl Lifecycle {
    /// Creates a controller in [`State::Uninitialized`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> State {
        self.state
    }

    /// Checks that `operation` is permitted without running it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] if the current state forbids it.
    pub fn guard(&self, operation: Operation) -> Result<(), Error> {
        self.rule(operation).map(|_| ())
    }

    /// Runs `action` under the guard for `operation`.
    ///
    /// If the operation moves the handle to a new state, the move happens only
    /// after `action` succeeds. Operations that are already satisfied, such as
    /// stopping a stopped handle, skip `action` entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] if the current state forbids
    /// `operation`, or the error returned by `action`. The state is unchanged
    /// in both cases.
    pub fn transition<F>(&mut self, operation: Operation, action: F) -> Result<(), Error>
    where
        F: FnOnce() -> Result<(), Error>,
    {
        match self.rule(operation)? {
            Rule::Skip => Ok(()),
            Rule::Stay => action(),
            Rule::MoveTo(next) => {
                action()?;
                tracing::debug!(from = %self.state, to = %next, %operation, "lifecycle transition");
                self.state = next;
                Ok(())
            }
        }
    }

    fn rule(&self, operation: Operation) -> Result<Rule, Error> {
        self.state.rule(operation).ok_or_else(|| {
            tracing::debug!(state = %self.state, %operation, "rejected operation");
            Error::IllegalStateTransition {
                operation,
                state: self.state,
            }
        })
    }
}
