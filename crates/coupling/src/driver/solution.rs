use uom::si::f64::Time;

/// Indicates how a coupled run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Reached the target time.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// The result of a coupled run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// How the run terminated.
    pub status: Status,

    /// Number of cycles completed during this run.
    pub cycles: usize,

    /// The coupled model time when the run returned.
    pub model_time: Time,
}
