//! Capability traits for reusable observers.
//!
//! These traits abstract over driver-specific event and action types so an
//! observer can be written once and used with any driver that provides them.
//!
//! # Example
//!
//! ```rust
//! use braid_core::Observer;
//! use braid_observers::traits::{CanStopEarly, HasCycle};
//!
//! struct MaxCycles(usize);
//!
//! impl<E: HasCycle, A: CanStopEarly> Observer<E, A> for MaxCycles {
//!     fn observe(&mut self, event: &E) -> Option<A> {
//!         (event.cycle() >= self.0).then(A::stop_early)
//!     }
//! }
//! ```

use braid_core::Grid;
use braid_coupling::driver;
use uom::si::f64::Time;

/// An event numbered by the cycle that produced it.
pub trait HasCycle {
    fn cycle(&self) -> usize;
}

/// An event stamped with a model time.
pub trait HasModelTime {
    fn model_time(&self) -> Time;
}

/// An event that exposes both coupled grids.
pub trait HasGrids {
    fn primary(&self) -> &Grid;

    fn secondary(&self) -> &Grid;
}

/// An action type that can signal early termination.
pub trait CanStopEarly {
    /// Returns the action that stops the run early.
    fn stop_early() -> Self;
}

// --- driver::Event ---

impl HasCycle for driver::Event<'_> {
    fn cycle(&self) -> usize {
        self.cycle
    }
}

impl HasModelTime for driver::Event<'_> {
    fn model_time(&self) -> Time {
        self.model_time
    }
}

impl HasGrids for driver::Event<'_> {
    fn primary(&self) -> &Grid {
        self.primary
    }

    fn secondary(&self) -> &Grid {
        self.secondary
    }
}

// --- driver::Action ---

impl CanStopEarly for driver::Action {
    fn stop_early() -> Self {
        Self::StopEarly
    }
}
