use braid_core::Grid;
use uom::si::f64::Time;

/// Event emitted by the coupling driver after each completed cycle.
///
/// Both grids reflect the state after the cycle's final exchange.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// The cycle number, counted from 1 over the driver's lifetime.
    pub cycle: usize,

    /// The coupled model time at the end of the cycle.
    pub model_time: Time,

    pub primary: &'a Grid,

    pub secondary: &'a Grid,
}
