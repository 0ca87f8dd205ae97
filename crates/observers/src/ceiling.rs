use braid_core::Observer;
use uom::si::f64::ThermodynamicTemperature;

use crate::{
    Summary,
    traits::{CanStopEarly, HasGrids},
};

/// Stops a run once the primary grid's hottest cell reaches a limit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemperatureCeiling {
    limit: ThermodynamicTemperature,
}

impl TemperatureCeiling {
    #[must_use]
    pub fn new(limit: ThermodynamicTemperature) -> Self {
        Self { limit }
    }
}

impl<E, A> Observer<E, A> for TemperatureCeiling
where
    E: HasGrids,
    A: CanStopEarly,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        let summary = Summary::of(event.primary())?;
        if summary.max_temperature >= self.limit {
            tracing::debug!("temperature ceiling reached");
            return Some(A::stop_early());
        }
        None
    }
}
