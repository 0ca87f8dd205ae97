use braid_core::Observer;
use uom::si::{power::watt, thermodynamic_temperature::kelvin, time::second};

use crate::{
    Summary,
    traits::{HasCycle, HasGrids, HasModelTime},
};

/// Logs the progress of every cycle at `info` level.
///
/// Each line carries the model time, the primary grid's maximum and mean
/// temperature, and the secondary grid's total emission when present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceObserver;

impl<E, A> Observer<E, A> for TraceObserver
where
    E: HasCycle + HasModelTime + HasGrids,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        let cycle = event.cycle();
        let time_s = event.model_time().get::<second>();

        match Summary::of(event.primary()) {
            Some(primary) => {
                let emission_w = Summary::of(event.secondary())
                    .and_then(|s| s.total_emission)
                    .map(|p| p.get::<watt>());
                tracing::info!(
                    cycle,
                    time_s,
                    max_k = primary.max_temperature.get::<kelvin>(),
                    mean_k = primary.mean_temperature.get::<kelvin>(),
                    emission_w,
                    "coupling progress"
                );
            }
            None => tracing::info!(cycle, time_s, "coupling progress"),
        }
        None
    }
}
