use braid_core::Observer;
use uom::si::f64::{Power, ThermodynamicTemperature, Time};

use crate::{
    Summary,
    traits::{HasCycle, HasGrids, HasModelTime},
};

/// One recorded cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub cycle: usize,
    pub model_time: Time,
    /// Hottest cell of the primary grid.
    pub max_temperature: ThermodynamicTemperature,
    /// Mean cell temperature of the primary grid.
    pub mean_temperature: ThermodynamicTemperature,
    /// Total emission recorded on the secondary grid, if it carries one.
    pub total_emission: Option<Power>,
}

/// Records a [`Sample`] for every observed cycle.
///
/// Cycles whose primary grid has no temperature field are skipped. The
/// recorder never requests an action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Recorder {
    samples: Vec<Sample>,
}

impl Recorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[must_use]
    pub fn last(&self) -> Option<&Sample> {
        self.samples.last()
    }

    #[must_use]
    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}

impl<E, A> Observer<E, A> for Recorder
where
    E: HasCycle + HasModelTime + HasGrids,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        let primary = Summary::of(event.primary())?;
        let total_emission = Summary::of(event.secondary()).and_then(|s| s.total_emission);

        self.samples.push(Sample {
            cycle: event.cycle(),
            model_time: event.model_time(),
            max_temperature: primary.max_temperature,
            mean_temperature: primary.mean_temperature,
            total_emission,
        });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use braid_core::{FieldId, Grid, units::FieldUnit};
    use braid_coupling::{
        BlackBodyEmitter, CouplingConfig, CouplingDriver, EmitterConfig,
        driver::{Action, Event, Status},
    };
    use uom::si::{
        f64::Length, length::meter, power::watt, thermodynamic_temperature::kelvin,
        time::second,
    };

    use crate::{TemperatureCeiling, TraceObserver};

    fn plate() -> Grid {
        Grid::new(4, 4, Length::new::<meter>(0.01))
            .unwrap()
            .with_field(FieldId::Temperature, FieldUnit::Kelvin, 293.0)
    }

    /// An idle primary coupled to a heated, non-radiating secondary.
    fn heated_pair() -> CouplingDriver<BlackBodyEmitter, BlackBodyEmitter> {
        let idle = EmitterConfig {
            timestep: Time::new::<second>(1.0),
            heating_power: Power::new::<watt>(0.0),
            emissivity: 0.0,
            ..EmitterConfig::default()
        };
        let heater = EmitterConfig {
            timestep: Time::new::<second>(0.5),
            emissivity: 0.0,
            ..EmitterConfig::default()
        };
        let config = CouplingConfig {
            coupling_step: Time::new::<second>(1.0),
            ..CouplingConfig::default()
        };

        CouplingDriver::new(
            BlackBodyEmitter::new(plate(), idle).unwrap(),
            BlackBodyEmitter::new(plate(), heater).unwrap(),
            config,
        )
        .unwrap()
    }

    #[test]
    fn records_every_cycle() {
        let mut driver = heated_pair();
        let mut recorder = Recorder::new();

        driver
            .run(
                Time::new::<second>(3.0),
                |event: &Event<'_>| -> Option<Action> { recorder.observe(event) },
            )
            .unwrap();

        let samples = recorder.samples();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].cycle, 1);
        assert_relative_eq!(samples[2].model_time.get::<second>(), 3.0);
        assert!(samples[2].max_temperature > samples[0].max_temperature);
        assert!(samples[0].mean_temperature.get::<kelvin>() > 293.0);
        assert_relative_eq!(samples[2].total_emission.unwrap().get::<watt>(), 0.0);
    }

    #[test]
    fn ceiling_stops_and_recorder_keeps_up() {
        let mut driver = heated_pair();
        let mut recorder = Recorder::new();
        let mut ceiling = TemperatureCeiling::new(ThermodynamicTemperature::new::<kelvin>(300.0));
        let mut trace = TraceObserver;

        let solution = driver
            .run(Time::new::<second>(1000.0), |event: &Event<'_>| -> Option<Action> {
                Observer::<_, Action>::observe(&mut trace, event);
                Observer::<_, Action>::observe(&mut recorder, event);
                ceiling.observe(event)
            })
            .unwrap();

        assert_eq!(solution.status, Status::StoppedByObserver);
        assert_eq!(recorder.samples().len(), solution.cycles);
        let last = recorder.last().unwrap();
        assert!(last.max_temperature.get::<kelvin>() >= 300.0);
    }
}
