//! Strang-split coupling of two sub-models.
//!
//! The driver advances a primary and a secondary [`SubModel`] together, one
//! coupling step `Δ` at a time, exchanging fields between their grids:
//!
//! ```text
//! secondary → t + Δ/2,  copy secondary → primary
//! primary   → t + Δ,    copy primary   → secondary
//! secondary → t + Δ,    copy secondary → primary
//! ```
//!
//! # Example
//!
//! ```ignore
//! use braid_coupling::{CouplingDriver, driver::Config};
//!
//! let mut driver = CouplingDriver::new(heat, emitter, Config::default())?;
//! let solution = driver.run_unobserved(tend)?;
//!
//! println!("{} cycles to t = {:?}", solution.cycles, solution.model_time);
//! ```

mod action;
mod config;
mod event;
mod solution;

pub use action::Action;
pub use config::Config;
pub use event::Event;
pub use solution::{Solution, Status};

use braid_core::{Error, ExchangeChannel, FieldId, Observer, SubModel};
use uom::si::{f64::Time, time::second};

/// Advances a primary and a secondary model with operator splitting.
///
/// The driver owns both models and its own coupled model time, which starts
/// at zero. Runs may be resumed: a later [`run`](Self::run) continues from
/// where the previous one returned.
#[derive(Debug)]
pub struct CouplingDriver<P, S> {
    primary: P,
    secondary: S,
    config: Config,
    model_time: Time,
    cycles: usize,
}

impl<P: SubModel, S: SubModel> CouplingDriver<P, S> {
    /// Pairs two models for coupling.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `config` fails validation.
    /// - [`Error::ShapeMismatch`] if the two grids differ in shape.
    /// - [`Error::UnknownField`] or [`Error::UnitMismatch`] if an exchanged
    ///   field is missing from either grid or has incompatible units.
    /// - Any error either model reports when its grid is read.
    pub fn new(primary: P, secondary: S, config: Config) -> Result<Self, Error> {
        config
            .validate()
            .map_err(|reason| Error::InvalidConfig { reason })?;

        let (from, to) = (secondary.grid()?, primary.grid()?);
        ExchangeChannel::validate(from, to, &config.fields)?;
        ExchangeChannel::validate(to, from, &config.fields)?;

        Ok(Self {
            primary,
            secondary,
            config,
            model_time: Time::new::<second>(0.0),
            cycles: 0,
        })
    }

    /// Advances both models to `tend`.
    ///
    /// Cycles run while the coupled time is more than half a coupling step
    /// short of `tend`, so the final time overshoots by at most half a step.
    ///
    /// # Observer
    ///
    /// The observer receives an [`Event`] after each completed cycle and may
    /// return [`Action::StopEarly`] to end the run.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTargetTime`] if `tend` is not finite or precedes the
    ///   coupled time.
    /// - [`Error::StepSizeError`] if either model's internal step exceeds the
    ///   coupling step. Checked before any model is advanced.
    /// - Any error a model or exchange reports. The run stops at the failing
    ///   call and both grids keep their last state.
    pub fn run<Obs>(&mut self, tend: Time, mut observer: Obs) -> Result<Solution, Error>
    where
        Obs: for<'a> Observer<Event<'a>, Action>,
    {
        if !tend.value.is_finite() || tend < self.model_time {
            return Err(Error::InvalidTargetTime {
                requested: tend.get::<second>(),
                current: self.model_time.get::<second>(),
            });
        }

        let step = self.config.coupling_step;
        let half_step = step / 2.0;
        check_step(&self.primary, step)?;
        check_step(&self.secondary, step)?;

        let fields = self.config.fields.as_slice();
        let mut cycles = 0;

        while self.model_time < tend - half_step {
            self.secondary.evolve_model(self.model_time + half_step)?;
            exchange(&self.secondary, &mut self.primary, fields)?;

            self.primary.evolve_model(self.model_time + step)?;
            exchange(&self.primary, &mut self.secondary, fields)?;

            self.secondary.evolve_model(self.model_time + step)?;
            exchange(&self.secondary, &mut self.primary, fields)?;

            self.model_time += step;
            self.cycles += 1;
            cycles += 1;

            tracing::trace!(
                cycle = self.cycles,
                time_s = self.model_time.get::<second>(),
                "coupling cycle complete"
            );

            let event = Event {
                cycle: self.cycles,
                model_time: self.model_time,
                primary: self.primary.grid()?,
                secondary: self.secondary.grid()?,
            };
            if let Some(Action::StopEarly) = observer.observe(&event) {
                tracing::debug!(cycles, "coupled run stopped by observer");
                return Ok(Solution {
                    status: Status::StoppedByObserver,
                    cycles,
                    model_time: self.model_time,
                });
            }
        }

        tracing::debug!(
            cycles,
            time_s = self.model_time.get::<second>(),
            "coupled run complete"
        );
        Ok(Solution {
            status: Status::Complete,
            cycles,
            model_time: self.model_time,
        })
    }

    /// Advances both models to `tend` without observation.
    ///
    /// This is a convenience wrapper around [`run`](Self::run) that discards
    /// events.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run).
    pub fn run_unobserved(&mut self, tend: Time) -> Result<Solution, Error> {
        self.run(tend, ())
    }

    /// The coupled model time.
    #[must_use]
    pub fn model_time(&self) -> Time {
        self.model_time
    }

    /// Total cycles completed over the driver's lifetime.
    #[must_use]
    pub fn cycles(&self) -> usize {
        self.cycles
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn primary(&self) -> &P {
        &self.primary
    }

    pub fn primary_mut(&mut self) -> &mut P {
        &mut self.primary
    }

    #[must_use]
    pub fn secondary(&self) -> &S {
        &self.secondary
    }

    pub fn secondary_mut(&mut self) -> &mut S {
        &mut self.secondary
    }

    /// Returns both models, ending the coupling.
    pub fn into_parts(self) -> (P, S) {
        (self.primary, self.secondary)
    }
}

fn check_step<M: SubModel>(model: &M, limit: Time) -> Result<(), Error> {
    let step = model.internal_step()?;
    if step > limit {
        return Err(Error::StepSizeError {
            model: model.name(),
            step: step.get::<second>(),
            limit: limit.get::<second>(),
        });
    }
    Ok(())
}

/// Copies `fields` from one model's grid into the other's.
fn exchange<F, T>(from: &F, to: &mut T, fields: &[FieldId]) -> Result<(), Error>
where
    F: SubModel,
    T: SubModel,
{
    from.grid()?
        .new_channel_to(to.grid_mut()?)
        .copy_attributes(fields)
}
