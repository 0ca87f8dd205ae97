//! A radiating plate heated at its centre.
//!
//! Each cell of the plate loses heat by thermal radiation to a fixed
//! environment temperature, and a heater deposits power evenly into the
//! central 2×2 block of cells:
//!
//! ```text
//! emission[i,j] = σ · ε · dx² · (T[i,j]⁴ − T_env⁴)
//! T[i,j]       -= dt · emission[i,j] / (c · m_cell)
//! T[block]     += dt · P / (c · 4 · m_cell)
//! m_cell        = ρ · thickness · dx²
//! ```
//!
//! Emission is evaluated from the temperatures at the start of each internal
//! step.

use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};
use uom::si::{
    f64::{
        HeatCapacity, Length, Mass, MassDensity, Power, SpecificHeatCapacity,
        ThermodynamicTemperature, Time,
    },
    length::meter,
    mass_density::kilogram_per_cubic_meter,
    power::watt,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermodynamic_temperature::kelvin,
    time::second,
};

use braid_core::{
    Error, FieldId, Grid, SubModel,
    units::{Dimension, FieldUnit},
};

/// The Stefan–Boltzmann constant, W/(m²·K⁴).
pub const STEFAN_BOLTZMANN: f64 = 5.670_374_419e-8;

/// Physical parameters of a [`BlackBodyEmitter`].
///
/// The default is a 1 mm copper plate in a 293 K room, heated by an 80 W
/// candle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    /// Internal step.
    pub timestep: Time,
    pub density: MassDensity,
    pub heat_capacity: SpecificHeatCapacity,
    /// Plate thickness.
    pub thickness: Length,
    pub environment_temperature: ThermodynamicTemperature,
    /// Total heater power, split evenly over the central 2×2 block.
    pub heating_power: Power,
    /// Fraction of black-body emission, in `[0, 1]`.
    pub emissivity: f64,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            timestep: Time::new::<second>(0.5),
            density: MassDensity::new::<kilogram_per_cubic_meter>(8920.0),
            heat_capacity: SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(380.0),
            thickness: Length::new::<meter>(0.001),
            environment_temperature: ThermodynamicTemperature::new::<kelvin>(293.0),
            heating_power: Power::new::<watt>(80.0),
            emissivity: 1.0,
        }
    }
}

impl EmitterConfig {
    /// Validates the physical parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if any quantity is non-finite or out of range.
    pub fn validate(&self) -> Result<(), &'static str> {
        fn positive(value: f64) -> bool {
            value.is_finite() && value > 0.0
        }

        if !positive(self.timestep.value) {
            return Err("timestep must be finite and positive");
        }
        if !positive(self.density.value) {
            return Err("density must be finite and positive");
        }
        if !positive(self.heat_capacity.value) {
            return Err("heat_capacity must be finite and positive");
        }
        if !positive(self.thickness.value) {
            return Err("thickness must be finite and positive");
        }
        if !self.environment_temperature.value.is_finite()
            || self.environment_temperature.value < 0.0
        {
            return Err("environment_temperature must be finite and non-negative");
        }
        if !self.heating_power.value.is_finite() {
            return Err("heating_power must be finite");
        }
        if !(0.0..=1.0).contains(&self.emissivity) {
            return Err("emissivity must be in [0, 1]");
        }
        Ok(())
    }
}

/// A locally computed plate model that radiates heat and is heated at its centre.
///
/// The emitter owns its grid. The grid must carry a `temperature` field in a
/// temperature unit; an `emission` field in watts is added if missing and is
/// refreshed after every evolve.
#[derive(Debug, Clone, PartialEq)]
pub struct BlackBodyEmitter {
    config: EmitterConfig,
    grid: Grid,
    model_time: Time,
}

impl BlackBodyEmitter {
    /// Creates an emitter at model time zero.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if `config` fails validation.
    /// - [`Error::InvalidValue`] if the grid is smaller than 2×2.
    /// - [`Error::UnknownField`] or [`Error::UnitMismatch`] if the grid has no
    ///   temperature field in a temperature unit.
    pub fn new(mut grid: Grid, config: EmitterConfig) -> Result<Self, Error> {
        config
            .validate()
            .map_err(|reason| Error::InvalidConfig { reason })?;

        let (nx, ny) = grid.shape();
        if nx < 2 || ny < 2 {
            return Err(Error::InvalidValue {
                subject: "emitter grid",
                reason: "must have at least 2×2 cells for the heated block",
            });
        }
        temperature_unit(&grid)?;

        if !grid.has_field(FieldId::Emission) {
            grid.add_field(FieldId::Emission, FieldUnit::Watt, 0.0);
        }

        let mut emitter = Self {
            config,
            grid,
            model_time: Time::new::<second>(0.0),
        };
        emitter.record_emission()?;
        Ok(emitter)
    }

    #[must_use]
    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    #[must_use]
    pub fn model_time(&self) -> Time {
        self.model_time
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    /// Mass of one cell, `ρ · thickness · dx²`.
    #[must_use]
    pub fn cell_mass(&self) -> Mass {
        let cellsize = self.grid.cellsize();
        self.config.density * self.config.thickness * cellsize * cellsize
    }

    /// Temperature rise of each heated cell over one internal step.
    #[must_use]
    pub fn heating_per_step(&self) -> f64 {
        let capacity: HeatCapacity = self.config.heat_capacity * self.cell_mass();
        (self.config.timestep * self.config.heating_power).value / (4.0 * capacity.value)
    }

    /// Radiated power of every cell at the current temperatures, in watts.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid's temperature field was removed or
    /// replaced with a non-temperature unit.
    pub fn emission(&self) -> Result<Array2<f64>, Error> {
        let unit = temperature_unit(&self.grid)?;
        let cellsize = self.grid.cellsize().get::<meter>();
        let coefficient = STEFAN_BOLTZMANN * self.config.emissivity * cellsize * cellsize;
        let environment = self.config.environment_temperature.get::<kelvin>().powi(4);

        Ok(self
            .grid
            .field(FieldId::Temperature)?
            .values()
            .mapv(|t| coefficient * (unit.to_base(t).powi(4) - environment)))
    }

    /// Total radiated power of the plate.
    ///
    /// # Errors
    ///
    /// See [`BlackBodyEmitter::emission`].
    pub fn total_emission(&self) -> Result<Power, Error> {
        Ok(Power::new::<watt>(self.emission()?.sum()))
    }

    /// Advances the plate to `tend` in whole internal steps.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTargetTime`] if `tend` is not finite or precedes
    /// the model time.
    pub fn evolve_model(&mut self, tend: Time) -> Result<(), Error> {
        if !tend.value.is_finite() || tend < self.model_time {
            return Err(Error::InvalidTargetTime {
                requested: tend.get::<second>(),
                current: self.model_time.get::<second>(),
            });
        }

        let dt = self.config.timestep;
        let capacity: HeatCapacity = self.config.heat_capacity * self.cell_mass();
        let cooling = dt.value / capacity.value;
        let heating = self.heating_per_step();
        let block = central_block(self.grid.shape());
        let unit = temperature_unit(&self.grid)?;

        while self.model_time < tend - dt / 2.0 {
            let emission = self.emission()?;
            let temperature = self.grid.field_mut(FieldId::Temperature)?.values_mut();

            Zip::from(&mut *temperature)
                .and(&emission)
                .for_each(|t, &e| *t = unit.from_base(unit.to_base(*t) - cooling * e));
            for offset in block {
                let t = &mut temperature[offset];
                *t = unit.from_base(unit.to_base(*t) + heating);
            }

            self.model_time += dt;
        }

        self.record_emission()
    }

    fn record_emission(&mut self) -> Result<(), Error> {
        let emission = self.emission()?;
        self.grid
            .field_mut(FieldId::Emission)?
            .values_mut()
            .assign(&emission);
        Ok(())
    }
}

impl SubModel for BlackBodyEmitter {
    fn name(&self) -> &'static str {
        "black_body_emitter"
    }

    fn model_time(&self) -> Result<Time, Error> {
        Ok(self.model_time)
    }

    fn internal_step(&self) -> Result<Time, Error> {
        Ok(self.config.timestep)
    }

    fn evolve_model(&mut self, tend: Time) -> Result<(), Error> {
        BlackBodyEmitter::evolve_model(self, tend)
    }

    fn grid(&self) -> Result<&Grid, Error> {
        Ok(&self.grid)
    }

    fn grid_mut(&mut self) -> Result<&mut Grid, Error> {
        Ok(&mut self.grid)
    }
}

/// 0-based offsets of the central 2×2 block.
fn central_block((nx, ny): (usize, usize)) -> [[usize; 2]; 4] {
    let (i, j) = (nx / 2 - 1, ny / 2 - 1);
    [[i, j], [i, j + 1], [i + 1, j], [i + 1, j + 1]]
}

fn temperature_unit(grid: &Grid) -> Result<FieldUnit, Error> {
    let unit = grid.field(FieldId::Temperature)?.unit();
    if unit.dimension() == Dimension::Temperature {
        Ok(unit)
    } else {
        Err(Error::UnitMismatch {
            subject: FieldId::Temperature.name(),
            expected: Dimension::Temperature,
            found: unit.dimension(),
        })
    }
}
