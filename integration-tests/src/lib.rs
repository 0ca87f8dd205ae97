//! Shared fixtures for the end-to-end scenarios: a 1 mm copper plate heated
//! by a candle.

use braid_core::{
    Error, Grid,
    units::{ThermalDiffusivity, thermal_diffusivity},
};
use braid_coupling::{BlackBodyEmitter, CouplingConfig, CouplingDriver, EmitterConfig};
use braid_heat::{Heat2dBackend, Heat2dKernel, HeatSolver};
use uom::si::{
    f64::{Length, Power, ThermodynamicTemperature, Time},
    length::meter,
    power::watt,
    thermodynamic_temperature::kelvin,
};

/// Thermal conductivity / (density · specific heat) of copper, m²/s.
#[must_use]
pub fn copper_diffusivity() -> ThermalDiffusivity {
    thermal_diffusivity(401.0 / (8920.0 * 380.0))
}

/// A plate of `n × n` cells, 1 cm across each.
#[derive(Debug, Clone, Copy)]
pub struct Plate {
    pub n: usize,
    pub cellsize: Length,
    pub alpha: ThermalDiffusivity,
}

impl Plate {
    #[must_use]
    pub fn copper(n: usize) -> Self {
        Self {
            n,
            cellsize: Length::new::<meter>(0.01),
            alpha: copper_diffusivity(),
        }
    }

    /// The diffusion step `0.1 · dx² / α`.
    #[must_use]
    pub fn timestep(&self) -> Time {
        self.cellsize * self.cellsize / self.alpha * 0.1
    }

    /// A committed solver at a uniform temperature.
    ///
    /// # Errors
    ///
    /// Returns any error the solver reports while starting.
    pub fn solver<B: Heat2dBackend>(
        &self,
        backend: B,
        fill: ThermodynamicTemperature,
    ) -> Result<HeatSolver<B>, Error> {
        let mut solver = HeatSolver::new(backend);
        solver.initialize()?;
        solver.set_grid_size(self.n, self.n)?;
        solver.set_cellsize(self.cellsize)?;
        solver.set_alpha(self.alpha)?;
        solver.set_timestep(self.timestep())?;
        solver.commit()?;
        solver.fill_temperature(fill)?;
        Ok(solver)
    }

    /// A committed in-process solver at a uniform temperature.
    ///
    /// # Errors
    ///
    /// Returns any error the solver reports while starting.
    pub fn kernel_solver(
        &self,
        fill: ThermodynamicTemperature,
    ) -> Result<HeatSolver<Heat2dKernel>, Error> {
        self.solver(Heat2dKernel::new(), fill)
    }
}

/// An emitter config that heats with `power` and radiates with `emissivity`,
/// stepping at half the plate's diffusion step.
#[must_use]
pub fn emitter_config(plate: &Plate, power: f64, emissivity: f64) -> EmitterConfig {
    EmitterConfig {
        timestep: plate.timestep() / 2.0,
        heating_power: Power::new::<watt>(power),
        emissivity,
        ..EmitterConfig::default()
    }
}

/// Couples a solver with an emitter working on a copy of its grid, one
/// coupling step per diffusion step.
///
/// # Errors
///
/// Returns any error from building the emitter or driver.
pub fn couple<B: Heat2dBackend>(
    plate: &Plate,
    solver: HeatSolver<B>,
    emitter: EmitterConfig,
) -> Result<CouplingDriver<HeatSolver<B>, BlackBodyEmitter>, Error> {
    let grid: Grid = solver.grid()?.clone();
    let emitter = BlackBodyEmitter::new(grid, emitter)?;
    let config = CouplingConfig {
        coupling_step: plate.timestep(),
        ..CouplingConfig::default()
    };
    CouplingDriver::new(solver, emitter, config)
}

#[must_use]
pub fn kelvin_of(value: f64) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<kelvin>(value)
}
