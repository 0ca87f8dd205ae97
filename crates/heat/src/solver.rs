use braid_core::{
    Entry, Error, FieldId, Grid, Lifecycle, Operation, ParameterAccess, ParameterKind,
    ParameterSet, Registry, State, SubModel, Value,
    units::{FieldUnit, ThermalDiffusivity},
};
use uom::si::{
    f64::{Length, ThermodynamicTemperature, Time},
    thermodynamic_temperature::kelvin,
    time::second,
};

use crate::{HeatParameter, backend::Heat2dBackend, remote::Remote};

/// A lifecycle-managed handle to a 2D heat-diffusion solver.
///
/// Every operation is checked against the handle's [`Lifecycle`] before the
/// backend is called:
///
/// | operation                         | permitted in          |
/// |-----------------------------------|-----------------------|
/// | [`initialize`](Self::initialize)  | `UNINITIALIZED`       |
/// | parameters, queries               | `INITIALIZED`, `RUN`  |
/// | [`commit`](Self::commit)          | `INITIALIZED`         |
/// | evolve, field access              | `RUN`                 |
/// | [`cleanup`](Self::cleanup)        | `INITIALIZED`, `RUN`, `END` |
/// | [`stop`](Self::stop)              | `END`, `STOPPED`      |
///
/// Committing allocates a local mirror grid with a kelvin `temperature`
/// field. The mirror is refreshed from the backend after every evolve, and
/// local writes are pushed to the backend before the next one.
#[derive(Debug)]
pub struct HeatSolver<B> {
    lifecycle: Lifecycle,
    registry: Registry<HeatParameter>,
    remote: Remote<B>,
    grid: Option<Grid>,
    dirty: bool,
}

impl<B: Heat2dBackend> HeatSolver<B> {
    /// Wraps a backend in a new, uninitialized handle.
    pub fn new(backend: B) -> Self {
        Self {
            lifecycle: Lifecycle::new(),
            registry: Registry::new(),
            remote: Remote::new(backend),
            grid: None,
            dirty: false,
        }
    }

    #[must_use]
    pub fn state(&self) -> State {
        self.lifecycle.state()
    }

    /// Starts the backend and hands it every parameter default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `UNINITIALIZED`, or the
    /// backend's failure.
    pub fn initialize(&mut self) -> Result<(), Error> {
        let Self {
            lifecycle,
            registry,
            remote,
            ..
        } = self;

        lifecycle.transition(Operation::Initialize, || {
            remote.initialize()?;
            registry.flush(remote)
        })
    }

    /// Commits staged parameters and allocates field storage.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `INITIALIZED`, or the
    /// backend's failure. The handle stays `INITIALIZED` on failure.
    pub fn commit(&mut self) -> Result<(), Error> {
        let Self {
            lifecycle,
            registry,
            remote,
            grid,
            dirty,
        } = self;

        lifecycle.transition(Operation::Commit, || {
            registry.flush(remote)?;
            remote.commit()?;

            let nx = fetch(remote, HeatParameter::NgridX)?;
            let ny = fetch(remote, HeatParameter::NgridY)?;
            let cellsize = fetch(remote, HeatParameter::Cellsize)?;

            let mut mirror =
                Grid::new(nx, ny, cellsize)?.with_field(FieldId::Temperature, FieldUnit::Kelvin, 0.0);
            pull(remote, &mut mirror)?;

            *grid = Some(mirror);
            *dirty = false;
            Ok(())
        })
    }

    /// Releases the backend's resources.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] if `UNINITIALIZED` or
    /// `STOPPED`, or the backend's failure.
    pub fn cleanup(&mut self) -> Result<(), Error> {
        let Self {
            lifecycle, remote, ..
        } = self;

        lifecycle.transition(Operation::Cleanup, || remote.cleanup())
    }

    /// Stops the handle and releases its grid. Stopping twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `END` or `STOPPED`.
    pub fn stop(&mut self) -> Result<(), Error> {
        let Self { lifecycle, grid, .. } = self;

        lifecycle.transition(Operation::Stop, || {
            *grid = None;
            Ok(())
        })
    }

    /// Cleans up if still active, then stops.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] if `UNINITIALIZED`, or the
    /// backend's failure during cleanup.
    pub fn shutdown(&mut self) -> Result<(), Error> {
        if matches!(self.state(), State::Initialized | State::Run) {
            self.cleanup()?;
        }
        self.stop()
    }

    /// Advances the solver to `tend`.
    ///
    /// Local grid writes are pushed first, and the grid is refreshed after.
    /// Evolving to the current model time takes no internal steps.
    ///
    /// # Errors
    ///
    /// - [`Error::IllegalStateTransition`] unless `RUN`.
    /// - [`Error::InvalidTargetTime`] if `tend` is not finite or precedes the
    ///   model time.
    /// - [`Error::RemoteCallFailure`] if the backend fails.
    pub fn evolve_model(&mut self, tend: Time) -> Result<(), Error> {
        let Self {
            lifecycle,
            remote,
            grid,
            dirty,
            ..
        } = self;

        lifecycle.transition(Operation::Evolve, || {
            let current = remote.model_time()?;
            if !tend.value.is_finite() || tend < current {
                return Err(Error::InvalidTargetTime {
                    requested: tend.get::<second>(),
                    current: current.get::<second>(),
                });
            }

            let grid = grid.as_mut().ok_or(Error::UnknownField {
                field: FieldId::Temperature,
            })?;
            if *dirty {
                push(remote, grid)?;
                *dirty = false;
            }

            remote.evolve(tend)?;
            pull(remote, grid)
        })
    }

    /// Returns the time the solver has been advanced to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `INITIALIZED` or `RUN`.
    pub fn model_time(&self) -> Result<Time, Error> {
        self.lifecycle.guard(Operation::Query)?;
        self.remote.model_time()
    }

    // --- Parameters ---

    /// Reads a parameter.
    ///
    /// Before commit this is the staged value; after commit it is read from
    /// the backend.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `INITIALIZED` or `RUN`,
    /// or the backend's failure.
    pub fn parameter(&self, parameter: HeatParameter) -> Result<Value, Error> {
        self.registry.get(&self.lifecycle, &self.remote, parameter)
    }

    /// Writes a parameter.
    ///
    /// # Errors
    ///
    /// See [`Registry::set`].
    pub fn set_parameter(&mut self, parameter: HeatParameter, value: Value) -> Result<(), Error> {
        self.registry
            .set(&self.lifecycle, &mut self.remote, parameter, value)
    }

    /// Reads a parameter by its public name, such as `"Ngrid_x"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for an unregistered name, or any
    /// error from [`HeatSolver::parameter`].
    pub fn parameter_by_name(&self, name: &str) -> Result<Value, Error> {
        self.registry
            .get_by_name(&self.lifecycle, &self.remote, name)
    }

    /// Writes a parameter by its public name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for an unregistered name, or any
    /// error from [`Registry::set`].
    pub fn set_parameter_by_name(&mut self, name: &str, value: Value) -> Result<(), Error> {
        self.registry
            .set_by_name(&self.lifecycle, &mut self.remote, name, value)
    }

    /// Lists every parameter with its description and current value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `INITIALIZED` or `RUN`.
    pub fn parameters(&self) -> Result<Vec<Entry>, Error> {
        self.registry.list(&self.lifecycle, &self.remote)
    }

    /// # Errors
    ///
    /// See [`HeatSolver::parameter`].
    pub fn alpha(&self) -> Result<ThermalDiffusivity, Error> {
        self.typed(HeatParameter::Alpha)
    }

    /// # Errors
    ///
    /// See [`Registry::set`].
    pub fn set_alpha(&mut self, alpha: ThermalDiffusivity) -> Result<(), Error> {
        self.set_parameter(HeatParameter::Alpha, alpha.into())
    }

    /// # Errors
    ///
    /// See [`HeatSolver::parameter`].
    pub fn timestep(&self) -> Result<Time, Error> {
        self.typed(HeatParameter::Timestep)
    }

    /// # Errors
    ///
    /// See [`Registry::set`].
    pub fn set_timestep(&mut self, timestep: Time) -> Result<(), Error> {
        self.set_parameter(HeatParameter::Timestep, timestep.into())
    }

    /// Sets the uniform cell size. Locked after commit.
    ///
    /// # Errors
    ///
    /// See [`Registry::set`].
    pub fn set_cellsize(&mut self, cellsize: Length) -> Result<(), Error> {
        self.set_parameter(HeatParameter::Cellsize, cellsize.into())
    }

    /// Sets the number of cells in each direction. Locked after commit.
    ///
    /// # Errors
    ///
    /// See [`Registry::set`]. If `ny` is rejected, `nx` remains applied.
    pub fn set_grid_size(&mut self, nx: usize, ny: usize) -> Result<(), Error> {
        self.set_parameter(HeatParameter::NgridX, nx.into())?;
        self.set_parameter(HeatParameter::NgridY, ny.into())
    }

    fn typed<T: ParameterKind>(&self, parameter: HeatParameter) -> Result<T, Error> {
        self.registry
            .get_as(&self.lifecycle, &self.remote, parameter)
    }

    // --- Queries ---

    /// Returns the grid dimensions `(nx, ny)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `INITIALIZED` or `RUN`.
    pub fn dimensions(&self) -> Result<(usize, usize), Error> {
        self.lifecycle.guard(Operation::Query)?;
        Ok((
            self.typed(HeatParameter::NgridX)?,
            self.typed(HeatParameter::NgridY)?,
        ))
    }

    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `INITIALIZED` or `RUN`.
    pub fn grid_cellsize(&self) -> Result<Length, Error> {
        self.lifecycle.guard(Operation::Query)?;
        self.typed(HeatParameter::Cellsize)
    }

    /// Returns the inclusive index range `(1, nx, 1, ny)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `INITIALIZED` or `RUN`.
    pub fn grid_range(&self) -> Result<(usize, usize, usize, usize), Error> {
        let (nx, ny) = self.dimensions()?;
        Ok((1, nx, 1, ny))
    }

    /// Returns the position `(i·cellsize, j·cellsize)` of cell `(i, j)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `INITIALIZED` or `RUN`,
    /// or [`Error::IndexOutOfBounds`] for a cell outside the grid.
    pub fn grid_position(&self, i: usize, j: usize) -> Result<(Length, Length), Error> {
        let (nx, ny) = self.dimensions()?;
        if !(1..=nx).contains(&i) || !(1..=ny).contains(&j) {
            return Err(Error::IndexOutOfBounds { i, j, nx, ny });
        }
        let cellsize = self.grid_cellsize()?;
        #[allow(clippy::cast_precision_loss)]
        Ok((cellsize * i as f64, cellsize * j as f64))
    }

    // --- Fields ---

    /// Returns the mirror grid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `RUN`.
    pub fn grid(&self) -> Result<&Grid, Error> {
        self.lifecycle.guard(Operation::GetField)?;
        self.grid.as_ref().ok_or(Error::UnknownField {
            field: FieldId::Temperature,
        })
    }

    /// Returns the mirror grid for writing. Changes reach the backend before
    /// the next evolve.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `RUN`.
    pub fn grid_mut(&mut self) -> Result<&mut Grid, Error> {
        self.lifecycle.guard(Operation::SetField)?;
        let grid = self.grid.as_mut().ok_or(Error::UnknownField {
            field: FieldId::Temperature,
        })?;
        self.dirty = true;
        Ok(grid)
    }

    /// Reads the temperature of cell `(i, j)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `RUN`, or
    /// [`Error::IndexOutOfBounds`].
    pub fn temperature(&self, i: usize, j: usize) -> Result<ThermodynamicTemperature, Error> {
        self.grid()?.temperature(i, j)
    }

    /// Writes the temperature of cell `(i, j)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `RUN`, or
    /// [`Error::IndexOutOfBounds`].
    pub fn set_temperature(
        &mut self,
        i: usize,
        j: usize,
        temperature: ThermodynamicTemperature,
    ) -> Result<(), Error> {
        self.grid_mut()?.set_temperature(i, j, temperature)
    }

    /// Reads the temperature of each indexed cell, in order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `RUN`, or
    /// [`Error::IndexOutOfBounds`] for the first bad index.
    pub fn temperatures(
        &self,
        indices: &[(usize, usize)],
    ) -> Result<Vec<ThermodynamicTemperature>, Error> {
        let grid = self.grid()?;
        indices
            .iter()
            .map(|&(i, j)| grid.temperature(i, j))
            .collect()
    }

    /// Writes `temperatures[k]` to the cell at `indices[k]`.
    ///
    /// Every index is checked before any cell is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `RUN`,
    /// [`Error::ShapeMismatch`] if the slices differ in length, or
    /// [`Error::IndexOutOfBounds`].
    pub fn set_temperatures(
        &mut self,
        indices: &[(usize, usize)],
        temperatures: &[ThermodynamicTemperature],
    ) -> Result<(), Error> {
        self.lifecycle.guard(Operation::SetField)?;
        if indices.len() != temperatures.len() {
            return Err(Error::ShapeMismatch {
                from: (temperatures.len(), 1),
                to: (indices.len(), 1),
            });
        }
        let grid = self.grid()?;
        for &(i, j) in indices {
            grid.position(i, j)?;
        }

        let grid = self.grid_mut()?;
        for (&(i, j), &temperature) in indices.iter().zip(temperatures) {
            grid.set_temperature(i, j, temperature)?;
        }
        Ok(())
    }

    /// Sets every cell to `temperature`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] unless `RUN`.
    pub fn fill_temperature(&mut self, temperature: ThermodynamicTemperature) -> Result<(), Error> {
        let grid = self.grid_mut()?;
        let unit = grid.temperature_unit()?;
        grid.fill(FieldId::Temperature, unit.from_base(temperature.get::<kelvin>()))
    }
}

impl<B: Heat2dBackend> SubModel for HeatSolver<B> {
    fn name(&self) -> &'static str {
        "heat2d"
    }

    fn model_time(&self) -> Result<Time, Error> {
        HeatSolver::model_time(self)
    }

    fn internal_step(&self) -> Result<Time, Error> {
        self.timestep()
    }

    fn evolve_model(&mut self, tend: Time) -> Result<(), Error> {
        HeatSolver::evolve_model(self, tend)
    }

    fn grid(&self) -> Result<&Grid, Error> {
        HeatSolver::grid(self)
    }

    fn grid_mut(&mut self) -> Result<&mut Grid, Error> {
        HeatSolver::grid_mut(self)
    }
}

/// Reads a committed parameter from the backend as a concrete type.
fn fetch<T, B>(remote: &Remote<B>, parameter: HeatParameter) -> Result<T, Error>
where
    T: ParameterKind,
    B: Heat2dBackend,
{
    let value = remote.get_parameter(parameter)?;
    T::from_value(value).ok_or(Error::UnitMismatch {
        subject: parameter.descriptor().name,
        expected: T::DIMENSION,
        found: value.dimension(),
    })
}

/// Refreshes the mirror's temperature field from the backend, converting
/// kelvin to the field's unit.
fn pull<B: Heat2dBackend>(remote: &Remote<B>, grid: &mut Grid) -> Result<(), Error> {
    let unit = grid.temperature_unit()?;
    let indices: Vec<_> = grid.cells().collect();
    let values = remote.temperatures(&indices)?;
    let field = grid.field_mut(FieldId::Temperature)?;
    for (slot, value) in field.values_mut().iter_mut().zip(values) {
        *slot = unit.from_base(value);
    }
    Ok(())
}

/// Sends the mirror's temperature field to the backend in kelvin.
fn push<B: Heat2dBackend>(remote: &mut Remote<B>, grid: &Grid) -> Result<(), Error> {
    let unit = grid.temperature_unit()?;
    let indices: Vec<_> = grid.cells().collect();
    let values: Vec<f64> = grid
        .field(FieldId::Temperature)?
        .values()
        .iter()
        .map(|&t| unit.to_base(t))
        .collect();
    remote.set_temperatures(&indices, &values)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::{cell::RefCell, rc::Rc};

    use approx::assert_relative_eq;
    use braid_core::units::{Dimension, thermal_diffusivity};
    use uom::si::length::meter;

    use crate::{Heat2dKernel, backend::CodeResult};

    type Log = Rc<RefCell<Vec<&'static str>>>;

    /// Wraps a kernel, logging backend calls and optionally failing one.
    struct Recording {
        kernel: Heat2dKernel,
        log: Log,
        fail: Option<(&'static str, i32)>,
    }

    impl Recording {
        fn record(&self, call: &'static str) -> CodeResult<()> {
            self.log.borrow_mut().push(call);
            match self.fail {
                Some((name, code)) if name == call => Err(code),
                _ => Ok(()),
            }
        }
    }

    impl Heat2dBackend for Recording {
        fn initialize_code(&mut self) -> CodeResult<()> {
            self.record("initialize_code")?;
            self.kernel.initialize_code()
        }
        fn commit_parameters(&mut self) -> CodeResult<()> {
            self.record("commit_parameters")?;
            self.kernel.commit_parameters()
        }
        fn cleanup_code(&mut self) -> CodeResult<()> {
            self.record("cleanup_code")?;
            self.kernel.cleanup_code()
        }
        fn evolve_model(&mut self, tend: f64) -> CodeResult<()> {
            self.record("evolve_model")?;
            self.kernel.evolve_model(tend)
        }
        fn get_model_time(&self) -> CodeResult<f64> {
            self.kernel.get_model_time()
        }
        fn get_alpha(&self) -> CodeResult<f64> {
            self.record("get_alpha")?;
            self.kernel.get_alpha()
        }
        fn set_alpha(&mut self, alpha: f64) -> CodeResult<()> {
            self.record("set_alpha")?;
            self.kernel.set_alpha(alpha)
        }
        fn get_time_step(&self) -> CodeResult<f64> {
            self.kernel.get_time_step()
        }
        fn set_time_step(&mut self, timestep: f64) -> CodeResult<()> {
            self.record("set_time_step")?;
            self.kernel.set_time_step(timestep)
        }
        fn get_grid_cellsize(&self) -> CodeResult<f64> {
            self.kernel.get_grid_cellsize()
        }
        fn set_grid_cellsize(&mut self, cellsize: f64) -> CodeResult<()> {
            self.record("set_grid_cellsize")?;
            self.kernel.set_grid_cellsize(cellsize)
        }
        fn get_nx(&self) -> CodeResult<usize> {
            self.kernel.get_nx()
        }
        fn set_nx(&mut self, nx: usize) -> CodeResult<()> {
            self.record("set_nx")?;
            self.kernel.set_nx(nx)
        }
        fn get_ny(&self) -> CodeResult<usize> {
            self.kernel.get_ny()
        }
        fn set_ny(&mut self, ny: usize) -> CodeResult<()> {
            self.record("set_ny")?;
            self.kernel.set_ny(ny)
        }
        fn get_temperature(&self, indices: &[(usize, usize)]) -> CodeResult<Vec<f64>> {
            self.kernel.get_temperature(indices)
        }
        fn set_temperature(
            &mut self,
            indices: &[(usize, usize)],
            values: &[f64],
        ) -> CodeResult<()> {
            self.record("set_temperature")?;
            self.kernel.set_temperature(indices, values)
        }
    }

    fn solver(fail: Option<(&'static str, i32)>) -> (HeatSolver<Recording>, Log) {
        let log = Log::default();
        let backend = Recording {
            kernel: Heat2dKernel::new(),
            log: Rc::clone(&log),
            fail,
        };
        (HeatSolver::new(backend), log)
    }

    fn running(nx: usize, ny: usize) -> HeatSolver<Recording> {
        let (mut solver, _) = solver(None);
        solver.initialize().unwrap();
        solver.set_grid_size(nx, ny).unwrap();
        solver.set_cellsize(Length::new::<meter>(0.1)).unwrap();
        solver.set_timestep(Time::new::<second>(0.1)).unwrap();
        solver.commit().unwrap();
        solver
    }

    fn kelvin_of(value: f64) -> ThermodynamicTemperature {
        ThermodynamicTemperature::new::<kelvin>(value)
    }

    #[test]
    fn full_lifecycle() {
        let mut solver = running(4, 3);
        assert_eq!(solver.state(), State::Run);

        solver.fill_temperature(kelvin_of(293.0)).unwrap();
        solver.evolve_model(Time::new::<second>(1.0)).unwrap();
        assert_relative_eq!(
            solver.model_time().unwrap().get::<second>(),
            1.0,
            epsilon = 1e-12
        );

        solver.cleanup().unwrap();
        assert_eq!(solver.state(), State::End);
        solver.stop().unwrap();
        solver.stop().unwrap();
        assert_eq!(solver.state(), State::Stopped);
    }

    #[test]
    fn illegal_calls_never_reach_the_backend() {
        let (mut solver, log) = solver(None);

        assert!(matches!(
            solver.set_alpha(thermal_diffusivity(1.0)),
            Err(Error::IllegalStateTransition {
                operation: Operation::SetParameter,
                state: State::Uninitialized,
            })
        ));
        assert!(solver.evolve_model(Time::new::<second>(1.0)).is_err());
        assert!(solver.commit().is_err());
        assert!(solver.stop().is_err());

        assert!(log.borrow().is_empty());
        assert_eq!(solver.state(), State::Uninitialized);
    }

    #[test]
    fn defaults_are_pushed_at_initialize() {
        let (mut solver, log) = solver(None);
        solver.initialize().unwrap();

        assert_eq!(
            *log.borrow(),
            [
                "initialize_code",
                "set_alpha",
                "set_nx",
                "set_ny",
                "set_grid_cellsize",
                "set_time_step"
            ]
        );
        assert_eq!(solver.dimensions(), Ok((100, 100)));
        assert_relative_eq!(solver.alpha().unwrap().value, 0.01);
    }

    #[test]
    fn staged_values_reach_the_backend_at_commit() {
        let (mut solver, log) = solver(None);
        solver.initialize().unwrap();
        log.borrow_mut().clear();

        solver.set_grid_size(6, 5).unwrap();
        assert!(log.borrow().is_empty());

        solver.commit().unwrap();
        assert_eq!(log.borrow().last(), Some(&"commit_parameters"));
        assert_eq!(solver.grid().unwrap().shape(), (6, 5));
        assert_eq!(solver.grid_range(), Ok((1, 6, 1, 5)));
    }

    #[test]
    fn parameter_round_trips() {
        let mut solver = running(3, 3);

        solver.set_alpha(thermal_diffusivity(0.02)).unwrap();
        assert_relative_eq!(solver.alpha().unwrap().value, 0.02);

        solver
            .set_parameter_by_name("timestep", Value::Time(Time::new::<second>(0.05)))
            .unwrap();
        assert_eq!(
            solver.parameter_by_name("timestep"),
            Ok(Value::Time(Time::new::<second>(0.05)))
        );
    }

    #[test]
    fn geometry_is_locked_in_run() {
        let mut solver = running(3, 3);

        assert_eq!(
            solver.set_cellsize(Length::new::<meter>(0.2)),
            Err(Error::ParameterLocked {
                parameter: "cellsize"
            })
        );
        assert_eq!(
            solver.set_parameter_by_name("Ngrid_x", Value::Count(4)),
            Err(Error::ParameterLocked {
                parameter: "Ngrid_x"
            })
        );
    }

    #[test]
    fn unit_mismatch_and_unknown_names() {
        let (mut solver, _) = solver(None);
        solver.initialize().unwrap();

        assert_eq!(
            solver.set_parameter(HeatParameter::Cellsize, Value::Time(Time::new::<second>(1.0))),
            Err(Error::UnitMismatch {
                subject: "cellsize",
                expected: Dimension::Length,
                found: Dimension::Time,
            })
        );
        assert_eq!(
            solver.parameter_by_name("conductivity"),
            Err(Error::UnknownParameter {
                name: "conductivity".to_owned()
            })
        );
    }

    #[test]
    fn list_describes_all_parameters() {
        let (mut solver, _) = solver(None);
        solver.initialize().unwrap();

        let entries = solver.parameters().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name).collect();

        assert_eq!(names, ["alpha", "Ngrid_x", "Ngrid_y", "cellsize", "timestep"]);
        assert_eq!(entries[3].description, "grid cell size (uniform)");
        assert_eq!(entries[1].value, Value::Count(100));
    }

    #[test]
    fn writes_are_pushed_before_evolve() {
        let mut solver = running(3, 3);
        solver.set_temperature(2, 2, kelvin_of(90.0)).unwrap();

        solver.evolve_model(Time::new::<second>(0.1)).unwrap();

        // r = 0.01 · 0.1 / 0.01 = 0.1
        assert_relative_eq!(
            solver.temperature(2, 2).unwrap().get::<kelvin>(),
            90.0 * 0.6,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            solver.temperature(1, 2).unwrap().get::<kelvin>(),
            9.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn evolve_to_current_time_takes_no_steps() {
        let mut solver = running(3, 3);
        solver.set_temperature(1, 1, kelvin_of(50.0)).unwrap();

        solver.evolve_model(Time::new::<second>(0.0)).unwrap();

        assert_relative_eq!(solver.temperature(1, 1).unwrap().get::<kelvin>(), 50.0);
        assert_relative_eq!(solver.model_time().unwrap().get::<second>(), 0.0);
    }

    #[test]
    fn evolving_backwards_is_rejected() {
        let mut solver = running(2, 2);
        solver.evolve_model(Time::new::<second>(0.5)).unwrap();

        assert!(matches!(
            solver.evolve_model(Time::new::<second>(0.2)),
            Err(Error::InvalidTargetTime { .. })
        ));
    }

    #[test]
    fn non_finite_targets_are_rejected() {
        let mut solver = running(2, 2);

        for tend in [f64::NAN, f64::INFINITY] {
            assert!(matches!(
                solver.evolve_model(Time::new::<second>(tend)),
                Err(Error::InvalidTargetTime { .. })
            ));
        }
        assert_eq!(solver.state(), State::Run);
        assert_relative_eq!(solver.model_time().unwrap().get::<second>(), 0.0);
    }

    #[test]
    fn mirror_in_celsius_reaches_backend_in_kelvin() {
        let mut solver = running(2, 2);
        solver
            .grid_mut()
            .unwrap()
            .add_field(FieldId::Temperature, FieldUnit::DegreeCelsius, 20.0);

        solver.evolve_model(Time::new::<second>(0.0)).unwrap();

        let backend = solver.remote.temperatures(&[(1, 1), (2, 2)]).unwrap();
        assert_relative_eq!(backend[0], 293.15, max_relative = 1e-12);
        assert_relative_eq!(backend[1], 293.15, max_relative = 1e-12);
        assert_relative_eq!(
            solver.grid().unwrap().get(FieldId::Temperature, 1, 1).unwrap(),
            20.0,
            epsilon = 1e-9
        );

        solver.fill_temperature(kelvin_of(373.15)).unwrap();
        assert_relative_eq!(
            solver.grid().unwrap().get(FieldId::Temperature, 2, 1).unwrap(),
            100.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn vector_access_checks_every_index_first() {
        let mut solver = running(3, 3);

        let err = solver
            .set_temperatures(&[(1, 1), (4, 1)], &[kelvin_of(10.0), kelvin_of(20.0)])
            .unwrap_err();
        assert!(matches!(err, Error::IndexOutOfBounds { i: 4, .. }));
        assert_relative_eq!(solver.temperature(1, 1).unwrap().get::<kelvin>(), 0.0);

        solver
            .set_temperatures(&[(1, 1), (3, 3)], &[kelvin_of(10.0), kelvin_of(20.0)])
            .unwrap();
        let values = solver.temperatures(&[(3, 3), (1, 1)]).unwrap();
        assert_relative_eq!(values[0].get::<kelvin>(), 20.0);
        assert_relative_eq!(values[1].get::<kelvin>(), 10.0);
    }

    #[test]
    fn positions_scale_with_cellsize() {
        let (mut solver, _) = solver(None);
        solver.initialize().unwrap();
        solver.set_cellsize(Length::new::<meter>(0.5)).unwrap();

        let (x, y) = solver.grid_position(2, 3).unwrap();
        assert_relative_eq!(x.get::<meter>(), 1.0);
        assert_relative_eq!(y.get::<meter>(), 1.5);
        assert!(matches!(
            solver.grid_position(101, 1),
            Err(Error::IndexOutOfBounds { .. })
        ));
    }

    #[test]
    fn fields_require_run() {
        let (mut solver, _) = solver(None);
        solver.initialize().unwrap();

        assert!(matches!(
            solver.temperature(1, 1),
            Err(Error::IllegalStateTransition {
                operation: Operation::GetField,
                ..
            })
        ));
    }

    #[test]
    fn remote_failures_keep_the_state() {
        let (mut solver, _) = solver(Some(("commit_parameters", -42)));
        solver.initialize().unwrap();

        assert_eq!(
            solver.commit(),
            Err(Error::RemoteCallFailure {
                operation: "commit_parameters",
                code: -42,
            })
        );
        assert_eq!(solver.state(), State::Initialized);
    }

    #[test]
    fn unstable_configuration_fails_commit() {
        let (mut solver, _) = solver(None);
        solver.initialize().unwrap();
        solver.set_timestep(Time::new::<second>(10.0)).unwrap();

        assert_eq!(
            solver.commit(),
            Err(Error::RemoteCallFailure {
                operation: "commit_parameters",
                code: crate::code::UNSTABLE,
            })
        );
    }

    #[test]
    fn shutdown_from_run() {
        let mut solver = running(2, 2);
        solver.shutdown().unwrap();

        assert_eq!(solver.state(), State::Stopped);
        solver.shutdown().unwrap();
    }
}
