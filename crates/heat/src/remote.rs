use braid_core::{Error, ParameterAccess, ParameterSet, Value, units::thermal_diffusivity};
use uom::si::{
    f64::{Length, Time},
    length::meter,
    time::second,
};

use crate::{
    HeatParameter,
    backend::{CodeResult, Heat2dBackend, code},
};

/// Converts a backend result, classifying failures as remote call failures.
fn remote<T>(operation: &'static str, result: CodeResult<T>) -> Result<T, Error> {
    result.map_err(|code| {
        tracing::warn!(operation, code, "remote call failed");
        Error::RemoteCallFailure { operation, code }
    })
}

/// A backend seen through typed, unit-carrying calls.
#[derive(Debug)]
pub(crate) struct Remote<B> {
    backend: B,
}

impl<B: Heat2dBackend> Remote<B> {
    pub(crate) fn new(backend: B) -> Self {
        Self { backend }
    }

    pub(crate) fn initialize(&mut self) -> Result<(), Error> {
        remote("initialize_code", self.backend.initialize_code())
    }

    pub(crate) fn commit(&mut self) -> Result<(), Error> {
        remote("commit_parameters", self.backend.commit_parameters())
    }

    pub(crate) fn cleanup(&mut self) -> Result<(), Error> {
        remote("cleanup_code", self.backend.cleanup_code())
    }

    pub(crate) fn evolve(&mut self, tend: Time) -> Result<(), Error> {
        remote("evolve_model", self.backend.evolve_model(tend.get::<second>()))
    }

    pub(crate) fn model_time(&self) -> Result<Time, Error> {
        remote("get_model_time", self.backend.get_model_time()).map(Time::new::<second>)
    }

    /// Reads temperatures in kelvin.
    pub(crate) fn temperatures(&self, indices: &[(usize, usize)]) -> Result<Vec<f64>, Error> {
        let values = remote("get_temperature", self.backend.get_temperature(indices))?;
        if values.len() == indices.len() {
            Ok(values)
        } else {
            remote("get_temperature", Err(code::MALFORMED_REPLY))
        }
    }

    /// Writes temperatures in kelvin.
    pub(crate) fn set_temperatures(
        &mut self,
        indices: &[(usize, usize)],
        values: &[f64],
    ) -> Result<(), Error> {
        remote(
            "set_temperature",
            self.backend.set_temperature(indices, values),
        )
    }
}

impl<B: Heat2dBackend> ParameterAccess<HeatParameter> for Remote<B> {
    fn get_parameter(&self, parameter: HeatParameter) -> Result<Value, Error> {
        let backend = &self.backend;
        Ok(match parameter {
            HeatParameter::Alpha => {
                Value::Diffusivity(thermal_diffusivity(remote("get_alpha", backend.get_alpha())?))
            }
            HeatParameter::NgridX => Value::Count(remote("get_nx", backend.get_nx())?),
            HeatParameter::NgridY => Value::Count(remote("get_ny", backend.get_ny())?),
            HeatParameter::Cellsize => Value::Length(Length::new::<meter>(remote(
                "get_grid_cellsize",
                backend.get_grid_cellsize(),
            )?)),
            HeatParameter::Timestep => Value::Time(Time::new::<second>(remote(
                "get_time_step",
                backend.get_time_step(),
            )?)),
        })
    }

    fn set_parameter(&mut self, parameter: HeatParameter, value: Value) -> Result<(), Error> {
        let backend = &mut self.backend;
        match (parameter, value) {
            (HeatParameter::Alpha, Value::Diffusivity(alpha)) => {
                remote("set_alpha", backend.set_alpha(alpha.value))
            }
            (HeatParameter::NgridX, Value::Count(nx)) => remote("set_nx", backend.set_nx(nx)),
            (HeatParameter::NgridY, Value::Count(ny)) => remote("set_ny", backend.set_ny(ny)),
            (HeatParameter::Cellsize, Value::Length(cellsize)) => remote(
                "set_grid_cellsize",
                backend.set_grid_cellsize(cellsize.get::<meter>()),
            ),
            (HeatParameter::Timestep, Value::Time(timestep)) => remote(
                "set_time_step",
                backend.set_time_step(timestep.get::<second>()),
            ),
            (parameter, value) => {
                let descriptor = parameter.descriptor();
                Err(Error::UnitMismatch {
                    subject: descriptor.name,
                    expected: descriptor.dimension(),
                    found: value.dimension(),
                })
            }
        }
    }
}
