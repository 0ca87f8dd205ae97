use braid_core::{FieldId, Grid, units::Dimension};
use uom::si::{
    f64::{Power, ThermodynamicTemperature},
    power::watt,
    thermodynamic_temperature::kelvin,
};

/// Aggregate statistics of a grid's fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub max_temperature: ThermodynamicTemperature,
    pub mean_temperature: ThermodynamicTemperature,
    /// Sum of the `emission` field, if the grid has one in a power unit.
    pub total_emission: Option<Power>,
}

impl Summary {
    /// Summarizes a grid, or returns `None` if it has no temperature field in
    /// a temperature unit.
    #[must_use]
    pub fn of(grid: &Grid) -> Option<Self> {
        let temperature = grid.field(FieldId::Temperature).ok()?;
        let unit = temperature.unit();
        if unit.dimension() != Dimension::Temperature {
            return None;
        }

        let total_emission = grid
            .field(FieldId::Emission)
            .ok()
            .filter(|field| field.unit().dimension() == Dimension::Power)
            .map(|field| Power::new::<watt>(field.unit().to_base(field.sum())));

        Some(Self {
            max_temperature: ThermodynamicTemperature::new::<kelvin>(
                unit.to_base(temperature.max()),
            ),
            mean_temperature: ThermodynamicTemperature::new::<kelvin>(
                unit.to_base(temperature.mean()),
            ),
            total_emission,
        })
    }
}
