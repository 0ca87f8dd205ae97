//! Physical dimensions, unit tags, and quantity helpers.

use std::fmt;

use serde::{Deserialize, Serialize};
use uom::{
    si::{
        ISQ, Quantity, SI,
        area::square_meter,
        f64::{Area, ThermodynamicTemperature, Time},
        thermodynamic_temperature::{degree_celsius, degree_fahrenheit, kelvin},
        time::second,
    },
    typenum::{N1, P2, Z0},
};

/// Thermal diffusivity, m²/s in SI.
pub type ThermalDiffusivity = Quantity<ISQ<P2, Z0, N1, Z0, Z0, Z0, Z0>, SI<f64>, f64>;

/// Creates a [`ThermalDiffusivity`] from a value in m²/s.
#[must_use]
pub fn thermal_diffusivity(square_meters_per_second: f64) -> ThermalDiffusivity {
    Area::new::<square_meter>(square_meters_per_second) / Time::new::<second>(1.0)
}

/// The physical dimension of a parameter value or field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// A dimensionless count, such as a number of grid cells.
    Count,
    Length,
    Time,
    ThermalDiffusivity,
    Temperature,
    Power,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Count => "count",
            Dimension::Length => "length",
            Dimension::Time => "time",
            Dimension::ThermalDiffusivity => "length²/time",
            Dimension::Temperature => "temperature",
            Dimension::Power => "power",
        };
        f.write_str(name)
    }
}

/// The unit a grid field's values are stored in.
///
/// Values convert between units of the same [`Dimension`] through their SI
/// base unit (kelvin for temperatures, watt for powers).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldUnit {
    Kelvin,
    DegreeCelsius,
    DegreeFahrenheit,
    Watt,
}

impl FieldUnit {
    /// Returns the dimension this unit measures.
    #[must_use]
    pub fn dimension(self) -> Dimension {
        match self {
            FieldUnit::Kelvin | FieldUnit::DegreeCelsius | FieldUnit::DegreeFahrenheit => {
                Dimension::Temperature
            }
            FieldUnit::Watt => Dimension::Power,
        }
    }

    /// Converts a value in this unit to the SI base unit.
    #[must_use]
    pub fn to_base(self, value: f64) -> f64 {
        match self {
            FieldUnit::Kelvin | FieldUnit::Watt => value,
            FieldUnit::DegreeCelsius => {
                ThermodynamicTemperature::new::<degree_celsius>(value).get::<kelvin>()
            }
            FieldUnit::DegreeFahrenheit => {
                ThermodynamicTemperature::new::<degree_fahrenheit>(value).get::<kelvin>()
            }
        }
    }

    /// Converts a value in the SI base unit to this unit.
    #[must_use]
    pub fn from_base(self, value: f64) -> f64 {
        match self {
            FieldUnit::Kelvin | FieldUnit::Watt => value,
            FieldUnit::DegreeCelsius => {
                ThermodynamicTemperature::new::<kelvin>(value).get::<degree_celsius>()
            }
            FieldUnit::DegreeFahrenheit => {
                ThermodynamicTemperature::new::<kelvin>(value).get::<degree_fahrenheit>()
            }
        }
    }

    /// Returns `true` if both units measure the same dimension.
    #[must_use]
    pub fn is_compatible(self, other: FieldUnit) -> bool {
        self.dimension() == other.dimension()
    }

    /// Converts `value` from this unit into `target`.
    ///
    /// The result is only meaningful when the units are compatible.
    #[must_use]
    pub fn convert(self, value: f64, target: FieldUnit) -> f64 {
        if self == target {
            value
        } else {
            target.from_base(self.to_base(value))
        }
    }
}
