use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::units::FieldUnit;

/// Identifies a field carried by a [`Grid`](crate::Grid).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    /// Cell temperature.
    Temperature,
    /// Power radiated by each cell.
    Emission,
}

impl FieldId {
    /// Returns the field's public name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            FieldId::Temperature => "temperature",
            FieldId::Emission => "emission",
        }
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A dense array of values stored in a declared unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    unit: FieldUnit,
    values: Array2<f64>,
}

impl Field {
    pub(crate) fn from_values(unit: FieldUnit, values: Array2<f64>) -> Self {
        Self { unit, values }
    }

    #[must_use]
    pub fn unit(&self) -> FieldUnit {
        self.unit
    }

    /// Returns the values, indexed `[i - 1, j - 1]`.
    #[must_use]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Returns the values for modification.
    ///
    /// The shape is fixed; only the contents may change.
    pub fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.values
    }

    #[must_use]
    pub fn sum(&self) -> f64 {
        self.values.sum()
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let count = self.values.len() as f64;
        self.sum() / count
    }
}
