use braid_core::FieldId;
use serde::{Deserialize, Serialize};
use uom::si::{f64::Time, time::second};

/// Configuration for the coupling driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// The full coupling step; each sub-step of the secondary is half of it.
    pub coupling_step: Time,

    /// Fields copied at every exchange.
    pub fields: Vec<FieldId>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coupling_step: Time::new::<second>(1.0),
            fields: vec![FieldId::Temperature],
        }
    }
}

impl Config {
    /// Validates the coupling step and field list.
    ///
    /// # Errors
    ///
    /// Returns an error if the step is non-finite or non-positive, or if no
    /// fields are exchanged.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.coupling_step.value.is_finite() || self.coupling_step.value <= 0.0 {
            return Err("coupling_step must be finite and positive");
        }
        if self.fields.is_empty() {
            return Err("fields must name at least one field");
        }
        Ok(())
    }
}
