use uom::si::f64::Time;

use crate::{Error, Grid};

/// A time-stepping model that a coupling driver can advance and exchange
/// grid fields with.
///
/// Both remote solver handles and purely local models implement this trait,
/// so the driver never needs to know which kind it is stepping.
pub trait SubModel {
    /// A short name used in logs and error messages.
    fn name(&self) -> &'static str;

    /// The time the model has been advanced to.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot report its time in its current state.
    fn model_time(&self) -> Result<Time, Error>;

    /// The step the model takes internally when evolving.
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot report its step in its current state.
    fn internal_step(&self) -> Result<Time, Error>;

    /// Advances the model to `tend`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTargetTime`] if `tend` precedes the model time,
    /// or any error the model encounters while stepping.
    fn evolve_model(&mut self, tend: Time) -> Result<(), Error>;

    /// The grid holding the model's exchangeable fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is not available in the current state.
    fn grid(&self) -> Result<&Grid, Error>;

    /// The grid, for writing fields the model reads on its next evolve.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is not writable in the current state.
    fn grid_mut(&mut self) -> Result<&mut Grid, Error>;
}
