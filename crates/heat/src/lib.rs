//! A lifecycle-managed 2D heat-diffusion solver.
//!
//! [`HeatSolver`] wraps any [`Heat2dBackend`] behind the Braid lifecycle and
//! parameter registry. Two backends ship with the crate:
//!
//! - [`Heat2dKernel`]: an in-process explicit diffusion kernel
//! - [`WorkerBackend`]: runs another backend on a dedicated thread
//!
//! # Example
//!
//! ```
//! use braid_heat::{Heat2dKernel, HeatSolver};
//! use uom::si::{f64::Time, time::second};
//!
//! let mut solver = HeatSolver::new(Heat2dKernel::new());
//! solver.initialize()?;
//! solver.set_grid_size(10, 10)?;
//! solver.commit()?;
//! solver.evolve_model(Time::new::<second>(1.0))?;
//! solver.shutdown()?;
//! # Ok::<(), braid_core::Error>(())
//! ```

mod backend;
mod kernel;
mod parameters;
mod remote;
mod solver;
mod worker;

pub use backend::{CodeResult, Heat2dBackend, code};
pub use kernel::{Heat2dKernel, KernelLimits};
pub use parameters::HeatParameter;
pub use solver::HeatSolver;
pub use worker::WorkerBackend;
