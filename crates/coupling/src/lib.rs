//! Operator-split coupling of Braid sub-models.
//!
//! - [`CouplingDriver`] advances a primary and a secondary [`SubModel`] on a
//!   half/full/half Strang schedule, exchanging grid fields between steps.
//! - [`BlackBodyEmitter`] is a locally computed secondary: a radiating plate
//!   heated at its centre.
//!
//! [`SubModel`]: braid_core::SubModel

pub mod driver;
pub mod emitter;

pub use driver::{Config as CouplingConfig, CouplingDriver};
pub use emitter::{BlackBodyEmitter, EmitterConfig};
