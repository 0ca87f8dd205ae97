//! Reusable observers for Braid coupled runs.
//!
//! This crate provides [`Observer`] implementations and capability traits that
//! work with any event carrying a cycle count, a model time, and the two
//! coupled grids.
//!
//! # Modules
//!
//! - [`traits`]: capability traits for events and actions
//!   ([`HasCycle`], [`HasModelTime`], [`HasGrids`], [`CanStopEarly`])
//!
//! # Observers
//!
//! - [`Recorder`]: collects a [`Sample`] per cycle
//! - [`TraceObserver`]: logs a line per cycle through `tracing`
//! - [`TemperatureCeiling`]: stops a run once the primary grid gets too hot
//!
//! [`Observer`]: braid_core::Observer
//! [`HasCycle`]: traits::HasCycle
//! [`HasModelTime`]: traits::HasModelTime
//! [`HasGrids`]: traits::HasGrids
//! [`CanStopEarly`]: traits::CanStopEarly

pub mod traits;

mod ceiling;
mod recorder;
mod summary;
mod trace;

pub use ceiling::TemperatureCeiling;
pub use recorder::{Recorder, Sample};
pub use summary::Summary;
pub use trace::TraceObserver;
