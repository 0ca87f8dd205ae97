//! Core traits and types for the Braid coupling framework.
//!
//! This crate defines the shared abstractions that solver handles, local
//! models, and the coupling driver build on:
//!
//! - [`Lifecycle`]: the state machine that decides which operations are legal
//! - [`Registry`]: unit-typed parameters staged before commit
//! - [`Grid`] and [`ExchangeChannel`]: named fields and the copies between them
//! - [`SubModel`]: the contract a coupled model exposes to the driver
//! - [`Observer`]: receives driver events and optionally returns control actions
//! - [`Error`]: the classified failures every operation reports

mod channel;
mod error;
mod grid;
mod lifecycle;
mod model;
mod observer;
mod parameter;

pub mod units;

pub use channel::ExchangeChannel;
pub use error::Error;
pub use grid::{Field, FieldId, Grid};
pub use lifecycle::{Lifecycle, Operation, State};
pub use model::SubModel;
pub use observer::Observer;
pub use parameter::{Descriptor, Entry, ParameterAccess, ParameterKind, ParameterSet, Registry, Value};
