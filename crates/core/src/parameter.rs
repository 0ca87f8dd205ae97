use std::fmt;

use uom::si::{
    f64::{Length, Time},
    length::meter,
    time::second,
};

use crate::{
    Error, Lifecycle, Operation, State,
    units::{Dimension, ThermalDiffusivity},
};

/// A unit-typed parameter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Count(usize),
    Length(Length),
    Time(Time),
    Diffusivity(ThermalDiffusivity),
}

impl Value {
    #[must_use]
    pub fn dimension(&self) -> Dimension {
        match self {
            Value::Count(_) => Dimension::Count,
            Value::Length(_) => Dimension::Length,
            Value::Time(_) => Dimension::Time,
            Value::Diffusivity(_) => Dimension::ThermalDiffusivity,
        }
    }

    /// Returns `true` if the value is a positive count or a positive, finite quantity.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        let si = match self {
            Value::Count(n) => return *n > 0,
            Value::Length(v) => v.value,
            Value::Time(v) => v.value,
            Value::Diffusivity(v) => v.value,
        };
        si.is_finite() && si > 0.0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Count(n) => write!(f, "{n}"),
            Value::Length(v) => write!(f, "{} m", v.get::<meter>()),
            Value::Time(v) => write!(f, "{} s", v.get::<second>()),
            Value::Diffusivity(v) => write!(f, "{} m²/s", v.value),
        }
    }
}

/// A Rust type that a parameter [`Value`] can be read back as.
pub trait ParameterKind: Sized {
    const DIMENSION: Dimension;

    fn from_value(value: Value) -> Option<Self>;

    fn into_value(self) -> Value;
}

macro_rules! parameter_kind {
    ($ty:ty, $variant:ident, $dimension:ident) => {
        impl ParameterKind for $ty {
            const DIMENSION: Dimension = Dimension::$dimension;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn into_value(self) -> Value {
                Value::$variant(self)
            }
        }

        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Value::$variant(value)
            }
        }
    };
}

parameter_kind!(usize, Count, Count);
parameter_kind!(Length, Length, Length);
parameter_kind!(Time, Time, Time);
parameter_kind!(ThermalDiffusivity, Diffusivity, ThermalDiffusivity);

/// Static metadata registered for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Descriptor {
    /// The public name used for name-keyed access.
    pub name: &'static str,
    pub description: &'static str,
    /// The value reported until the parameter is explicitly set.
    pub default: Value,
    /// Whether the parameter becomes read-only once parameters are committed.
    pub locked_after_commit: bool,
}

impl Descriptor {
    /// The declared dimension, which is the dimension of the default value.
    #[must_use]
    pub fn dimension(&self) -> Dimension {
        self.default.dimension()
    }
}

/// A closed set of parameters a solver exposes.
///
/// Implemented by an enum with one variant per parameter, so every lookup is
/// resolved against a fixed table rather than arbitrary attribute names.
pub trait ParameterSet: Copy + Eq + fmt::Debug + 'static {
    /// Every parameter in the set, in listing order.
    const ALL: &'static [Self];

    fn descriptor(self) -> Descriptor;

    /// Resolves a parameter from its public name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] if no parameter has this name.
    fn from_name(name: &str) -> Result<Self, Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|parameter| parameter.descriptor().name == name)
            .ok_or_else(|| Error::UnknownParameter {
                name: name.to_owned(),
            })
    }
}

/// The getter/setter pair a solver provides for each parameter in `P`.
pub trait ParameterAccess<P: ParameterSet> {
    /// Reads the solver's current value.
    ///
    /// # Errors
    ///
    /// Returns an error if the solver call fails.
    fn get_parameter(&self, parameter: P) -> Result<Value, Error>;

    /// Writes a value the registry has already validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the solver call fails.
    fn set_parameter(&mut self, parameter: P, value: Value) -> Result<(), Error>;
}

/// One row of [`Registry::list`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub name: &'static str,
    pub description: &'static str,
    pub value: Value,
}

/// Unit-checked, lifecycle-gated access to a solver's parameters.
///
/// Before commit, values are staged locally and reads never reach the solver.
/// [`Registry::flush`] hands every staged value to the solver as part of the
/// commit. After commit, reads and writes go straight to the solver, and
/// parameters marked [`Descriptor::locked_after_commit`] reject writes.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry<P: ParameterSet> {
    staged: Vec<(P, Value)>,
}

impl<P: ParameterSet> Default for Registry<P> {
    fn default() -> Self {
        Self {
            staged: P::ALL
                .iter()
                .map(|&parameter| (parameter, parameter.descriptor().default))
                .collect(),
        }
    }
}

impl<P: ParameterSet> Registry<P> {
    /// Creates a registry with every parameter at its default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IllegalStateTransition`] outside `INITIALIZED`/`RUN`,
    /// or the solver's error when reading after commit.
    pub fn get<A>(&self, lifecycle: &Lifecycle, access: &A, parameter: P) -> Result<Value, Error>
    where
        A: ParameterAccess<P>,
    {
        lifecycle.guard(Operation::GetParameter)?;

        match lifecycle.state() {
            State::Run => access.get_parameter(parameter),
            _ => Ok(self.staged(parameter)),
        }
    }

    /// Reads a parameter as a concrete Rust type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnitMismatch`] if `T` does not match the parameter's
    /// dimension, or any error from [`Registry::get`].
    pub fn get_as<T, A>(&self, lifecycle: &Lifecycle, access: &A, parameter: P) -> Result<T, Error>
    where
        T: ParameterKind,
        A: ParameterAccess<P>,
    {
        let value = self.get(lifecycle, access, parameter)?;
        T::from_value(value).ok_or(Error::UnitMismatch {
            subject: parameter.descriptor().name,
            expected: T::DIMENSION,
            found: value.dimension(),
        })
    }

    /// Writes a parameter.
    ///
    /// # Errors
    ///
    /// - [`Error::IllegalStateTransition`] outside `INITIALIZED`/`RUN`.
    /// - [`Error::UnitMismatch`] if the value's dimension is not the declared one.
    /// - [`Error::InvalidValue`] if the value is not positive.
    /// - [`Error::ParameterLocked`] when writing a locked parameter after commit.
    /// - The solver's error when writing after commit.
    pub fn set<A>(
        &mut self,
        lifecycle: &Lifecycle,
        access: &mut A,
        parameter: P,
        value: Value,
    ) -> Result<(), Error>
    where
        A: ParameterAccess<P>,
    {
        lifecycle.guard(Operation::SetParameter)?;

        let descriptor = parameter.descriptor();
        if value.dimension() != descriptor.dimension() {
            return Err(Error::UnitMismatch {
                subject: descriptor.name,
                expected: descriptor.dimension(),
                found: value.dimension(),
            });
        }
        if !value.is_positive() {
            return Err(Error::InvalidValue {
                subject: descriptor.name,
                reason: "must be positive and finite",
            });
        }

        match lifecycle.state() {
            State::Run if descriptor.locked_after_commit => Err(Error::ParameterLocked {
                parameter: descriptor.name,
            }),
            State::Run => access.set_parameter(parameter, value),
            _ => {
                self.stage(parameter, value);
                Ok(())
            }
        }
    }

    /// Reads a parameter by its public name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for an unregistered name, or any
    /// error from [`Registry::get`].
    pub fn get_by_name<A>(&self, lifecycle: &Lifecycle, access: &A, name: &str) -> Result<Value, Error>
    where
        A: ParameterAccess<P>,
    {
        self.get(lifecycle, access, P::from_name(name)?)
    }

    /// Writes a parameter by its public name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownParameter`] for an unregistered name, or any
    /// error from [`Registry::set`].
    pub fn set_by_name<A>(
        &mut self,
        lifecycle: &Lifecycle,
        access: &mut A,
        name: &str,
        value: Value,
    ) -> Result<(), Error>
    where
        A: ParameterAccess<P>,
    {
        self.set(lifecycle, access, P::from_name(name)?, value)
    }

    /// Lists every parameter with its description and current value.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Registry::get`].
    pub fn list<A>(&self, lifecycle: &Lifecycle, access: &A) -> Result<Vec<Entry>, Error>
    where
        A: ParameterAccess<P>,
    {
        P::ALL
            .iter()
            .map(|&parameter| {
                let Descriptor {
                    name, description, ..
                } = parameter.descriptor();
                let value = self.get(lifecycle, access, parameter)?;
                Ok(Entry {
                    name,
                    description,
                    value,
                })
            })
            .collect()
    }

    /// Hands every staged value to the solver.
    ///
    /// Called while committing; the lifecycle guard is the caller's.
    ///
    /// # Errors
    ///
    /// Returns the first error the solver reports.
    pub fn flush<A>(&self, access: &mut A) -> Result<(), Error>
    where
        A: ParameterAccess<P>,
    {
        self.staged
            .iter()
            .try_for_each(|&(parameter, value)| access.set_parameter(parameter, value))
    }

    /// Returns the locally staged value, which is the default unless set.
    #[must_use]
    pub fn staged(&self, parameter: P) -> Value {
        self.staged
            .iter()
            .find(|(p, _)| *p == parameter)
            .map_or(parameter.descriptor().default, |&(_, value)| value)
    }

    fn stage(&mut self, parameter: P, value: Value) {
        match self.staged.iter_mut().find(|(p, _)| *p == parameter) {
            Some((_, slot)) => *slot = value,
            None => self.staged.push((parameter, value)),
        }
    }
}
