mod field;

use std::collections::BTreeMap;

pub use field::{Field, FieldId};

use ndarray::Array2;
use uom::si::{
    f64::{Length, ThermodynamicTemperature},
    thermodynamic_temperature::kelvin,
};

use crate::{
    Error, ExchangeChannel,
    units::{Dimension, FieldUnit},
};

/// A rectangular grid of named scalar fields.
///
/// Every field has the grid's `nx × ny` shape. Cells are addressed with
/// 1-based inclusive indices, so the valid range is `1..=nx` by `1..=ny`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    nx: usize,
    ny: usize,
    cellsize: Length,
    fields: BTreeMap<FieldId, Field>,
}

impl Grid {
    /// Creates a grid with no fields.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if either dimension is zero or the cell
    /// size is not a positive, finite length.
    pub fn new(nx: usize, ny: usize, cellsize: Length) -> Result<Self, Error> {
        if nx == 0 || ny == 0 {
            return Err(Error::InvalidValue {
                subject: "grid dimensions",
                reason: "must be at least one cell in each direction",
            });
        }
        if !cellsize.value.is_finite() || cellsize.value <= 0.0 {
            return Err(Error::InvalidValue {
                subject: "cellsize",
                reason: "must be positive and finite",
            });
        }

        Ok(Self {
            nx,
            ny,
            cellsize,
            fields: BTreeMap::new(),
        })
    }

    /// Adds a field filled with `fill`, returning the grid for chaining.
    #[must_use]
    pub fn with_field(mut self, id: FieldId, unit: FieldUnit, fill: f64) -> Self {
        self.add_field(id, unit, fill);
        self
    }

    /// Adds or replaces a field filled with `fill`.
    pub fn add_field(&mut self, id: FieldId, unit: FieldUnit, fill: f64) {
        self.fields
            .insert(id, Field::filled(unit, (self.nx, self.ny), fill));
    }

    /// Returns `(nx, ny)`.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }

    #[must_use]
    pub fn cellsize(&self) -> Length {
        self.cellsize
    }

    /// Returns the inclusive index range as `(imin, imax, jmin, jmax)`.
    #[must_use]
    pub fn range(&self) -> (usize, usize, usize, usize) {
        (1, self.nx, 1, self.ny)
    }

    /// Returns the position of cell `(i, j)`, which is `(i·cellsize, j·cellsize)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if the cell is outside the grid.
    pub fn position(&self, i: usize, j: usize) -> Result<(Length, Length), Error> {
        self.offset(i, j)?;
        #[allow(clippy::cast_precision_loss)]
        Ok((self.cellsize * i as f64, self.cellsize * j as f64))
    }

    /// Iterates over all cells as 1-based `(i, j)` pairs, `j` varying fastest.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let ny = self.ny;
        (1..=self.nx).flat_map(move |i| (1..=ny).map(move |j| (i, j)))
    }

    /// Returns the identifiers of all fields on this grid.
    pub fn field_ids(&self) -> impl Iterator<Item = FieldId> + '_ {
        self.fields.keys().copied()
    }

    #[must_use]
    pub fn has_field(&self, id: FieldId) -> bool {
        self.fields.contains_key(&id)
    }

    /// Returns a field by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the grid has no such field.
    pub fn field(&self, id: FieldId) -> Result<&Field, Error> {
        self.fields
            .get(&id)
            .ok_or(Error::UnknownField { field: id })
    }

    /// Returns a field by identifier for modification.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the grid has no such field.
    pub fn field_mut(&mut self, id: FieldId) -> Result<&mut Field, Error> {
        self.fields
            .get_mut(&id)
            .ok_or(Error::UnknownField { field: id })
    }

    /// Reads one cell of a field, in the field's unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing or the cell is out of range.
    pub fn get(&self, id: FieldId, i: usize, j: usize) -> Result<f64, Error> {
        let offset = self.offset(i, j)?;
        Ok(self.field(id)?.values()[offset])
    }

    /// Writes one cell of a field, in the field's unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the field is missing or the cell is out of range.
    pub fn set(&mut self, id: FieldId, i: usize, j: usize, value: f64) -> Result<(), Error> {
        let offset = self.offset(i, j)?;
        self.field_mut(id)?.values_mut()[offset] = value;
        Ok(())
    }

    /// Overwrites every cell of a field with `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownField`] if the grid has no such field.
    pub fn fill(&mut self, id: FieldId, value: f64) -> Result<(), Error> {
        self.field_mut(id)?.values_mut().fill(value);
        Ok(())
    }

    /// Reads the temperature of one cell, whatever unit the field is stored in.
    ///
    /// # Errors
    ///
    /// Returns an error if the temperature field is missing, is not stored in
    /// a temperature unit, or the cell is out of range.
    pub fn temperature(&self, i: usize, j: usize) -> Result<ThermodynamicTemperature, Error> {
        let unit = self.temperature_unit()?;
        let value = self.get(FieldId::Temperature, i, j)?;
        Ok(ThermodynamicTemperature::new::<kelvin>(unit.to_base(value)))
    }

    /// Writes the temperature of one cell, converting to the field's unit.
    ///
    /// # Errors
    ///
    /// Returns an error if the temperature field is missing, is not stored in
    /// a temperature unit, or the cell is out of range.
    pub fn set_temperature(
        &mut self,
        i: usize,
        j: usize,
        temperature: ThermodynamicTemperature,
    ) -> Result<(), Error> {
        let unit = self.temperature_unit()?;
        self.set(
            FieldId::Temperature,
            i,
            j,
            unit.from_base(temperature.get::<kelvin>()),
        )
    }

    /// Opens a channel that copies fields from this grid into `target`.
    pub fn new_channel_to<'a>(&'a self, target: &'a mut Grid) -> ExchangeChannel<'a> {
        ExchangeChannel::new(self, target)
    }

    /// Maps a 1-based cell index to a 0-based array offset.
    pub(crate) fn offset(&self, i: usize, j: usize) -> Result<[usize; 2], Error> {
        if (1..=self.nx).contains(&i) && (1..=self.ny).contains(&j) {
            Ok([i - 1, j - 1])
        } else {
            Err(Error::IndexOutOfBounds {
                i,
                j,
                nx: self.nx,
                ny: self.ny,
            })
        }
    }

    /// Returns the unit the temperature field is stored in.
    ///
    /// # Errors
    ///
    /// Returns an error if the temperature field is missing or is not stored
    /// in a temperature unit.
    pub fn temperature_unit(&self) -> Result<FieldUnit, Error> {
        let unit = self.field(FieldId::Temperature)?.unit();
        if unit.dimension() == Dimension::Temperature {
            Ok(unit)
        } else {
            Err(Error::UnitMismatch {
                subject: FieldId::Temperature.name(),
                expected: Dimension::Temperature,
                found: unit.dimension(),
            })
        }
    }
}

impl Field {
    fn filled(unit: FieldUnit, shape: (usize, usize), fill: f64) -> Self {
        Self::from_values(unit, Array2::from_elem(shape, fill))
    }
}
