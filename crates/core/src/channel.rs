use ndarray::Zip;

use crate::{Error, FieldId, Grid, units::FieldUnit};

/// A one-directional copy relation from a source grid to a target grid.
///
/// The channel borrows both grids and owns no data. Only the target's named
/// fields are ever written; the source is read-only.
#[derive(Debug)]
pub struct ExchangeChannel<'a> {
    source: &'a Grid,
    target: &'a mut Grid,
}

impl<'a> ExchangeChannel<'a> {
    pub fn new(source: &'a Grid, target: &'a mut Grid) -> Self {
        Self { source, target }
    }

    /// Checks that `fields` could be copied from `source` to `target`,
    /// without touching either grid.
    ///
    /// # Errors
    ///
    /// See [`copy_attributes`](Self::copy_attributes).
    pub fn validate(source: &Grid, target: &Grid, fields: &[FieldId]) -> Result<(), Error> {
        plan(source, target, fields).map(drop)
    }

    /// Overwrites each named field on the target with the source's values.
    ///
    /// Values are converted when the two grids store a field in different
    /// units of the same dimension.
    ///
    /// # Errors
    ///
    /// - [`Error::ShapeMismatch`] if the grids differ in `(nx, ny)`.
    /// - [`Error::UnknownField`] if either grid lacks a named field.
    /// - [`Error::UnitMismatch`] if the two units measure different dimensions.
    ///
    /// All checks run before any value is written, so on error the target is
    /// left untouched.
    pub fn copy_attributes(&mut self, fields: &[FieldId]) -> Result<(), Error> {
        for (id, from, to) in plan(self.source, self.target, fields)? {
            let source = self.source.field(id)?.values();
            let target = self.target.field_mut(id)?.values_mut();

            if from == to {
                target.assign(source);
            } else {
                Zip::from(target)
                    .and(source)
                    .for_each(|t, &s| *t = from.convert(s, to));
            }
        }

        Ok(())
    }
}

/// Resolves the source and target unit of every field to be copied.
fn plan(
    source: &Grid,
    target: &Grid,
    fields: &[FieldId],
) -> Result<Vec<(FieldId, FieldUnit, FieldUnit)>, Error> {
    if source.shape() != target.shape() {
        return Err(Error::ShapeMismatch {
            from: source.shape(),
            to: target.shape(),
        });
    }

    fields
        .iter()
        .map(|&id| {
            let from = source.field(id)?.unit();
            let to = target.field(id)?.unit();
            if from.is_compatible(to) {
                Ok((id, from, to))
            } else {
                Err(Error::UnitMismatch {
                    subject: id.name(),
                    expected: to.dimension(),
                    found: from.dimension(),
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{f64::Length, length::meter};

    use crate::units::FieldUnit;

    fn grid(nx: usize, ny: usize, unit: FieldUnit, fill: f64) -> Grid {
        Grid::new(nx, ny, Length::new::<meter>(0.1))
            .unwrap()
            .with_field(FieldId::Temperature, unit, fill)
    }

    #[test]
    fn copy_is_a_pure_overwrite() {
        let mut source = grid(3, 3, FieldUnit::Kelvin, 0.0);
        for (n, (i, j)) in source.cells().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            source
                .set(FieldId::Temperature, i, j, 290.0 + n as f64)
                .unwrap();
        }
        let before = source.clone();
        let mut target = grid(3, 3, FieldUnit::Kelvin, 1000.0);

        source
            .new_channel_to(&mut target)
            .copy_attributes(&[FieldId::Temperature])
            .unwrap();

        assert_eq!(target.field(FieldId::Temperature), source.field(FieldId::Temperature));
        assert_eq!(source, before);
    }

    #[test]
    fn converts_compatible_units() {
        let source = grid(2, 2, FieldUnit::Kelvin, 373.15);
        let mut target = grid(2, 2, FieldUnit::DegreeCelsius, 0.0);

        ExchangeChannel::new(&source, &mut target)
            .copy_attributes(&[FieldId::Temperature])
            .unwrap();

        for (i, j) in target.cells() {
            assert_relative_eq!(
                target.get(FieldId::Temperature, i, j).unwrap(),
                100.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn shape_mismatch_leaves_target_untouched() {
        let source = grid(3, 2, FieldUnit::Kelvin, 300.0);
        let mut target = grid(2, 3, FieldUnit::Kelvin, 1.0);
        let before = target.clone();

        let err = source
            .new_channel_to(&mut target)
            .copy_attributes(&[FieldId::Temperature])
            .unwrap_err();

        assert_eq!(
            err,
            Error::ShapeMismatch {
                from: (3, 2),
                to: (2, 3)
            }
        );
        assert_eq!(target, before);
    }

    #[test]
    fn incompatible_units_fail_before_any_write() {
        let source = grid(2, 2, FieldUnit::Kelvin, 300.0)
            .with_field(FieldId::Emission, FieldUnit::Watt, 5.0);
        let mut target = grid(2, 2, FieldUnit::Kelvin, 1.0)
            .with_field(FieldId::Emission, FieldUnit::Kelvin, 0.0);
        let before = target.clone();

        let err = source
            .new_channel_to(&mut target)
            .copy_attributes(&[FieldId::Temperature, FieldId::Emission])
            .unwrap_err();

        assert!(matches!(err, Error::UnitMismatch { subject: "emission", .. }));
        assert_eq!(target, before);
    }

    #[test]
    fn validate_reports_what_a_copy_would() {
        let source = grid(2, 2, FieldUnit::Kelvin, 300.0)
            .with_field(FieldId::Emission, FieldUnit::Watt, 5.0);
        let target = grid(2, 2, FieldUnit::DegreeCelsius, 1.0);

        assert_eq!(
            ExchangeChannel::validate(&source, &target, &[FieldId::Temperature]),
            Ok(())
        );
        assert_eq!(
            ExchangeChannel::validate(&source, &target, &[FieldId::Emission]),
            Err(Error::UnknownField {
                field: FieldId::Emission
            })
        );
        assert_eq!(
            ExchangeChannel::validate(&source, &grid(3, 2, FieldUnit::Kelvin, 0.0), &[]),
            Err(Error::ShapeMismatch {
                from: (2, 2),
                to: (3, 2)
            })
        );
    }

    #[test]
    fn missing_field_is_reported() {
        let source = grid(2, 2, FieldUnit::Kelvin, 300.0);
        let mut target = grid(2, 2, FieldUnit::Kelvin, 1.0);

        let err = source
            .new_channel_to(&mut target)
            .copy_attributes(&[FieldId::Emission])
            .unwrap_err();

        assert_eq!(
            err,
            Error::UnknownField {
                field: FieldId::Emission
            }
        );
    }
}
