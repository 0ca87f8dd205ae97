//! In-process explicit diffusion kernel.
//!
//! Advances the 2D heat equation `∂T/∂t = α ∇²T` with forward-time,
//! centred-space differencing on a uniform grid:
//!
//! ```text
//! T'[i,j] = T[i,j] + r · (T[i+1,j] + T[i-1,j] + T[i,j+1] + T[i,j-1] − 4·T[i,j])
//! r = α·dt / dx²
//! ```
//!
//! The update is written as fluxes across interior cell faces, and no flux
//! crosses the outer boundary, so the field sum is conserved up to rounding.

use ndarray::{Array2, s};
use serde::{Deserialize, Serialize};

use crate::backend::{CodeResult, Heat2dBackend, code};

/// Stability limits enforced by [`Heat2dKernel`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KernelLimits {
    /// Largest permitted mesh Fourier number `α·dt/dx²`.
    pub max_fourier: f64,
}

impl Default for KernelLimits {
    fn default() -> Self {
        Self { max_fourier: 0.25 }
    }
}

impl KernelLimits {
    /// Validates that the limit is within the explicit scheme's stable range.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_fourier` is non-finite, non-positive, or above 0.25.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.max_fourier.is_finite() || self.max_fourier <= 0.0 {
            return Err("max_fourier must be finite and positive");
        }
        if self.max_fourier > 0.25 {
            return Err("max_fourier must not exceed 0.25");
        }
        Ok(())
    }
}

/// A single-threaded FTCS heat-diffusion kernel with insulated boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct Heat2dKernel {
    limits: KernelLimits,
    alpha: f64,
    timestep: f64,
    cellsize: f64,
    nx: usize,
    ny: usize,
    time: f64,
    temperature: Option<Array2<f64>>,
}

impl Default for Heat2dKernel {
    fn default() -> Self {
        Self {
            limits: KernelLimits::default(),
            alpha: 0.01,
            timestep: 0.01,
            cellsize: 0.1,
            nx: 100,
            ny: 100,
            time: 0.0,
            temperature: None,
        }
    }
}

impl Heat2dKernel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a kernel that enforces custom stability limits.
    ///
    /// # Errors
    ///
    /// Returns the validation failure if `limits` is invalid.
    pub fn with_limits(limits: KernelLimits) -> Result<Self, &'static str> {
        limits.validate()?;
        Ok(Self {
            limits,
            ..Self::default()
        })
    }

    /// The mesh Fourier number `α·dt/dx²` for the current parameters.
    #[must_use]
    pub fn fourier(&self) -> f64 {
        self.alpha * self.timestep / (self.cellsize * self.cellsize)
    }

    fn check_stable(&self) -> CodeResult<()> {
        if self.fourier() > self.limits.max_fourier {
            tracing::warn!(
                fourier = self.fourier(),
                limit = self.limits.max_fourier,
                "unstable diffusion step"
            );
            return Err(code::UNSTABLE);
        }
        Ok(())
    }

    fn check_geometry_unlocked(&self) -> CodeResult<()> {
        if self.temperature.is_some() {
            return Err(code::GEOMETRY_FIXED);
        }
        Ok(())
    }

    fn offset(&self, (i, j): (usize, usize)) -> CodeResult<[usize; 2]> {
        if (1..=self.nx).contains(&i) && (1..=self.ny).contains(&j) {
            Ok([i - 1, j - 1])
        } else {
            Err(code::INDEX_OUT_OF_RANGE)
        }
    }

    fn step(temperature: &mut Array2<f64>, r: f64) {
        let current = temperature.clone();

        let flux_x = &current.slice(s![1.., ..]) - &current.slice(s![..-1, ..]);
        temperature.slice_mut(s![..-1, ..]).scaled_add(r, &flux_x);
        temperature.slice_mut(s![1.., ..]).scaled_add(-r, &flux_x);

        let flux_y = &current.slice(s![.., 1..]) - &current.slice(s![.., ..-1]);
        temperature.slice_mut(s![.., ..-1]).scaled_add(r, &flux_y);
        temperature.slice_mut(s![.., 1..]).scaled_add(-r, &flux_y);
    }
}

fn positive(value: f64) -> CodeResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(code::INVALID_ARGUMENT)
    }
}

impl Heat2dBackend for Heat2dKernel {
    fn initialize_code(&mut self) -> CodeResult<()> {
        *self = Self {
            limits: self.limits,
            ..Self::default()
        };
        Ok(())
    }

    fn commit_parameters(&mut self) -> CodeResult<()> {
        self.check_stable()?;
        self.temperature = Some(Array2::zeros((self.nx, self.ny)));
        self.time = 0.0;
        tracing::debug!(
            nx = self.nx,
            ny = self.ny,
            fourier = self.fourier(),
            "allocated diffusion grid"
        );
        Ok(())
    }

    fn cleanup_code(&mut self) -> CodeResult<()> {
        self.temperature = None;
        Ok(())
    }

    fn evolve_model(&mut self, tend: f64) -> CodeResult<()> {
        if tend.is_nan() {
            return Err(code::INVALID_ARGUMENT);
        }
        self.check_stable()?;
        let r = self.fourier();
        let dt = self.timestep;
        let temperature = self.temperature.as_mut().ok_or(code::NOT_ALLOCATED)?;

        while self.time < tend - dt / 2.0 {
            Self::step(temperature, r);
            self.time += dt;
        }
        Ok(())
    }

    fn get_model_time(&self) -> CodeResult<f64> {
        Ok(self.time)
    }

    fn get_alpha(&self) -> CodeResult<f64> {
        Ok(self.alpha)
    }

    fn set_alpha(&mut self, alpha: f64) -> CodeResult<()> {
        self.alpha = positive(alpha)?;
        Ok(())
    }

    fn get_time_step(&self) -> CodeResult<f64> {
        Ok(self.timestep)
    }

    fn set_time_step(&mut self, timestep: f64) -> CodeResult<()> {
        self.timestep = positive(timestep)?;
        Ok(())
    }

    fn get_grid_cellsize(&self) -> CodeResult<f64> {
        Ok(self.cellsize)
    }

    fn set_grid_cellsize(&mut self, cellsize: f64) -> CodeResult<()> {
        self.check_geometry_unlocked()?;
        self.cellsize = positive(cellsize)?;
        Ok(())
    }

    fn get_nx(&self) -> CodeResult<usize> {
        Ok(self.nx)
    }

    fn set_nx(&mut self, nx: usize) -> CodeResult<()> {
        if nx == self.nx {
            return Ok(());
        }
        self.check_geometry_unlocked()?;
        if nx == 0 {
            return Err(code::INVALID_ARGUMENT);
        }
        self.nx = nx;
        Ok(())
    }

    fn get_ny(&self) -> CodeResult<usize> {
        Ok(self.ny)
    }

    fn set_ny(&mut self, ny: usize) -> CodeResult<()> {
        if ny == self.ny {
            return Ok(());
        }
        self.check_geometry_unlocked()?;
        if ny == 0 {
            return Err(code::INVALID_ARGUMENT);
        }
        self.ny = ny;
        Ok(())
    }

    fn get_temperature(&self, indices: &[(usize, usize)]) -> CodeResult<Vec<f64>> {
        let temperature = self.temperature.as_ref().ok_or(code::NOT_ALLOCATED)?;
        indices
            .iter()
            .map(|&index| Ok(temperature[self.offset(index)?]))
            .collect()
    }

    fn set_temperature(&mut self, indices: &[(usize, usize)], values: &[f64]) -> CodeResult<()> {
        if indices.len() != values.len() {
            return Err(code::INVALID_ARGUMENT);
        }
        let offsets = indices
            .iter()
            .map(|&index| self.offset(index))
            .collect::<CodeResult<Vec<_>>>()?;
        let temperature = self.temperature.as_mut().ok_or(code::NOT_ALLOCATED)?;

        for (offset, &value) in offsets.into_iter().zip(values) {
            temperature[offset] = value;
        }
        Ok(())
    }
}
