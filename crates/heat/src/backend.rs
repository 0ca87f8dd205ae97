/// Result of a backend call; failures carry the backend's integer code.
pub type CodeResult<T> = Result<T, i32>;

/// Error codes reported by the backends in this crate.
///
/// Other backends may report any negative code; handles pass codes through
/// unchanged.
pub mod code {
    /// An argument was non-finite, non-positive, or otherwise unusable.
    pub const INVALID_ARGUMENT: i32 = -1;
    /// Field storage has not been allocated; `commit_parameters` was not called.
    pub const NOT_ALLOCATED: i32 = -2;
    /// A cell index was outside `1..=nx` by `1..=ny`.
    pub const INDEX_OUT_OF_RANGE: i32 = -3;
    /// The configured step would make the explicit scheme unstable.
    pub const UNSTABLE: i32 = -4;
    /// Grid geometry cannot change once storage is allocated.
    pub const GEOMETRY_FIXED: i32 = -5;
    /// The worker thread has exited.
    pub const WORKER_DISCONNECTED: i32 = -10;
    /// A reply did not match the request, such as a wrong number of values.
    pub const MALFORMED_REPLY: i32 = -11;
}

/// The operation contract of a 2D heat-diffusion solver.
///
/// Values cross this boundary as plain SI floats: kelvin, metre, second, and
/// m²/s. Cell indices are 1-based `(i, j)` pairs. Legality of each call is
/// decided by the handle before it is made, so implementations only report
/// failures of their own.
pub trait Heat2dBackend {
    fn initialize_code(&mut self) -> CodeResult<()>;

    /// Fixes the configured parameters and allocates field storage.
    fn commit_parameters(&mut self) -> CodeResult<()>;

    fn cleanup_code(&mut self) -> CodeResult<()>;

    /// Steps until the model time is within half a step of `tend`.
    fn evolve_model(&mut self, tend: f64) -> CodeResult<()>;

    fn get_model_time(&self) -> CodeResult<f64>;

    fn get_alpha(&self) -> CodeResult<f64>;

    fn set_alpha(&mut self, alpha: f64) -> CodeResult<()>;

    fn get_time_step(&self) -> CodeResult<f64>;

    fn set_time_step(&mut self, timestep: f64) -> CodeResult<()>;

    fn get_grid_cellsize(&self) -> CodeResult<f64>;

    fn set_grid_cellsize(&mut self, cellsize: f64) -> CodeResult<()>;

    fn get_nx(&self) -> CodeResult<usize>;

    fn set_nx(&mut self, nx: usize) -> CodeResult<()>;

    fn get_ny(&self) -> CodeResult<usize>;

    fn set_ny(&mut self, ny: usize) -> CodeResult<()>;

    /// Reads the temperature of each indexed cell, in order.
    fn get_temperature(&self, indices: &[(usize, usize)]) -> CodeResult<Vec<f64>>;

    /// Writes `values[k]` to the cell at `indices[k]`.
    fn set_temperature(&mut self, indices: &[(usize, usize)], values: &[f64]) -> CodeResult<()>;
}
