/// Control actions supported by the coupling driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Stop after the current cycle and return the solution so far.
    StopEarly,
}
