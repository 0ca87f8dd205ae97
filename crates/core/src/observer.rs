/// Receives driver events and decides how a run should proceed.
///
/// `observe` returns `Some(action)` to request a driver-specific action, or
/// `None` to let the run continue unchanged.
///
/// Closures taking `&E` implement `Observer` automatically, and `()` is a
/// no-op observer.
pub trait Observer<E, A> {
    /// Observes an event and optionally returns a control action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}
