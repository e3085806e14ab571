//! Growth notifications.
//!
//! A table reports every resize to an optional observer together with the
//! primary-slot collision counts measured just before and just after the
//! rehash. The table itself never prints; see `StrTable::with_observer`.

/// What happened during one growth step.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GrowthEvent {
    pub old_capacity: usize,
    pub new_capacity: usize,
    /// Occupied slots carried over (the pending key is not yet inserted).
    pub entries: usize,
    pub collisions_before: u32,
    pub collisions_after: u32,
}

/// Receives a `GrowthEvent` every time a table doubles its capacity.
pub trait GrowthObserver {
    fn on_growth(&mut self, event: &GrowthEvent);
}

impl<F> GrowthObserver for F
where
    F: FnMut(&GrowthEvent),
{
    #[inline]
    fn on_growth(&mut self, event: &GrowthEvent) {
        self(event)
    }
}
