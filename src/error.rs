//! Error type for fallible table operations.

use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to allocate {what}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },
    #[error("cannot grow past {capacity} slots")]
    CapacityOverflow { capacity: usize },
}

impl TableError {
    pub(crate) fn allocation(what: &'static str) -> impl FnOnce(TryReserveError) -> Self {
        move |source| TableError::Allocation { what, source }
    }
}
