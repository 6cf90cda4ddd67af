//! [`Receipt`] read model definition.

use common::Money;

#[cfg(doc)]
use crate::domain::{receipt::Payment, Receipt};

/// Payment balance of a [`Receipt`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Balance {
    /// Total amount owed by the [`Receipt`].
    pub total: Money,

    /// Cumulative amount of recorded [`Payment`]s.
    pub paid: Money,
}

impl Balance {
    /// Returns the outstanding amount still owed.
    ///
    /// Always derived as `total − paid`, never stored, so it cannot drift
    /// from the ledger.
    #[must_use]
    pub fn outstanding(&self) -> Money {
        self.total.saturating_sub(self.paid)
    }
}
