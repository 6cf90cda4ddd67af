//! [`Household`] read model definition.

#[cfg(doc)]
use crate::domain::Household;

/// Selector of all [`Household`]s whose status is
/// [`Occupied`](crate::domain::household::Status::Occupied).
#[derive(Clone, Copy, Debug, Default)]
pub struct Occupied;
