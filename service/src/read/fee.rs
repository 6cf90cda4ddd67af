//! [`Fee`] read model definition.

#[cfg(doc)]
use crate::domain::Fee;

/// Selector of all [`Fee`]s flagged as mandatory.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mandatory;
