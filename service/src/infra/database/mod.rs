//! [`Database`]-related implementations.

pub mod memory;

use derive_more::{Display, Error as StdError, From};

pub use self::memory::Memory;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
///
/// Represents the store being unable to serve an operation at all (the
/// storage-layer counterpart of a lost connection). Business-rule violations
/// are never reported through this type.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// [`Memory`] store error.
    Memory(memory::Error),
}
