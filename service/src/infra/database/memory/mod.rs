//! In-memory [`Database`] implementation.

mod impls;

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex as StdMutex},
};

use derive_more::{Display, Error as StdError};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

#[cfg(doc)]
use common::operations::{Commit, Lock, Transact};

#[cfg(doc)]
use crate::infra::Database;
use crate::{
    domain::{
        fee, household, period, receipt,
        receipt::{LineItem, Payment},
        resident, vehicle, Fee, Household, Period, Receipt, Resident, Vehicle,
    },
    infra::database,
};

/// In-memory [`Database`] adapter.
///
/// Keeps the whole data set in a single [`State`] behind an async mutex.
/// Backs tests and embedding callers that don't need persistence; a
/// persistent deployment implements the same operations against its own
/// storage.
///
/// A [`Transact`] operation takes the mutex for the transaction's whole
/// lifetime, so transactions are serializable, and works on a draft copy of
/// the [`State`] that only overwrites the shared one on [`Commit`]. Dropping
/// a transaction without committing rolls its writes back implicitly.
/// [`Lock`] operations are accepted and trivially satisfied, as no other
/// access can run concurrently with a transaction anyway.
#[derive(Clone, Debug, Default)]
pub struct Memory<C = NonTx>(C);

impl Memory {
    /// Creates a new empty [`Memory`] store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Auto-committing access to a [`Memory`] store.
#[derive(Clone, Debug, Default)]
pub struct NonTx {
    /// Shared [`State`] of the store.
    state: Arc<Mutex<State>>,
}

/// Transactional access to a [`Memory`] store.
#[derive(Debug)]
pub struct Tx {
    /// Working set this transaction operates on.
    draft: StdMutex<Draft>,
}

/// Working set of a [`Tx`].
#[derive(Debug)]
struct Draft {
    /// Guard keeping the shared [`State`] exclusively owned by the
    /// transaction.
    guard: OwnedMutexGuard<State>,

    /// Copy of the [`State`] the transaction's operations apply to.
    state: State,
}

/// Access mode of a [`Memory`] store.
pub trait Access {
    /// Runs the provided function over the store's [`State`].
    fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>;
}

impl Access for NonTx {
    async fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut state = self.state.lock().await;
        Ok(f(&mut state))
    }
}

impl Access for Tx {
    async fn with_state<R>(
        &self,
        f: impl FnOnce(&mut State) -> R,
    ) -> Result<R, Traced<database::Error>> {
        let mut draft = self.draft.lock().map_err(|_| {
            tracerr::new!(database::Error::from(Error::Unavailable(
                "transaction state is poisoned",
            )))
        })?;
        Ok(f(&mut draft.state))
    }
}

/// [`Memory`] store error.
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Store state is not accessible anymore.
    #[display("in-memory store unavailable: {_0}")]
    Unavailable(#[error(not(source))] &'static str),
}

/// Entire data set of a [`Memory`] store.
#[derive(Clone, Debug, Default)]
pub struct State {
    /// [`Household`]s by their IDs.
    households: HashMap<household::Id, Household>,

    /// [`Resident`]s by their IDs.
    residents: HashMap<resident::Id, Resident>,

    /// [`Vehicle`]s by their IDs.
    vehicles: HashMap<vehicle::Id, Vehicle>,

    /// [`Fee`]s by their IDs.
    fees: HashMap<fee::Id, Fee>,

    /// [`Period`]s by their IDs.
    periods: HashMap<period::Id, Period>,

    /// [`Receipt`]s by their IDs.
    receipts: HashMap<receipt::Id, Receipt>,

    /// [`LineItem`]s of all [`Receipt`]s, in insertion order.
    line_items: Vec<LineItem>,

    /// [`Payment`]s of all [`Receipt`]s, in insertion order. Append-only.
    payments: Vec<Payment>,
}
