//! [`Database`] implementations.

mod fee;
mod household;
mod line_item;
mod payment;
mod period;
mod receipt;
mod resident;
mod vehicle;

use std::sync::{Arc, Mutex as StdMutex};

use common::operations::{Commit, Transact};
use tracerr::Traced;

use crate::infra::{database, Database};

use super::{Draft, Error, Memory, NonTx, Tx};

impl Database<Transact> for Memory<NonTx> {
    type Ok = Memory<Tx>;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        let guard = Arc::clone(&self.0.state).lock_owned().await;
        let state = guard.clone();
        Ok(Memory(Tx {
            draft: StdMutex::new(Draft { guard, state }),
        }))
    }
}

impl Database<Commit> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        let mut draft = self.0.draft.lock().map_err(|_| {
            tracerr::new!(database::Error::from(Error::Unavailable(
                "transaction state is poisoned",
            )))
        })?;
        let state = draft.state.clone();
        *draft.guard = state;
        Ok(())
    }
}
