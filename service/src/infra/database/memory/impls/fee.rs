//! [`Fee`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Lock, Select};
use itertools::Itertools as _;
use tracerr::Traced;

use crate::{
    domain::{fee, Fee},
    infra::{
        database::{
            self,
            memory::{Access, Memory, Tx},
        },
        Database,
    },
    read,
};

impl<C: Access> Database<Select<By<Option<Fee>, fee::Id>>> for Memory<C> {
    type Ok = Option<Fee>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Fee>, fee::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0.with_state(|state| state.fees.get(&id).cloned()).await
    }
}

impl<C: Access> Database<Select<By<Vec<Fee>, read::fee::Mandatory>>>
    for Memory<C>
{
    type Ok = Vec<Fee>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Fee>, read::fee::Mandatory>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(|state| {
                state
                    .fees
                    .values()
                    .filter(|f| f.mandatory)
                    .cloned()
                    .sorted_by_key(|f| f.name.to_string())
                    .collect()
            })
            .await
    }
}

impl<C: Access> Database<Insert<Fee>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(fee): Insert<Fee>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(move |state| {
                let _ = state.fees.insert(fee.id, fee);
            })
            .await
    }
}

impl<C: Access> Database<Delete<By<Fee, fee::Id>>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Fee, fee::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with_state(move |state| {
                let _ = state.fees.remove(&id);
            })
            .await
    }
}

impl Database<Lock<By<Fee, fee::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Fee, fee::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // The transaction owns the whole `State` exclusively already.
        self.0.with_state(|_| ()).await
    }
}
