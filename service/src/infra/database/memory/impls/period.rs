//! [`Period`]-related [`Database`] implementations.

use common::operations::{By, Insert, Lock, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{period, Period},
    infra::{
        database::{
            self,
            memory::{Access, Memory, Tx},
        },
        Database,
    },
};

impl<C: Access> Database<Select<By<Option<Period>, period::Id>>>
    for Memory<C>
{
    type Ok = Option<Period>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Period>, period::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.0
            .with_state(|state| state.periods.get(&id).cloned())
            .await
    }
}

impl<C: Access> Database<Insert<Period>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(period): Insert<Period>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(move |state| {
                let _ = state.periods.insert(period.id, period);
            })
            .await
    }
}

impl<C: Access> Database<Update<Period>> for Memory<C> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(period): Update<Period>,
    ) -> Result<Self::Ok, Self::Err> {
        self.0
            .with_state(move |state| {
                let _ = state.periods.insert(period.id, period);
            })
            .await
    }
}

impl Database<Lock<By<Period, period::Id>>> for Memory<Tx> {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Period, period::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        // The transaction owns the whole `State` exclusively already.
        self.0.with_state(|_| ()).await
    }
}
